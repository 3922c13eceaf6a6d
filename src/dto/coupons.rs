use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dto::banners::default_active;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CouponInput {
    pub code: String,
    /// `percent` or `fixed`.
    pub discount_type: String,
    pub discount_value: i64,
    pub min_order_amount: Option<i64>,
    pub max_uses: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CouponCheckRequest {
    pub code: String,
    pub order_amount: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct CouponQuote {
    pub code: String,
    pub discount_amount: i64,
    pub payable_amount: i64,
}
