use serde::Deserialize;
use utoipa::ToSchema;

use crate::dto::banners::default_active;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub original_price: Option<i64>,
    pub discount_percent: Option<i32>,
    pub image_url: Option<String>,
    pub category_id: Option<i64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}
