use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Banner {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub mobile_image_url: Option<String>,
    pub link: Option<String>,
    /// Display sort key, ascending.
    pub order: i32,
    pub is_active: bool,
}

/// Category ids travel as strings so clients never lose precision.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub parent_id: Option<String>,
    pub order: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    #[schema(no_recursion)]
    pub children: Vec<CategoryNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Whole currency units.
    pub price: i64,
    pub original_price: Option<i64>,
    pub discount_percent: Option<i32>,
    pub image_url: Option<String>,
    pub category_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Percentage shown next to a struck-through original price. Display
    /// only; nothing keeps it consistent with the stored prices.
    pub fn derive_discount_percent(price: i64, original_price: Option<i64>) -> Option<i32> {
        let original = original_price?;
        if original <= 0 || original <= price {
            return None;
        }
        let percent = (i128::from(original) - i128::from(price)) * 100 / i128::from(original);
        i32::try_from(percent).ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct InfoPage {
    pub id: i64,
    pub slug: String,
    pub title: String,
    /// Raw HTML.
    pub content: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct User {
    pub id: i64,
    pub phone: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn profile_complete(&self) -> bool {
        let filled = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
        filled(&self.first_name) && filled(&self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Coupon {
    pub id: i64,
    pub code: String,
    /// `percent` or `fixed`.
    pub discount_type: String,
    pub discount_value: i64,
    pub min_order_amount: Option<i64>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SupportTicket {
    pub id: i64,
    pub user_id: i64,
    pub subject: String,
    pub message: String,
    pub status: String,
    pub admin_reply: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SmsCampaign {
    pub id: i64,
    pub title: String,
    pub message: String,
    pub audience: String,
    pub recipient_count: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
