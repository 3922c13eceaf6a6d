use serde::Deserialize;
use utoipa::ToSchema;

use crate::dto::banners::default_active;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CategoryInput {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// `None` places the category at the top level.
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}
