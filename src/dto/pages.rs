use serde::Deserialize;
use utoipa::ToSchema;

use crate::dto::banners::default_active;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct InfoPageInput {
    pub slug: String,
    pub title: String,
    pub content: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}
