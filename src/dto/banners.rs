use serde::Deserialize;
use utoipa::ToSchema;

/// Admin banner form. Updates replace every field.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BannerInput {
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub mobile_image_url: Option<String>,
    pub link: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

pub(crate) fn default_active() -> bool {
    true
}
