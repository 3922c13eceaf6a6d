use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CampaignInput {
    pub title: String,
    pub message: String,
    /// `all` or `completed_profiles`.
    pub audience: String,
}
