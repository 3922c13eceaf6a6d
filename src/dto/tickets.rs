use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TicketInput {
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TicketReply {
    pub reply: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TicketStatusUpdate {
    /// `open`, `answered` or `closed`.
    pub status: String,
}
