use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::tickets::TicketInput,
    error::ActionResult,
    middleware::auth::AuthUser,
    models::SupportTicket,
    response::ActionEnvelope,
    services::ticket_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(my_tickets).post(create_ticket))
}

#[utoipa::path(
    get,
    path = "/api/tickets",
    responses(
        (status = 200, description = "Tickets of the signed-in user", body = ActionEnvelope<Vec<SupportTicket>>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("session_cookie" = [])),
    tag = "Support"
)]
pub async fn my_tickets(
    State(state): State<AppState>,
    user: AuthUser,
) -> ActionResult<Vec<SupportTicket>> {
    ticket_service::list_my_tickets(&state.db, &user).await
}

#[utoipa::path(
    post,
    path = "/api/tickets",
    request_body = TicketInput,
    responses(
        (status = 200, description = "Ticket opened", body = ActionEnvelope<SupportTicket>),
        (status = 400, description = "Missing subject or message"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("session_cookie" = [])),
    tag = "Support"
)]
pub async fn create_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<TicketInput>,
) -> ActionResult<SupportTicket> {
    ticket_service::create_ticket(&state.db, &user, payload).await
}
