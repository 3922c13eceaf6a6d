use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::payments::PaymentRequest,
    error::ActionResult,
    payment::PaymentResult,
    response::ActionEnvelope,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(process_payment))
}

/// Simulated gateway call. A declined payment is still a successful action;
/// the outcome is carried in `status`.
#[utoipa::path(
    post,
    path = "/api/payments",
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Gateway outcome", body = ActionEnvelope<PaymentResult>),
    ),
    tag = "Storefront"
)]
pub async fn process_payment(
    State(state): State<AppState>,
    Json(payload): Json<PaymentRequest>,
) -> ActionResult<PaymentResult> {
    let result = state
        .payments
        .process_payment(payload.amount, &payload.payment_method)
        .await;
    ActionResult::Success(result)
}
