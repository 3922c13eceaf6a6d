use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{db::PoolCounters, response::ActionEnvelope, state::AppState};

#[derive(Serialize, ToSchema)]
pub struct HealthData {
    status: String,
    pool: PoolCounters,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "OK", body = ActionEnvelope<HealthData>),
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<ActionEnvelope<HealthData>> {
    let data = HealthData {
        status: "ok".to_string(),
        pool: state.db.stats(),
    };

    Json(ActionEnvelope::success(data))
}
