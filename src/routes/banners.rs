use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};

use crate::{
    dto::banners::BannerInput,
    error::ActionResult,
    middleware::auth::AdminUser,
    models::Banner,
    response::{ActionEnvelope, Deleted},
    services::banner_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_banners))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(admin_list_banners).post(create_banner))
        .route("/{id}", put(update_banner).delete(delete_banner))
}

#[utoipa::path(
    get,
    path = "/api/banners",
    responses(
        (status = 200, description = "Active banners in display order", body = ActionEnvelope<Vec<Banner>>),
        (status = 500, description = "Database unavailable"),
    ),
    tag = "Storefront"
)]
pub async fn list_banners(State(state): State<AppState>) -> ActionResult<Vec<Banner>> {
    banner_service::fetch_banners_client(&state.db).await
}

#[utoipa::path(
    get,
    path = "/api/admin/banners",
    responses(
        (status = 200, description = "All banners", body = ActionEnvelope<Vec<Banner>>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("admin_cookie" = [])),
    tag = "Admin"
)]
pub async fn admin_list_banners(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ActionResult<Vec<Banner>> {
    banner_service::list_banners_admin(&state.db).await
}

#[utoipa::path(
    post,
    path = "/api/admin/banners",
    request_body = BannerInput,
    responses(
        (status = 200, description = "Banner created", body = ActionEnvelope<Banner>),
        (status = 400, description = "Invalid banner"),
    ),
    security(("admin_cookie" = [])),
    tag = "Admin"
)]
pub async fn create_banner(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<BannerInput>,
) -> ActionResult<Banner> {
    banner_service::create_banner(&state.db, payload).await
}

#[utoipa::path(
    put,
    path = "/api/admin/banners/{id}",
    params(("id" = i64, Path, description = "Banner ID")),
    request_body = BannerInput,
    responses(
        (status = 200, description = "Banner updated", body = ActionEnvelope<Banner>),
        (status = 404, description = "Not Found"),
    ),
    security(("admin_cookie" = [])),
    tag = "Admin"
)]
pub async fn update_banner(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<BannerInput>,
) -> ActionResult<Banner> {
    banner_service::update_banner(&state.db, id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/admin/banners/{id}",
    params(("id" = i64, Path, description = "Banner ID")),
    responses(
        (status = 200, description = "Banner deleted", body = ActionEnvelope<Deleted>),
        (status = 404, description = "Not Found"),
    ),
    security(("admin_cookie" = [])),
    tag = "Admin"
)]
pub async fn delete_banner(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> ActionResult<Deleted> {
    banner_service::delete_banner(&state.db, id).await
}
