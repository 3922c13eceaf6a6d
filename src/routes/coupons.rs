use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};

use crate::{
    dto::coupons::{CouponCheckRequest, CouponInput, CouponQuote},
    error::ActionResult,
    middleware::auth::AdminUser,
    models::Coupon,
    response::{ActionEnvelope, Deleted, Page},
    routes::params::AdminListQuery,
    services::coupon_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/check", post(check_coupon))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_coupons).post(create_coupon))
        .route("/{id}", put(update_coupon).delete(delete_coupon))
}

#[utoipa::path(
    post,
    path = "/api/coupons/check",
    request_body = CouponCheckRequest,
    responses(
        (status = 200, description = "Coupon applies", body = ActionEnvelope<CouponQuote>),
        (status = 400, description = "Coupon invalid, expired or exhausted"),
    ),
    tag = "Storefront"
)]
pub async fn check_coupon(
    State(state): State<AppState>,
    Json(payload): Json<CouponCheckRequest>,
) -> ActionResult<CouponQuote> {
    coupon_service::check_coupon(&state.db, payload).await
}

#[utoipa::path(
    get,
    path = "/api/admin/coupons",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Part of the coupon code"),
    ),
    responses(
        (status = 200, description = "Coupons", body = ActionEnvelope<Page<Coupon>>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("admin_cookie" = [])),
    tag = "Admin"
)]
pub async fn list_coupons(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<AdminListQuery>,
) -> ActionResult<Page<Coupon>> {
    coupon_service::list_coupons(&state.db, query).await
}

#[utoipa::path(
    post,
    path = "/api/admin/coupons",
    request_body = CouponInput,
    responses(
        (status = 200, description = "Coupon created", body = ActionEnvelope<Coupon>),
        (status = 400, description = "Invalid coupon or duplicate code"),
    ),
    security(("admin_cookie" = [])),
    tag = "Admin"
)]
pub async fn create_coupon(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<CouponInput>,
) -> ActionResult<Coupon> {
    coupon_service::create_coupon(&state.db, payload).await
}

#[utoipa::path(
    put,
    path = "/api/admin/coupons/{id}",
    params(("id" = i64, Path, description = "Coupon ID")),
    request_body = CouponInput,
    responses(
        (status = 200, description = "Coupon updated", body = ActionEnvelope<Coupon>),
        (status = 404, description = "Not Found"),
    ),
    security(("admin_cookie" = [])),
    tag = "Admin"
)]
pub async fn update_coupon(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<CouponInput>,
) -> ActionResult<Coupon> {
    coupon_service::update_coupon(&state.db, id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/admin/coupons/{id}",
    params(("id" = i64, Path, description = "Coupon ID")),
    responses(
        (status = 200, description = "Coupon deleted", body = ActionEnvelope<Deleted>),
        (status = 404, description = "Not Found"),
    ),
    security(("admin_cookie" = [])),
    tag = "Admin"
)]
pub async fn delete_coupon(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> ActionResult<Deleted> {
    coupon_service::delete_coupon(&state.db, id).await
}
