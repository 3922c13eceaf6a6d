use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};

use crate::{
    dto::pages::InfoPageInput,
    error::ActionResult,
    middleware::auth::AdminUser,
    models::InfoPage,
    response::{ActionEnvelope, Deleted},
    services::page_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{slug}", get(get_page))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(admin_list_pages).post(create_page))
        .route("/{id}", put(update_page).delete(delete_page))
}

/// Missing and inactive pages answer 404 with the not-found message; a
/// database failure answers 500 with its own message.
#[utoipa::path(
    get,
    path = "/api/pages/{slug}",
    params(("slug" = String, Path, description = "Page slug")),
    responses(
        (status = 200, description = "Info page", body = ActionEnvelope<InfoPage>),
        (status = 404, description = "Missing or inactive page"),
        (status = 500, description = "Database unavailable"),
    ),
    tag = "Storefront"
)]
pub async fn get_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ActionResult<InfoPage> {
    page_service::fetch_info_page_by_slug(&state.db, &slug).await
}

#[utoipa::path(
    get,
    path = "/api/admin/pages",
    responses(
        (status = 200, description = "All info pages", body = ActionEnvelope<Vec<InfoPage>>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("admin_cookie" = [])),
    tag = "Admin"
)]
pub async fn admin_list_pages(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ActionResult<Vec<InfoPage>> {
    page_service::list_pages_admin(&state.db).await
}

#[utoipa::path(
    post,
    path = "/api/admin/pages",
    request_body = InfoPageInput,
    responses(
        (status = 200, description = "Page created", body = ActionEnvelope<InfoPage>),
        (status = 400, description = "Invalid page"),
    ),
    security(("admin_cookie" = [])),
    tag = "Admin"
)]
pub async fn create_page(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<InfoPageInput>,
) -> ActionResult<InfoPage> {
    page_service::create_page(&state.db, payload).await
}

#[utoipa::path(
    put,
    path = "/api/admin/pages/{id}",
    params(("id" = i64, Path, description = "Page ID")),
    request_body = InfoPageInput,
    responses(
        (status = 200, description = "Page updated", body = ActionEnvelope<InfoPage>),
        (status = 404, description = "Not Found"),
    ),
    security(("admin_cookie" = [])),
    tag = "Admin"
)]
pub async fn update_page(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<InfoPageInput>,
) -> ActionResult<InfoPage> {
    page_service::update_page(&state.db, id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/admin/pages/{id}",
    params(("id" = i64, Path, description = "Page ID")),
    responses(
        (status = 200, description = "Page deleted", body = ActionEnvelope<Deleted>),
        (status = 404, description = "Not Found"),
    ),
    security(("admin_cookie" = [])),
    tag = "Admin"
)]
pub async fn delete_page(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> ActionResult<Deleted> {
    page_service::delete_page(&state.db, id).await
}
