use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};

use crate::{
    dto::categories::CategoryInput,
    error::ActionResult,
    middleware::auth::AdminUser,
    models::{Category, CategoryNode},
    response::{ActionEnvelope, Deleted},
    routes::params::{CategoryFilter, CategoryQuery},
    services::category_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/tree", get(category_tree))
        .route("/{slug}", get(get_category))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(admin_list_categories).post(create_category))
        .route("/{id}", put(update_category).delete(delete_category))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    params(
        ("limit" = Option<String>, Query, description = "Maximum rows, default 6"),
        ("parentId" = Option<String>, Query, description = "Parent category; absent means top level"),
        ("sortBy" = Option<String>, Query, description = "name | order (default order)"),
        ("sortOrder" = Option<String>, Query, description = "ASC | DESC (default ASC)"),
    ),
    responses(
        (status = 200, description = "Active categories", body = ActionEnvelope<Vec<Category>>),
        (status = 500, description = "Database unavailable"),
    ),
    tag = "Storefront"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> ActionResult<Vec<Category>> {
    let filter = CategoryFilter::from_query(&query);
    category_service::fetch_active_categories_client(&state.db, &filter).await
}

#[utoipa::path(
    get,
    path = "/api/categories/tree",
    responses(
        (status = 200, description = "Active categories nested by parent", body = ActionEnvelope<Vec<CategoryNode>>),
    ),
    tag = "Storefront"
)]
pub async fn category_tree(State(state): State<AppState>) -> ActionResult<Vec<CategoryNode>> {
    category_service::fetch_category_tree(&state.db).await
}

#[utoipa::path(
    get,
    path = "/api/categories/{slug}",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 200, description = "Category", body = ActionEnvelope<Category>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Storefront"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ActionResult<Category> {
    category_service::fetch_category_by_slug(&state.db, &slug).await
}

#[utoipa::path(
    get,
    path = "/api/admin/categories",
    responses(
        (status = 200, description = "All categories", body = ActionEnvelope<Vec<Category>>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("admin_cookie" = [])),
    tag = "Admin"
)]
pub async fn admin_list_categories(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ActionResult<Vec<Category>> {
    category_service::list_categories_admin(&state.db).await
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CategoryInput,
    responses(
        (status = 200, description = "Category created", body = ActionEnvelope<Category>),
        (status = 400, description = "Invalid category"),
    ),
    security(("admin_cookie" = [])),
    tag = "Admin"
)]
pub async fn create_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<CategoryInput>,
) -> ActionResult<Category> {
    category_service::create_category(&state.db, payload).await
}

#[utoipa::path(
    put,
    path = "/api/admin/categories/{id}",
    params(("id" = i64, Path, description = "Category ID")),
    request_body = CategoryInput,
    responses(
        (status = 200, description = "Category updated", body = ActionEnvelope<Category>),
        (status = 400, description = "Invalid parent or cycle"),
        (status = 404, description = "Not Found"),
    ),
    security(("admin_cookie" = [])),
    tag = "Admin"
)]
pub async fn update_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryInput>,
) -> ActionResult<Category> {
    category_service::update_category(&state.db, id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(("id" = i64, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = ActionEnvelope<Deleted>),
        (status = 404, description = "Not Found"),
    ),
    security(("admin_cookie" = [])),
    tag = "Admin"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> ActionResult<Deleted> {
    category_service::delete_category(&state.db, id).await
}
