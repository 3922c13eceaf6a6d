use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::header,
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, patch, post},
};

use crate::{
    dto::{
        auth::AdminLoginRequest,
        sms::CampaignInput,
        tickets::{TicketReply, TicketStatusUpdate},
        users::UserActiveUpdate,
    },
    error::ActionResult,
    middleware::auth::AdminUser,
    models::{SmsCampaign, SupportTicket, User},
    response::{Acknowledged, ActionEnvelope, Page},
    routes::{
        auth::with_cookie,
        banners, categories, coupons, pages,
        params::{AdminListQuery, Pagination},
        products,
    },
    services::{auth_service, sms_service, ticket_service, user_service},
    session::{self, ADMIN_COOKIE},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/users", get(list_users))
        .route("/users/{id}/active", patch(set_user_active))
        .route("/tickets", get(list_tickets))
        .route("/tickets/{id}/reply", post(reply_ticket))
        .route("/tickets/{id}/status", patch(set_ticket_status))
        .route("/sms", get(list_campaigns).post(create_campaign))
        .nest("/banners", banners::admin_router())
        .nest("/categories", categories::admin_router())
        .nest("/pages", pages::admin_router())
        .nest("/products", products::admin_router())
        .nest("/coupons", coupons::admin_router())
}

#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Signed in; sets the admin_session cookie", body = ActionEnvelope<User>),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "Admin"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginRequest>,
) -> Response {
    match auth_service::login_admin(&state.db, &state.config, payload).await {
        ActionResult::Success(signed_in) => with_cookie(
            session::set_cookie(ADMIN_COOKIE, &signed_in.session),
            ActionResult::Success(signed_in.user),
        ),
        ActionResult::Failure(err) => ActionResult::<User>::Failure(err).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/logout",
    responses(
        (status = 200, description = "Admin cookie cleared", body = Acknowledged),
    ),
    tag = "Admin"
)]
pub async fn logout() -> impl IntoResponse {
    (
        AppendHeaders([(header::SET_COOKIE, session::clear_cookie(ADMIN_COOKIE))]),
        Json(Acknowledged { success: true }),
    )
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Part of the phone number"),
    ),
    responses(
        (status = 200, description = "Users", body = ActionEnvelope<Page<User>>),
        (status = 403, description = "Forbidden"),
    ),
    security(("admin_cookie" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<AdminListQuery>,
) -> ActionResult<Page<User>> {
    user_service::list_users(&state.db, query).await
}

#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}/active",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UserActiveUpdate,
    responses(
        (status = 200, description = "User enabled or disabled", body = ActionEnvelope<User>),
        (status = 404, description = "Not Found"),
    ),
    security(("admin_cookie" = [])),
    tag = "Admin"
)]
pub async fn set_user_active(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<UserActiveUpdate>,
) -> ActionResult<User> {
    user_service::set_user_active(&state.db, id, payload).await
}

#[utoipa::path(
    get,
    path = "/api/admin/tickets",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Status: open | answered | closed"),
    ),
    responses(
        (status = 200, description = "Support tickets", body = ActionEnvelope<Page<SupportTicket>>),
    ),
    security(("admin_cookie" = [])),
    tag = "Admin"
)]
pub async fn list_tickets(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<AdminListQuery>,
) -> ActionResult<Page<SupportTicket>> {
    ticket_service::list_tickets(&state.db, query).await
}

#[utoipa::path(
    post,
    path = "/api/admin/tickets/{id}/reply",
    params(("id" = i64, Path, description = "Ticket ID")),
    request_body = TicketReply,
    responses(
        (status = 200, description = "Reply stored; ticket answered", body = ActionEnvelope<SupportTicket>),
        (status = 404, description = "Not Found"),
    ),
    security(("admin_cookie" = [])),
    tag = "Admin"
)]
pub async fn reply_ticket(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<TicketReply>,
) -> ActionResult<SupportTicket> {
    ticket_service::reply_ticket(&state.db, id, payload).await
}

#[utoipa::path(
    patch,
    path = "/api/admin/tickets/{id}/status",
    params(("id" = i64, Path, description = "Ticket ID")),
    request_body = TicketStatusUpdate,
    responses(
        (status = 200, description = "Status changed", body = ActionEnvelope<SupportTicket>),
        (status = 400, description = "Invalid status"),
    ),
    security(("admin_cookie" = [])),
    tag = "Admin"
)]
pub async fn set_ticket_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<TicketStatusUpdate>,
) -> ActionResult<SupportTicket> {
    ticket_service::set_ticket_status(&state.db, id, payload).await
}

#[utoipa::path(
    get,
    path = "/api/admin/sms",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "SMS campaigns", body = ActionEnvelope<Page<SmsCampaign>>),
    ),
    security(("admin_cookie" = [])),
    tag = "Admin"
)]
pub async fn list_campaigns(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(pagination): Query<Pagination>,
) -> ActionResult<Page<SmsCampaign>> {
    sms_service::list_campaigns(&state.db, pagination).await
}

#[utoipa::path(
    post,
    path = "/api/admin/sms",
    request_body = CampaignInput,
    responses(
        (status = 200, description = "Campaign queued", body = ActionEnvelope<SmsCampaign>),
        (status = 400, description = "Invalid audience"),
    ),
    security(("admin_cookie" = [])),
    tag = "Admin"
)]
pub async fn create_campaign(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<CampaignInput>,
) -> ActionResult<SmsCampaign> {
    sms_service::create_campaign(&state.db, payload).await
}
