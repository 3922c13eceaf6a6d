use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;

use crate::{
    dto::auth::{OtpRequest, OtpSent, ProfileRequest, SessionState, VerifyOtpRequest},
    error::ActionResult,
    middleware::auth::AuthUser,
    models::User,
    response::{Acknowledged, ActionEnvelope},
    services::auth_service,
    session::{self, USER_COOKIE},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/otp", post(request_otp))
        .route("/verify", post(verify_otp))
        .route("/profile", post(complete_profile))
        .route("/session", get(current_session))
        .route("/logout", post(logout))
}

/// Attach a `Set-Cookie` header to an action response.
pub(crate) fn with_cookie<T: Serialize>(cookie: String, body: ActionResult<T>) -> Response {
    (AppendHeaders([(header::SET_COOKIE, cookie)]), body).into_response()
}

#[utoipa::path(
    post,
    path = "/api/auth/otp",
    request_body = OtpRequest,
    responses(
        (status = 200, description = "Code sent", body = ActionEnvelope<OtpSent>),
        (status = 400, description = "Invalid phone number"),
    ),
    tag = "Auth"
)]
pub async fn request_otp(
    State(state): State<AppState>,
    Json(payload): Json<OtpRequest>,
) -> ActionResult<OtpSent> {
    auth_service::request_otp(&state.db, payload).await
}

#[utoipa::path(
    post,
    path = "/api/auth/verify",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Signed in; sets the session cookie", body = ActionEnvelope<SessionState>),
        (status = 400, description = "Wrong or expired code"),
    ),
    tag = "Auth"
)]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Response {
    match auth_service::verify_otp(&state.db, &state.config, payload).await {
        ActionResult::Success(signed_in) => with_cookie(
            session::set_cookie(USER_COOKIE, &signed_in.session),
            ActionResult::Success(SessionState::signed_in(signed_in.user)),
        ),
        ActionResult::Failure(err) => ActionResult::<SessionState>::Failure(err).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/profile",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Profile saved", body = ActionEnvelope<User>),
        (status = 400, description = "Missing name or invalid email"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("session_cookie" = [])),
    tag = "Auth"
)]
pub async fn complete_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ProfileRequest>,
) -> ActionResult<User> {
    auth_service::complete_profile(&state.db, &user, payload).await
}

#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Current visitor; user is null when signed out", body = ActionEnvelope<SessionState>),
    ),
    tag = "Auth"
)]
pub async fn current_session(
    State(state): State<AppState>,
    user: Option<AuthUser>,
) -> ActionResult<SessionState> {
    auth_service::current_session(&state.db, user).await
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = Acknowledged),
    ),
    tag = "Auth"
)]
pub async fn logout() -> impl IntoResponse {
    (
        AppendHeaders([(header::SET_COOKIE, session::clear_cookie(USER_COOKIE))]),
        Json(Acknowledged { success: true }),
    )
}
