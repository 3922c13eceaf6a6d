use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};

use crate::{
    error::{AppError, msg},
    session::{self, Claims, Scope},
    state::AppState,
};

/// Signed-in storefront user, taken from the `session` cookie.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub role: String,
}

/// Back-office user, taken from the `admin_session` cookie.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub user_id: i64,
}

pub fn ensure_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

fn claims_from_cookie(parts: &Parts, state: &AppState, scope: Scope) -> Result<Claims, AppError> {
    let token = session::read_cookie(&parts.headers, scope.cookie())
        .ok_or(AppError::Unauthorized(msg::LOGIN_REQUIRED))?;

    let secret = state
        .config
        .session_secret
        .as_deref()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("SESSION_SECRET is not set")))?;

    session::verify(secret, token)
        .filter(|claims| claims.scope == scope)
        .ok_or(AppError::Unauthorized(msg::LOGIN_REQUIRED))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = claims_from_cookie(parts, state, Scope::Storefront)?;
        let user_id = claims
            .user_id()
            .ok_or(AppError::Unauthorized(msg::LOGIN_REQUIRED))?;
        Ok(AuthUser {
            user_id,
            role: claims.role,
        })
    }
}

/// Anonymous visitors and stale cookies read as `None`.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        match <AuthUser as FromRequestParts<AppState>>::from_request_parts(parts, state).await {
            Ok(user) => Ok(Some(user)),
            Err(AppError::Unauthorized(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = claims_from_cookie(parts, state, Scope::Admin)?;
        let user_id = claims
            .user_id()
            .ok_or(AppError::Unauthorized(msg::LOGIN_REQUIRED))?;
        let user = AuthUser {
            user_id,
            role: claims.role,
        };
        ensure_role(&user, "admin")?;
        Ok(AdminUser { user_id })
    }
}
