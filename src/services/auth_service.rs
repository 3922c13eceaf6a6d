use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use password_hash::rand_core::{OsRng, RngCore};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::{
    config::AppConfig,
    db::Db,
    dto::auth::{AdminLoginRequest, OtpRequest, OtpSent, ProfileRequest, SessionState, VerifyOtpRequest},
    entity::{otp_codes, users},
    error::{ActionResult, AppError, AppResult, msg},
    middleware::auth::AuthUser,
    models::User,
    services::{non_blank, required, user_service::user_from_entity},
    session::{self, IssuedSession, Scope, normalize_phone},
};

/// Lifetime of a one-time code.
pub const OTP_TTL_SECS: i64 = 120;
/// A phone may be sent a new code once per this many seconds.
pub const OTP_RESEND_SECS: i64 = 60;
/// Wrong guesses a single code tolerates before it is discarded.
pub const MAX_OTP_ATTEMPTS: i32 = 5;

/// A verified user together with the session to hand back as a cookie.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: User,
    pub session: IssuedSession,
}

pub async fn request_otp(db: &Db, payload: OtpRequest) -> ActionResult<OtpSent> {
    ActionResult::settle(store_otp(db, &payload.phone).await, "request_otp", msg::AUTH_FAILED)
}

pub async fn verify_otp(
    db: &Db,
    config: &AppConfig,
    payload: VerifyOtpRequest,
) -> ActionResult<SignedIn> {
    ActionResult::settle(
        consume_otp(db, config, payload).await,
        "verify_otp",
        msg::AUTH_FAILED,
    )
}

pub async fn complete_profile(
    db: &Db,
    user: &AuthUser,
    payload: ProfileRequest,
) -> ActionResult<User> {
    ActionResult::settle(
        save_profile(db, user.user_id, payload).await,
        "complete_profile",
        msg::SAVE_FAILED,
    )
}

/// What the storefront shows for the current visitor. A stale or disabled
/// account reads as signed out.
pub async fn current_session(db: &Db, user: Option<AuthUser>) -> ActionResult<SessionState> {
    let Some(user) = user else {
        return ActionResult::Success(SessionState::signed_out());
    };
    let result = users::Entity::find_by_id(user.user_id)
        .one(&*db.orm())
        .await
        .map_err(AppError::from)
        .map(|found| match found {
            Some(model) if model.is_active => SessionState::signed_in(user_from_entity(model)),
            _ => SessionState::signed_out(),
        });
    ActionResult::settle(result, "current_session", msg::LOAD_FAILED)
}

pub async fn login_admin(
    db: &Db,
    config: &AppConfig,
    payload: AdminLoginRequest,
) -> ActionResult<SignedIn> {
    ActionResult::settle(
        check_admin(db, config, payload).await,
        "login_admin",
        msg::AUTH_FAILED,
    )
}

fn secret(config: &AppConfig) -> AppResult<&str> {
    config
        .session_secret
        .as_deref()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("SESSION_SECRET is not set")))
}

fn phone_or_reject(raw: &str) -> AppResult<String> {
    normalize_phone(raw).ok_or_else(|| AppError::bad_request(msg::INVALID_PHONE))
}

fn hash_secret(value: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(value.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn verify_secret(value: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(value.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Six decimal digits, leading zeros kept.
pub fn generate_otp() -> String {
    format!("{:06}", OsRng.next_u32() % 1_000_000)
}

async fn store_otp(db: &Db, raw_phone: &str) -> AppResult<OtpSent> {
    let phone = phone_or_reject(raw_phone)?;
    let now = Utc::now();
    let conn = db.orm();

    let recent = otp_codes::Entity::find()
        .filter(otp_codes::Column::Phone.eq(phone.as_str()))
        .filter(otp_codes::Column::CreatedAt.gt(now - Duration::seconds(OTP_RESEND_SECS)))
        .count(&*conn)
        .await?;
    if recent > 0 {
        return Err(AppError::bad_request(msg::OTP_TOO_SOON));
    }

    let code = generate_otp();
    otp_codes::ActiveModel {
        id: NotSet,
        phone: Set(phone.clone()),
        code_hash: Set(hash_secret(&code)?),
        attempts: Set(0),
        expires_at: Set(now + Duration::seconds(OTP_TTL_SECS)),
        created_at: Set(now),
    }
    .insert(&*conn)
    .await?;

    // Delivery goes through the SMS gateway; the code only reaches debug logs.
    tracing::debug!(phone = %phone, code = %code, "otp issued");
    Ok(OtpSent {
        phone,
        expires_in_secs: OTP_TTL_SECS,
    })
}

async fn consume_otp(
    db: &Db,
    config: &AppConfig,
    payload: VerifyOtpRequest,
) -> AppResult<SignedIn> {
    let phone = phone_or_reject(&payload.phone)?;
    let code = payload.code.trim();
    let secret = secret(config)?;
    let conn = db.orm();

    let latest = otp_codes::Entity::find()
        .filter(otp_codes::Column::Phone.eq(phone.as_str()))
        .filter(otp_codes::Column::ExpiresAt.gt(Utc::now()))
        .order_by_desc(otp_codes::Column::CreatedAt)
        .one(&*conn)
        .await?
        .ok_or_else(|| AppError::bad_request(msg::INVALID_OTP))?;

    // The attempt is recorded before the hash check, so concurrent guesses
    // share one budget.
    let claimed = otp_codes::Entity::update_many()
        .col_expr(
            otp_codes::Column::Attempts,
            Expr::col(otp_codes::Column::Attempts).add(1),
        )
        .filter(otp_codes::Column::Id.eq(latest.id))
        .filter(otp_codes::Column::Attempts.lt(MAX_OTP_ATTEMPTS))
        .exec(&*conn)
        .await?;
    if claimed.rows_affected == 0 {
        otp_codes::Entity::delete_by_id(latest.id).exec(&*conn).await?;
        tracing::warn!(phone = %phone, "otp discarded after repeated failures");
        return Err(AppError::bad_request(msg::OTP_LOCKED));
    }
    if !verify_secret(code, &latest.code_hash) {
        return Err(AppError::bad_request(msg::INVALID_OTP));
    }

    otp_codes::Entity::delete_many()
        .filter(otp_codes::Column::Phone.eq(phone.as_str()))
        .exec(&*conn)
        .await?;

    let model = match users::Entity::find()
        .filter(users::Column::Phone.eq(phone.as_str()))
        .one(&*conn)
        .await?
    {
        Some(existing) => existing,
        None => {
            let created = users::ActiveModel {
                id: NotSet,
                phone: Set(phone.clone()),
                first_name: Set(None),
                last_name: Set(None),
                email: Set(None),
                password_hash: Set(None),
                role: Set("user".to_string()),
                is_active: Set(true),
                created_at: Set(Utc::now()),
            }
            .insert(&*conn)
            .await?;
            tracing::info!(user_id = created.id, "user registered by otp");
            created
        }
    };
    if !model.is_active {
        return Err(AppError::bad_request(msg::ACCOUNT_DISABLED));
    }

    let session = session::issue(
        secret,
        model.id,
        &model.role,
        Scope::Storefront,
        config.session_ttl_hours,
    )?;
    Ok(SignedIn {
        user: user_from_entity(model),
        session,
    })
}

/// Loose shape check: one `@`, a dotted domain, no whitespace.
pub fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

async fn save_profile(db: &Db, user_id: i64, payload: ProfileRequest) -> AppResult<User> {
    let first_name = required(&payload.first_name)?;
    let last_name = required(&payload.last_name)?;
    let email = non_blank(payload.email);
    if email.as_deref().is_some_and(|e| !looks_like_email(e)) {
        return Err(AppError::bad_request(msg::INVALID_EMAIL));
    }

    let conn = db.orm();
    let existing = users::Entity::find_by_id(user_id)
        .one(&*conn)
        .await?
        .ok_or(AppError::Unauthorized(msg::LOGIN_REQUIRED))?;
    let mut active: users::ActiveModel = existing.into();
    active.first_name = Set(Some(first_name));
    active.last_name = Set(Some(last_name));
    active.email = Set(email);
    let model = active.update(&*conn).await?;
    Ok(user_from_entity(model))
}

async fn check_admin(db: &Db, config: &AppConfig, payload: AdminLoginRequest) -> AppResult<SignedIn> {
    let secret = secret(config)?;
    let phone = normalize_phone(&payload.phone)
        .ok_or(AppError::Unauthorized(msg::INVALID_CREDENTIALS))?;

    let model = users::Entity::find()
        .filter(users::Column::Phone.eq(phone.as_str()))
        .filter(users::Column::Role.eq("admin"))
        .one(&*db.orm())
        .await?
        .ok_or(AppError::Unauthorized(msg::INVALID_CREDENTIALS))?;

    let verified = model
        .password_hash
        .as_deref()
        .is_some_and(|hash| verify_secret(&payload.password, hash));
    if !verified {
        tracing::warn!(phone = %phone, "admin login rejected");
        return Err(AppError::Unauthorized(msg::INVALID_CREDENTIALS));
    }
    if !model.is_active {
        return Err(AppError::Unauthorized(msg::ACCOUNT_DISABLED));
    }

    let session = session::issue(
        secret,
        model.id,
        &model.role,
        Scope::Admin,
        config.session_ttl_hours,
    )?;
    tracing::info!(user_id = model.id, "admin signed in");
    Ok(SignedIn {
        user: user_from_entity(model),
        session,
    })
}
