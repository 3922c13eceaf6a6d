use axum::http::{HeaderMap, header};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const USER_COOKIE: &str = "session";
pub const ADMIN_COOKIE: &str = "admin_session";

/// Which sign-in produced a token. Each cookie only accepts its own scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Storefront,
    Admin,
}

impl Scope {
    pub fn cookie(&self) -> &'static str {
        match self {
            Scope::Storefront => USER_COOKIE,
            Scope::Admin => ADMIN_COOKIE,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub scope: Scope,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// A freshly signed session, ready to be written as a cookie.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub max_age_secs: i64,
}

pub fn issue(
    secret: &str,
    user_id: i64,
    role: &str,
    scope: Scope,
    ttl_hours: i64,
) -> AppResult<IssuedSession> {
    let ttl = Duration::hours(ttl_hours);
    let expiration = Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        scope,
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    Ok(IssuedSession {
        token,
        max_age_secs: ttl.num_seconds(),
    })
}

/// `None` for tampered, expired or malformed tokens.
pub fn verify(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}

pub fn set_cookie(name: &str, session: &IssuedSession) -> String {
    format!(
        "{name}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        session.token, session.max_age_secs
    )
}

pub fn clear_cookie(name: &str) -> String {
    format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value)
}

/// Canonical mobile number `09XXXXXXXXX`. Accepts `+98`/`0098`/`98`
/// prefixes, separators and Persian or Arabic-Indic digits.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let mut digits = String::with_capacity(raw.len());
    for (idx, ch) in raw.trim().chars().enumerate() {
        match ch {
            '0'..='9' => digits.push(ch),
            '۰'..='۹' => digits.push(shift_digit(ch, '۰')),
            '٠'..='٩' => digits.push(shift_digit(ch, '٠')),
            ' ' | '-' | '(' | ')' => {}
            '+' if idx == 0 => {}
            _ => return None,
        }
    }

    let national = if let Some(rest) = digits.strip_prefix("0098") {
        rest
    } else if digits.len() == 12 && digits.starts_with("98") {
        &digits[2..]
    } else if let Some(rest) = digits.strip_prefix('0') {
        rest
    } else {
        digits.as_str()
    };

    if national.len() == 10 && national.starts_with('9') {
        Some(format!("0{national}"))
    } else {
        None
    }
}

fn shift_digit(ch: char, zero: char) -> char {
    let offset = ch as u32 - zero as u32;
    char::from_digit(offset, 10).unwrap_or('?')
}
