pub mod auth_service;
pub mod banner_service;
pub mod category_service;
pub mod coupon_service;
pub mod page_service;
pub mod product_service;
pub mod sms_service;
pub mod ticket_service;
pub mod user_service;

use crate::error::{AppError, AppResult, msg};

/// Trimmed value of a mandatory text field.
pub(crate) fn required(value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::bad_request(msg::REQUIRED_FIELDS));
    }
    Ok(value.to_string())
}

/// Blank optional text is stored as NULL.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Lower-case, hyphen-separated slug. Letters of any script and digits are
/// kept, whitespace and underscores become hyphens.
pub fn normalize_slug(raw: &str) -> Option<String> {
    let mut slug = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
        } else if matches!(ch, '-' | '_' | ' ' | '\u{200c}') {
            if !slug.ends_with('-') {
                slug.push('-');
            }
        } else {
            return None;
        }
    }
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() { None } else { Some(slug) }
}

pub(crate) fn slug_or_reject(raw: &str) -> AppResult<String> {
    normalize_slug(raw).ok_or_else(|| AppError::bad_request(msg::INVALID_SLUG))
}

/// Map a unique-key violation to a validation message.
pub(crate) fn unique_violation(err: sqlx::Error, message: &'static str) -> AppError {
    let duplicate = err
        .as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation());
    if duplicate {
        AppError::bad_request(message)
    } else {
        AppError::DbError(err)
    }
}
