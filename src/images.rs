use axum::http::Uri;

use crate::error::{AppError, msg};

/// Hosts the storefront is allowed to load images from.
pub const ALLOWED_IMAGE_HOSTS: [&str; 2] = ["picsum.photos", "placehold.co"];

pub fn is_allowed_image_url(url: &str) -> bool {
    let Ok(uri) = url.trim().parse::<Uri>() else {
        return false;
    };
    let scheme_ok = matches!(uri.scheme_str(), Some("http") | Some("https"));
    let host_ok = uri
        .host()
        .map(|host| host.to_ascii_lowercase())
        .is_some_and(|host| ALLOWED_IMAGE_HOSTS.contains(&host.as_str()));
    scheme_ok && host_ok
}

pub fn ensure_image_url(url: &str) -> Result<(), AppError> {
    if is_allowed_image_url(url) {
        Ok(())
    } else {
        Err(AppError::bad_request(msg::INVALID_IMAGE_HOST))
    }
}

/// Optional image columns accept an absent or blank value.
pub fn ensure_optional_image_url(url: Option<&str>) -> Result<(), AppError> {
    match url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => ensure_image_url(url),
        None => Ok(()),
    }
}
