use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::response::ActionEnvelope;

/// Localized messages surfaced to callers.
pub mod msg {
    pub const BANNERS_FAILED: &str = "خطا در دریافت بنرها.";
    pub const CATEGORIES_FAILED: &str = "خطا در دریافت دسته‌بندی‌ها.";
    pub const CATEGORY_NOT_FOUND: &str = "دسته‌بندی یافت نشد.";
    pub const PAGE_FAILED: &str = "خطا در دریافت اطلاعات صفحه.";
    pub const PAGE_NOT_FOUND: &str = "صفحه یافت نشد یا غیرفعال است.";
    pub const PRODUCTS_FAILED: &str = "خطا در دریافت محصولات.";
    pub const PRODUCT_NOT_FOUND: &str = "محصول یافت نشد.";
    pub const SAVE_FAILED: &str = "خطا در ذخیره اطلاعات.";
    pub const DELETE_FAILED: &str = "خطا در حذف اطلاعات.";
    pub const LOAD_FAILED: &str = "خطا در دریافت اطلاعات.";
    pub const RECORD_NOT_FOUND: &str = "مورد درخواستی یافت نشد.";
    pub const AUTH_FAILED: &str = "خطا در ورود. لطفاً دوباره تلاش کنید.";
    pub const LOGIN_REQUIRED: &str = "لطفاً ابتدا وارد حساب کاربری شوید.";
    pub const INVALID_CREDENTIALS: &str = "شماره موبایل یا رمز عبور اشتباه است.";
    pub const INVALID_PHONE: &str = "شماره موبایل معتبر نیست.";
    pub const INVALID_OTP: &str = "کد تایید نامعتبر یا منقضی شده است.";
    pub const OTP_LOCKED: &str = "تعداد تلاش‌های ناموفق بیش از حد مجاز است. کد جدید دریافت کنید.";
    pub const OTP_TOO_SOON: &str = "کد تایید به تازگی ارسال شده است. لطفاً کمی صبر کنید.";
    pub const INVALID_IMAGE_HOST: &str = "آدرس تصویر از میزبان مجاز نیست.";
    pub const COUPON_INVALID: &str = "کد تخفیف معتبر نیست.";
    pub const ACCESS_DENIED: &str = "دسترسی غیرمجاز.";
    pub const ACCOUNT_DISABLED: &str = "حساب کاربری غیرفعال است.";
    pub const REQUIRED_FIELDS: &str = "لطفاً فیلدهای الزامی را تکمیل کنید.";
    pub const INVALID_SLUG: &str = "نامک (slug) معتبر نیست.";
    pub const SLUG_RESERVED: &str = "این نامک (slug) رزرو شده است.";
    pub const SLUG_TAKEN: &str = "این نامک (slug) قبلاً استفاده شده است.";
    pub const CODE_TAKEN: &str = "این کد تخفیف قبلاً ثبت شده است.";
    pub const INVALID_PARENT: &str = "دسته‌بندی والد معتبر نیست.";
    pub const CATEGORY_CYCLE: &str = "یک دسته‌بندی نمی‌تواند زیرمجموعه خودش باشد.";
    pub const INVALID_PRICE: &str = "قیمت وارد شده معتبر نیست.";
    pub const INVALID_DISCOUNT: &str = "مقدار تخفیف معتبر نیست.";
    pub const INVALID_STATUS: &str = "وضعیت انتخاب شده معتبر نیست.";
    pub const INVALID_AUDIENCE: &str = "گروه مخاطبان معتبر نیست.";
    pub const INVALID_EMAIL: &str = "ایمیل وارد شده معتبر نیست.";
    pub const COUPON_EXPIRED: &str = "مهلت استفاده از کد تخفیف به پایان رسیده است.";
    pub const COUPON_EXHAUSTED: &str = "ظرفیت استفاده از کد تخفیف تکمیل شده است.";
    pub const COUPON_MIN_ORDER: &str = "مبلغ سفارش برای این کد تخفیف کافی نیست.";
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("Forbidden")]
    Forbidden,

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Database,
    NotFound,
    Invalid,
    Unauthorized,
    Forbidden,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Database => "database",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Invalid => "invalid",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ErrorKind::Database => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Invalid => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ActionError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Map an internal error to what the caller may see. Driver and ORM
    /// details are replaced by `fallback`.
    pub fn from_app_error(err: &AppError, fallback: &'static str) -> Self {
        match err {
            AppError::NotFound(message) => Self::new(ErrorKind::NotFound, *message),
            AppError::BadRequest(message) => Self::new(ErrorKind::Invalid, message.clone()),
            AppError::Unauthorized(message) => Self::new(ErrorKind::Unauthorized, *message),
            AppError::Forbidden => Self::new(ErrorKind::Forbidden, msg::ACCESS_DENIED),
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                Self::new(ErrorKind::Database, fallback)
            }
        }
    }
}

/// Outcome of an action. Failures carry a localized message, never a driver error.
#[derive(Debug)]
pub enum ActionResult<T> {
    Success(T),
    Failure(ActionError),
}

impl<T> ActionResult<T> {
    /// Close an action boundary: log the internal error and keep only what
    /// the caller is allowed to see.
    pub fn settle(result: AppResult<T>, action: &'static str, fallback: &'static str) -> Self {
        match result {
            Ok(data) => ActionResult::Success(data),
            Err(err) => {
                match &err {
                    AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                        tracing::error!(action = action, error = ?err, "action failed");
                    }
                    _ => tracing::debug!(action = action, error = %err, "action rejected"),
                }
                ActionResult::Failure(ActionError::from_app_error(&err, fallback))
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ActionResult::Success(data) => Some(data),
            ActionResult::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ActionError> {
        match self {
            ActionResult::Success(_) => None,
            ActionResult::Failure(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<T, ActionError> {
        match self {
            ActionResult::Success(data) => Ok(data),
            ActionResult::Failure(err) => Err(err),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ActionResult<U> {
        match self {
            ActionResult::Success(data) => ActionResult::Success(f(data)),
            ActionResult::Failure(err) => ActionResult::Failure(err),
        }
    }
}

impl<T: Serialize> ActionResult<T> {
    pub fn into_envelope(self) -> ActionEnvelope<T> {
        match self {
            ActionResult::Success(data) => ActionEnvelope::success(data),
            ActionResult::Failure(err) => ActionEnvelope::failure(err.message, err.kind.as_str()),
        }
    }
}

impl<T: Serialize> Serialize for ActionResult<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ActionResult::Success(data) => ActionEnvelope::success(data).serialize(serializer),
            ActionResult::Failure(err) => {
                ActionEnvelope::<()>::failure(err.message.clone(), err.kind.as_str())
                    .serialize(serializer)
            }
        }
    }
}

impl<T: Serialize> IntoResponse for ActionResult<T> {
    fn into_response(self) -> Response {
        let status = match &self {
            ActionResult::Success(_) => StatusCode::OK,
            ActionResult::Failure(err) => err.kind.status(),
        };
        (status, axum::Json(self.into_envelope())).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ActionResult::<()>::settle(Err(self), "request", msg::LOAD_FAILED).into_response()
    }
}
