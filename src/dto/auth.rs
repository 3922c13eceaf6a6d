use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::User;

#[derive(Deserialize, Debug, ToSchema)]
pub struct OtpRequest {
    pub phone: String,
}

#[derive(Serialize, Debug, ToSchema, PartialEq)]
pub struct OtpSent {
    pub phone: String,
    pub expires_in_secs: i64,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct VerifyOtpRequest {
    pub phone: String,
    pub code: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct ProfileRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct AdminLoginRequest {
    pub phone: String,
    pub password: String,
}

/// What the client observes about the current sign-in.
#[derive(Serialize, Debug, ToSchema)]
pub struct SessionState {
    pub user: Option<User>,
    pub profile_complete: bool,
    pub loading: bool,
}

impl SessionState {
    pub fn signed_in(user: User) -> Self {
        Self {
            profile_complete: user.profile_complete(),
            user: Some(user),
            loading: false,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            user: None,
            profile_complete: false,
            loading: false,
        }
    }
}
