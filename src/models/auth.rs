//! Authentication DTOs

use serde::{Deserialize, Serialize};

use crate::models::user::UserInfo;

/// Login request
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: u64,
    pub user: UserInfo,
}

/// Verify response
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub authenticated: bool,
    pub user: UserInfo,
}
