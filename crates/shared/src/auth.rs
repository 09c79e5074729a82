//! Request and response payload types for the auth routes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

/// Registration request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

/// User info returned in auth responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: Uuid,
    /// User email.
    pub email: String,
}

/// Registration response payload.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    /// Human-readable status message.
    pub message: String,
    /// The newly created user.
    pub user: UserInfo,
}

/// Login response payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Human-readable status message.
    pub message: String,
    /// Bearer token for subsequent requests.
    pub token: String,
    /// The authenticated user.
    pub user: UserInfo,
    /// Token expiration in seconds.
    pub expires_in: i64,
}

/// Settings update request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSettingsRequest {
    /// Avatar reference (URL or data URI).
    pub avatar_url: Option<String>,
    /// Accent color for the UI.
    pub theme_color: Option<String>,
    /// Dark-mode flag.
    pub is_dark_mode: Option<bool>,
}
