//! Registration and login routes.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use tracing::info;

use crate::{AppState, routes::error_response};
use futura_shared::AppError;
use futura_shared::auth::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

/// Creates the public auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Rejects empty or obviously malformed credentials before they reach the
/// issuer.
fn validate_credentials(email: &str, password: &str) -> Result<(), AppError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "email and password are required".to_string(),
        ));
    }
    if !email.contains('@') {
        return Err(AppError::Validation(
            "email address is not valid".to_string(),
        ));
    }
    Ok(())
}

/// POST `/register` - Create a new user with two empty default accounts.
async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(e) => return error_response(&AppError::Validation(e.body_text())),
    };

    if let Err(e) = validate_credentials(&payload.email, &payload.password) {
        return error_response(&e);
    }

    match state.session.register(&payload.email, &payload.password).await {
        Ok(user) => {
            info!(user_id = %user.id, "Registration completed");
            (
                StatusCode::OK,
                Json(RegisterResponse {
                    message: "User registered successfully".to_string(),
                    user,
                }),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/login` - Authenticate and issue a session token.
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(e) => return error_response(&AppError::Validation(e.body_text())),
    };

    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return error_response(&AppError::Validation(
            "email and password are required".to_string(),
        ));
    }

    match state
        .session
        .authenticate(&payload.email, &payload.password)
        .await
    {
        Ok(session) => (
            StatusCode::OK,
            Json(LoginResponse {
                message: "Login successful".to_string(),
                token: session.token,
                user: session.user,
                expires_in: state.session.token_expires_in(),
            }),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_plausible_credentials() {
        assert!(validate_credentials("user@example.com", "hunter22").is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        assert!(validate_credentials("", "hunter22").is_err());
        assert!(validate_credentials("   ", "hunter22").is_err());
        assert!(validate_credentials("user@example.com", "").is_err());
    }

    #[test]
    fn test_validate_rejects_email_without_at() {
        assert!(validate_credentials("not-an-email", "hunter22").is_err());
    }
}
