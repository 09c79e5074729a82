//! User profile routes.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, put},
};
use serde_json::json;
use tracing::info;

use crate::{AppState, middleware::AuthUser, routes::error_response};
use futura_db::{UserRepository, repositories::UserError};
use futura_shared::AppError;
use futura_shared::auth::UpdateSettingsRequest;

/// Creates the user profile routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user/settings", put(update_settings))
        .route("/user/delete", delete(delete_user))
}

fn user_error(err: UserError) -> AppError {
    match err {
        UserError::NotFound(id) => AppError::NotFound(format!("user {id}")),
        UserError::Database(e) => AppError::Database(e.to_string()),
    }
}

/// PUT `/user/settings` - Update profile settings; absent fields keep their
/// value.
async fn update_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<UpdateSettingsRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(e) => return error_response(&AppError::Validation(e.body_text())),
    };

    let repo = UserRepository::new((*state.db).clone());

    match repo
        .update_settings(
            auth.0,
            payload.avatar_url,
            payload.theme_color,
            payload.is_dark_mode,
        )
        .await
    {
        Ok(user) => (
            StatusCode::OK,
            Json(json!({
                "message": "Settings updated",
                "settings": {
                    "avatarUrl": user.avatar_url,
                    "themeColor": user.theme_color,
                    "isDarkMode": user.is_dark_mode,
                }
            })),
        )
            .into_response(),
        Err(e) => error_response(&user_error(e)),
    }
}

/// DELETE `/user/delete` - Remove the caller's account and all of their
/// wallets and history.
async fn delete_user(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = UserRepository::new((*state.db).clone());

    match repo.delete(auth.0).await {
        Ok(()) => {
            info!(user_id = %auth.0, "User account deleted");
            (
                StatusCode::OK,
                Json(json!({ "message": "Account deleted" })),
            )
                .into_response()
        }
        Err(e) => error_response(&user_error(e)),
    }
}
