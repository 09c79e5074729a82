//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::{AppState, middleware::auth::auth_middleware};
use futura_shared::AppError;

pub mod accounts;
pub mod auth;
pub mod health;
pub mod transactions;
pub mod users;

/// Creates the API router: public routes plus the protected set behind the
/// bearer-token middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(accounts::routes())
        .merge(transactions::routes())
        .merge(users::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}

/// Converts an [`AppError`] into the uniform JSON error envelope.
///
/// Server-side errors are logged in full and reported to the client with a
/// generic message only.
pub fn error_response(err: &AppError) -> Response {
    let status = StatusCode::from_u16(err.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let message = if err.is_server_error() {
        error!(error = %err, "Request failed");
        "An internal error occurred".to_string()
    } else {
        err.to_string()
    };

    (
        status,
        Json(json!({
            "error": err.error_code().to_ascii_lowercase(),
            "message": message
        })),
    )
        .into_response()
}
