//! Health check endpoint.

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use crate::AppState;

/// Liveness probe. Answers without touching the database.
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "futura",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
