//! Wallet account routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, routes::error_response};
use futura_db::AccountRepository;
use futura_shared::AppError;

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/accounts", get(list_accounts))
}

/// Response for a single wallet account.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Account name.
    pub name: String,
    /// Current balance, fixed-point decimal as a string.
    pub balance: String,
}

/// GET `/accounts` - List the caller's accounts with current balances, as
/// a bare array.
async fn list_accounts(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.list_for_user(auth.0).await {
        Ok(accounts) => {
            let items: Vec<AccountResponse> = accounts
                .into_iter()
                .map(|a| AccountResponse {
                    id: a.id,
                    name: a.name,
                    balance: a.balance.to_string(),
                })
                .collect();

            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => error_response(&AppError::Database(e.to_string())),
    }
}
