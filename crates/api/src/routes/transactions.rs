//! Transaction ledger routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, routes::error_response};
use futura_core::ledger::{EntryKind, signed_amount};
use futura_db::repositories::{
    RecordTransactionInput, TransactionError, TransactionRepository, TransactionWithAccount,
};
use futura_shared::AppError;

/// Category recorded when the client does not supply one.
const DEFAULT_CATEGORY: &str = "Other";

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", post(create_transaction))
        .route("/transactions", get(list_transactions))
        .route("/transactions/{id}", delete(delete_transaction))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for recording a transaction.
///
/// `amount` is an unsigned magnitude, accepted as either a JSON number or a
/// decimal string; the server signs it from `type` and never trusts a
/// client-supplied sign.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Target account.
    pub account_id: Uuid,
    /// Unsigned amount with at most two fraction digits.
    pub amount: Decimal,
    /// Entry kind: `"income"` or `"expense"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Category label (defaults to `"Other"`).
    pub category: Option<String>,
    /// Free-form comment (`description` also accepted).
    #[serde(alias = "description")]
    pub comment: Option<String>,
    /// Entry date (defaults to now).
    pub date: Option<DateTime<Utc>>,
}

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Cap on the number of entries returned; absent means full history.
    pub limit: Option<u64>,
}

/// Response for a single history entry.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// Owning account ID.
    pub account_id: Uuid,
    /// Name of the owning account.
    pub account_name: String,
    /// Signed amount: positive income, negative expense.
    pub amount: String,
    /// Category label.
    pub category: String,
    /// Free-form comment.
    pub comment: Option<String>,
    /// Entry date.
    pub date: String,
}

impl From<TransactionWithAccount> for TransactionResponse {
    fn from(row: TransactionWithAccount) -> Self {
        Self {
            id: row.transaction.id,
            account_id: row.transaction.account_id,
            account_name: row.account_name,
            amount: row.transaction.amount.to_string(),
            category: row.transaction.category,
            comment: row.transaction.comment,
            date: row.transaction.date.to_rfc3339(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Validates and signs the client-supplied amount.
fn parse_signed_amount(magnitude: Decimal, raw_kind: &str) -> Result<Decimal, AppError> {
    let kind = EntryKind::from_str(raw_kind)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    signed_amount(kind, magnitude).map_err(|e| AppError::Validation(e.to_string()))
}

fn ledger_error(err: TransactionError) -> AppError {
    match err {
        TransactionError::NotFound(id) => AppError::NotFound(format!("transaction {id}")),
        TransactionError::AccountNotFoundOrForbidden(id) => {
            AppError::NotFound(format!("account {id}"))
        }
        TransactionError::Database(e) => AppError::Database(e.to_string()),
    }
}

/// POST `/transactions` - Record a transaction and adjust the account
/// balance atomically.
async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> impl IntoResponse {
    // missing or malformed fields are the caller's error, not ours
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(e) => return error_response(&AppError::Validation(e.body_text())),
    };

    let amount = match parse_signed_amount(payload.amount, &payload.kind) {
        Ok(amount) => amount,
        Err(e) => return error_response(&e),
    };

    let repo = TransactionRepository::new((*state.db).clone());
    let input = RecordTransactionInput {
        user_id: auth.0,
        account_id: payload.account_id,
        amount,
        category: payload
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        comment: payload.comment,
        date: payload.date.unwrap_or_else(Utc::now),
    };

    match repo.record(input).await {
        Ok(recorded) => {
            info!(
                transaction_id = %recorded.transaction.id,
                account_id = %recorded.transaction.account_id,
                "Transaction recorded"
            );
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Transaction recorded",
                    "transaction": {
                        "id": recorded.transaction.id,
                        "account_id": recorded.transaction.account_id,
                        "amount": recorded.transaction.amount.to_string(),
                        "category": recorded.transaction.category,
                        "comment": recorded.transaction.comment,
                        "date": recorded.transaction.date.to_rfc3339(),
                    },
                    "newBalance": recorded.new_balance.to_string(),
                })),
            )
                .into_response()
        }
        Err(e) => error_response(&ledger_error(e)),
    }
}

/// GET `/transactions` - List the caller's history, newest first, as a bare
/// array.
async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListTransactionsQuery>,
) -> impl IntoResponse {
    let repo = TransactionRepository::new((*state.db).clone());

    match repo.list_recent(auth.0, query.limit).await {
        Ok(rows) => {
            let items: Vec<TransactionResponse> =
                rows.into_iter().map(TransactionResponse::from).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => error_response(&ledger_error(e)),
    }
}

/// DELETE `/transactions/{id}` - Remove an entry and reverse its balance
/// effect atomically.
async fn delete_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = TransactionRepository::new((*state.db).clone());

    match repo.delete(auth.0, id).await {
        Ok(()) => {
            info!(transaction_id = %id, "Transaction deleted");
            (
                StatusCode::OK,
                Json(json!({ "message": "Transaction deleted" })),
            )
                .into_response()
        }
        Err(e) => error_response(&ledger_error(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(25.50), "income", dec!(25.50))]
    #[case(dec!(10), "expense", dec!(-10))]
    #[case(dec!(0.01), "expense", dec!(-0.01))]
    fn test_parse_signed_amount(
        #[case] amount: Decimal,
        #[case] kind: &str,
        #[case] expected: Decimal,
    ) {
        assert_eq!(parse_signed_amount(amount, kind).unwrap(), expected);
    }

    // the sign always comes from the kind, never the payload
    #[rstest]
    #[case(dec!(5), "transfer")]
    #[case(dec!(-5), "income")]
    #[case(dec!(-5), "expense")]
    #[case(dec!(0), "income")]
    #[case(dec!(1.005), "income")]
    fn test_parse_rejects_invalid_input(#[case] amount: Decimal, #[case] kind: &str) {
        assert!(matches!(
            parse_signed_amount(amount, kind),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_request_accepts_snake_case_body() {
        let body = json!({
            "account_id": Uuid::now_v7(),
            "amount": "100",
            "type": "income",
            "description": "salary"
        });
        let parsed: CreateTransactionRequest = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.amount, dec!(100));
        assert_eq!(parsed.kind, "income");
        assert_eq!(parsed.comment.as_deref(), Some("salary"));
    }

    #[test]
    fn test_request_accepts_numeric_amount() {
        let body = json!({
            "account_id": Uuid::now_v7(),
            "amount": 100,
            "type": "income"
        });
        let parsed: CreateTransactionRequest = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.amount, dec!(100));
    }

    #[test]
    fn test_history_entry_serializes_snake_case() {
        let response = TransactionResponse {
            id: Uuid::now_v7(),
            account_id: Uuid::now_v7(),
            account_name: "Cash".to_string(),
            amount: "-30.00".to_string(),
            category: "Food".to_string(),
            comment: None,
            date: Utc::now().to_rfc3339(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("account_name").is_some());
        assert!(value.get("account_id").is_some());
        assert!(value.get("accountName").is_none());
    }
}
