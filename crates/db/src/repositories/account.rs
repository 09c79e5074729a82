//! Account repository for wallet database operations.
//!
//! The balance-adjust operation folds the ownership check into the UPDATE's
//! WHERE clause, so check and mutation are a single atomic statement and a
//! foreign account can never be moved between check and write.

use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::entities::accounts;

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account missing or owned by someone else; the two cases are
    /// deliberately indistinguishable to the caller.
    #[error("Account not found or not owned by caller: {0}")]
    NotFoundOrForbidden(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Account repository for wallet operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the caller's accounts, id ascending.
    ///
    /// Ids are UUIDv7, so this is creation order and stable.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<accounts::Model>, DbErr> {
        accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id))
            .order_by_asc(accounts::Column::Id)
            .all(&self.db)
            .await
    }

    /// Atomically applies `balance = balance + delta` to an account the
    /// caller owns, on the given connection (pass an open transaction to
    /// make the adjustment part of a larger atomic unit).
    ///
    /// Returns the account as it stands after the update.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFoundOrForbidden` when the UPDATE matched
    /// no row, i.e. the account does not exist or belongs to another user.
    pub async fn adjust_balance<C: ConnectionTrait>(
        conn: &C,
        account_id: Uuid,
        user_id: Uuid,
        delta: Decimal,
    ) -> Result<accounts::Model, AccountError> {
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).add(delta),
            )
            .filter(accounts::Column::Id.eq(account_id))
            .filter(accounts::Column::UserId.eq(user_id))
            .exec(conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AccountError::NotFoundOrForbidden(account_id));
        }

        // Same connection: inside a transaction this reads the updated row.
        accounts::Entity::find_by_id(account_id)
            .one(conn)
            .await?
            .ok_or(AccountError::NotFoundOrForbidden(account_id))
    }
}
