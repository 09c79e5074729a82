//! Transaction repository for the personal ledger.
//!
//! Recording and deleting a transaction each touch two tables (the
//! transaction row and the owning account's balance); both paths run inside
//! a single database transaction so either both mutations persist or
//! neither does.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use crate::entities::{accounts, transactions};
use crate::repositories::account::{AccountError, AccountRepository};

/// Error types for ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Transaction missing or owned (via its account) by someone else.
    #[error("Transaction not found: {0}")]
    NotFound(Uuid),

    /// Target account missing or owned by someone else.
    #[error("Account not found or not owned by caller: {0}")]
    AccountNotFoundOrForbidden(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AccountError> for TransactionError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::NotFoundOrForbidden(id) => Self::AccountNotFoundOrForbidden(id),
            AccountError::Database(e) => Self::Database(e),
        }
    }
}

/// Input for recording a transaction.
///
/// `amount` is already signed: the API layer applies the signing policy
/// (`futura_core::ledger::signed_amount`) before it reaches the repository.
#[derive(Debug, Clone)]
pub struct RecordTransactionInput {
    /// Acting user (owner check).
    pub user_id: Uuid,
    /// Target account.
    pub account_id: Uuid,
    /// Signed amount: positive income, negative expense.
    pub amount: Decimal,
    /// Category label.
    pub category: String,
    /// Free-form comment.
    pub comment: Option<String>,
    /// Entry date.
    pub date: DateTime<Utc>,
}

/// Result of recording a transaction.
#[derive(Debug, Clone)]
pub struct RecordedTransaction {
    /// The persisted transaction row.
    pub transaction: transactions::Model,
    /// The owning account's balance after the adjustment.
    pub new_balance: Decimal,
}

/// A transaction annotated with its owning account's name, for history
/// display.
#[derive(Debug, Clone)]
pub struct TransactionWithAccount {
    /// The transaction row.
    pub transaction: transactions::Model,
    /// Name of the owning account.
    pub account_name: String,
}

/// Transaction repository for ledger operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a transaction and adjusts the owning account's balance as
    /// one atomic unit.
    ///
    /// The balance UPDATE carries the ownership predicate, so a missing or
    /// foreign account fails before anything is written.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::AccountNotFoundOrForbidden` when the
    /// account does not belong to the user; any failure rolls back both
    /// mutations.
    pub async fn record(
        &self,
        input: RecordTransactionInput,
    ) -> Result<RecordedTransaction, TransactionError> {
        let txn = self.db.begin().await?;

        let account =
            AccountRepository::adjust_balance(&txn, input.account_id, input.user_id, input.amount)
                .await?;

        let row = transactions::ActiveModel {
            id: Set(Uuid::now_v7()),
            account_id: Set(input.account_id),
            amount: Set(input.amount),
            category: Set(input.category),
            comment: Set(input.comment),
            date: Set(input.date.into()),
            created_at: Set(Utc::now().into()),
        };
        let transaction = row.insert(&txn).await?;

        txn.commit().await?;

        debug!(
            transaction_id = %transaction.id,
            account_id = %transaction.account_id,
            new_balance = %account.balance,
            "Ledger entry recorded"
        );
        Ok(RecordedTransaction {
            transaction,
            new_balance: account.balance,
        })
    }

    /// Deletes a transaction and reverses its effect on the owning
    /// account's balance as one atomic unit.
    ///
    /// Deleting twice fails the second time with `NotFound` and leaves the
    /// balance untouched.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::NotFound` when no transaction with that
    /// id is owned, via its account, by the user.
    pub async fn delete(&self, user_id: Uuid, transaction_id: Uuid) -> Result<(), TransactionError> {
        let txn = self.db.begin().await?;

        // Ownership is transitive: the transaction's account must belong
        // to the acting user.
        let (transaction, account) = transactions::Entity::find_by_id(transaction_id)
            .find_also_related(accounts::Entity)
            .one(&txn)
            .await?
            .ok_or(TransactionError::NotFound(transaction_id))?;

        let account = account.ok_or(TransactionError::NotFound(transaction_id))?;
        if account.user_id != user_id {
            return Err(TransactionError::NotFound(transaction_id));
        }

        AccountRepository::adjust_balance(&txn, account.id, user_id, -transaction.amount).await?;

        // The row deletion is the linearization point: a concurrent delete
        // that committed first leaves zero rows here, and bailing out rolls
        // back our balance reversal with the transaction.
        let result = transactions::Entity::delete_by_id(transaction_id)
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(TransactionError::NotFound(transaction_id));
        }

        txn.commit().await?;

        debug!(transaction_id = %transaction_id, "Ledger entry deleted and balance reversed");
        Ok(())
    }

    /// Lists the user's most recent transactions across all accounts, date
    /// descending, each annotated with the owning account's name.
    ///
    /// `limit` of `None` returns the full history.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_recent(
        &self,
        user_id: Uuid,
        limit: Option<u64>,
    ) -> Result<Vec<TransactionWithAccount>, TransactionError> {
        let rows = transactions::Entity::find()
            .find_also_related(accounts::Entity)
            .filter(accounts::Column::UserId.eq(user_id))
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(transaction, account)| {
                account.map(|a| TransactionWithAccount {
                    transaction,
                    account_name: a.name,
                })
            })
            .collect())
    }
}
