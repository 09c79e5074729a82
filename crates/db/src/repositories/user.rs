//! User repository for database operations.
//!
//! Registration inserts the user row and the two default wallet accounts in
//! a single database transaction, so every user has its accounts the moment
//! it exists.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{accounts, users};

/// Wallets created for every new user, balance zero.
pub const DEFAULT_ACCOUNTS: [&str; 2] = ["Cash", "Card"];

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// User not found.
    #[error("User not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Checks if an email is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Creates a new user together with its default accounts.
    ///
    /// The caller supplies the id: a fresh UUIDv7 for local users, or the
    /// external provider's subject id for delegated ones (`password_hash`
    /// is `None` in that case). User row and both accounts are committed
    /// as one unit.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails; nothing is persisted then.
    pub async fn create(
        &self,
        id: Uuid,
        email: &str,
        password_hash: Option<&str>,
    ) -> Result<users::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let txn = self.db.begin().await?;

        let user = users::ActiveModel {
            id: Set(id),
            email: Set(email.to_string()),
            password_hash: Set(password_hash.map(ToString::to_string)),
            avatar_url: Set(None),
            theme_color: Set("#2196f3".to_string()),
            is_dark_mode: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let user = user.insert(&txn).await?;

        for name in DEFAULT_ACCOUNTS {
            let account = accounts::ActiveModel {
                id: Set(Uuid::now_v7()),
                user_id: Set(user.id),
                name: Set(name.to_string()),
                balance: Set(Decimal::ZERO),
                created_at: Set(now),
            };
            account.insert(&txn).await?;
        }

        txn.commit().await?;
        Ok(user)
    }

    /// Updates profile settings; absent fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` if no such user exists.
    pub async fn update_settings(
        &self,
        user_id: Uuid,
        avatar_url: Option<String>,
        theme_color: Option<String>,
        is_dark_mode: Option<bool>,
    ) -> Result<users::Model, UserError> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(UserError::NotFound(user_id))?;

        let mut active: users::ActiveModel = user.into();

        if let Some(url) = avatar_url {
            active.avatar_url = Set(Some(url));
        }
        if let Some(color) = theme_color {
            active.theme_color = Set(color);
        }
        if let Some(dark) = is_dark_mode {
            active.is_dark_mode = Set(dark);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Deletes a user; accounts and transactions cascade.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` if no such user exists.
    pub async fn delete(&self, user_id: Uuid) -> Result<(), UserError> {
        let result = users::Entity::delete_by_id(user_id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(UserError::NotFound(user_id));
        }
        Ok(())
    }
}
