//! Integration tests for the account ledger and transaction recorder.
//!
//! These tests need a running Postgres; they connect via `DATABASE_URL`
//! and skip silently when it is unset, so `cargo test` stays green on
//! machines without a database.

#![allow(clippy::uninlined_format_args)]

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use futura_db::entities::transactions;
use futura_db::migration::{Migrator, MigratorTrait};
use futura_db::repositories::{
    AccountRepository, RecordTransactionInput, TransactionError, TransactionRepository,
    UserRepository,
};

async fn test_db() -> Option<DatabaseConnection> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let db = Database::connect(url).await.ok()?;
    Migrator::up(&db, None).await.ok()?;
    Some(db)
}

/// Creates a fresh user with a unique email and returns (user_id, cash_account_id).
async fn create_test_user(db: &DatabaseConnection) -> (Uuid, Uuid) {
    let users = UserRepository::new(db.clone());
    let email = format!("user-{}@test.com", Uuid::now_v7());
    let user = users
        .create(Uuid::now_v7(), &email, Some("$argon2id$fake"))
        .await
        .expect("create user");

    let accounts = AccountRepository::new(db.clone());
    let list = accounts.list_for_user(user.id).await.expect("list accounts");
    (user.id, list[0].id)
}

fn income(user_id: Uuid, account_id: Uuid, amount: Decimal) -> RecordTransactionInput {
    RecordTransactionInput {
        user_id,
        account_id,
        amount,
        category: "Salary".to_string(),
        comment: Some("test entry".to_string()),
        date: Utc::now(),
    }
}

#[tokio::test]
async fn test_registration_creates_two_zero_balance_accounts() {
    let Some(db) = test_db().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };

    let (user_id, _) = create_test_user(&db).await;
    let accounts = AccountRepository::new(db.clone());
    let list = accounts.list_for_user(user_id).await.unwrap();

    assert_eq!(list.len(), 2);
    assert_eq!(list[0].name, "Cash");
    assert_eq!(list[1].name, "Card");
    for account in &list {
        assert_eq!(account.balance, Decimal::ZERO);
    }
    // stable order: UUIDv7 ids ascend with creation
    assert!(list[0].id < list[1].id);
}

#[tokio::test]
async fn test_record_and_delete_scenario() {
    let Some(db) = test_db().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };

    let (user_id, cash) = create_test_user(&db).await;
    let repo = TransactionRepository::new(db.clone());

    // income 100 -> balance 100.00
    let recorded = repo.record(income(user_id, cash, dec!(100))).await.unwrap();
    assert_eq!(recorded.new_balance, dec!(100.00));

    // expense 30 (already signed) -> balance 70.00
    let expense = repo
        .record(RecordTransactionInput {
            user_id,
            account_id: cash,
            amount: dec!(-30),
            category: "Food".to_string(),
            comment: None,
            date: Utc::now(),
        })
        .await
        .unwrap();
    assert_eq!(expense.new_balance, dec!(70.00));

    // delete the expense -> balance back to 100.00 exactly
    repo.delete(user_id, expense.transaction.id).await.unwrap();
    let accounts = AccountRepository::new(db.clone());
    let list = accounts.list_for_user(user_id).await.unwrap();
    let cash_account = list.iter().find(|a| a.id == cash).unwrap();
    assert_eq!(cash_account.balance, dec!(100.00));
}

#[tokio::test]
async fn test_balance_equals_sum_of_active_transactions() {
    let Some(db) = test_db().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };

    let (user_id, cash) = create_test_user(&db).await;
    let repo = TransactionRepository::new(db.clone());

    let amounts = [dec!(10.50), dec!(-3.25), dec!(99.99), dec!(-0.01)];
    let mut ids = Vec::new();
    for amount in amounts {
        let r = repo.record(income(user_id, cash, amount)).await.unwrap();
        ids.push(r.transaction.id);
    }
    // delete one in the middle
    repo.delete(user_id, ids[1]).await.unwrap();

    let remaining: Decimal = transactions::Entity::find()
        .filter(transactions::Column::AccountId.eq(cash))
        .all(&db)
        .await
        .unwrap()
        .iter()
        .map(|t| t.amount)
        .sum();

    let accounts = AccountRepository::new(db.clone());
    let list = accounts.list_for_user(user_id).await.unwrap();
    let cash_account = list.iter().find(|a| a.id == cash).unwrap();
    assert_eq!(cash_account.balance, remaining);
    assert_eq!(cash_account.balance, dec!(110.48));
}

#[tokio::test]
async fn test_ownership_isolation() {
    let Some(db) = test_db().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };

    let (alice, alice_cash) = create_test_user(&db).await;
    let (mallory, _) = create_test_user(&db).await;
    let repo = TransactionRepository::new(db.clone());

    let recorded = repo.record(income(alice, alice_cash, dec!(50))).await.unwrap();

    // recording into a foreign account fails and writes nothing
    let result = repo.record(income(mallory, alice_cash, dec!(1))).await;
    assert!(matches!(
        result,
        Err(TransactionError::AccountNotFoundOrForbidden(_))
    ));

    // deleting a foreign transaction reads as "not found", never "forbidden
    // but it exists"
    let result = repo.delete(mallory, recorded.transaction.id).await;
    assert!(matches!(result, Err(TransactionError::NotFound(_))));

    // history never leaks foreign rows
    let history = repo.list_recent(mallory, None).await.unwrap();
    assert!(history.is_empty());

    // and alice's balance is untouched by the attempts
    let accounts = AccountRepository::new(db.clone());
    let list = accounts.list_for_user(alice).await.unwrap();
    assert_eq!(list.iter().find(|a| a.id == alice_cash).unwrap().balance, dec!(50));
}

#[tokio::test]
async fn test_delete_is_not_idempotent_but_safe() {
    let Some(db) = test_db().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };

    let (user_id, cash) = create_test_user(&db).await;
    let repo = TransactionRepository::new(db.clone());

    let recorded = repo.record(income(user_id, cash, dec!(25))).await.unwrap();
    repo.delete(user_id, recorded.transaction.id).await.unwrap();

    // second delete: NotFound, balance unaffected
    let result = repo.delete(user_id, recorded.transaction.id).await;
    assert!(matches!(result, Err(TransactionError::NotFound(_))));

    let accounts = AccountRepository::new(db.clone());
    let list = accounts.list_for_user(user_id).await.unwrap();
    assert_eq!(list.iter().find(|a| a.id == cash).unwrap().balance, Decimal::ZERO);
}

#[tokio::test]
async fn test_failed_insert_rolls_back_balance_adjustment() {
    let Some(db) = test_db().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };

    let (user_id, cash) = create_test_user(&db).await;
    let repo = TransactionRepository::new(db.clone());

    // The category column is VARCHAR(64); an oversized label makes the
    // insert fail AFTER the balance UPDATE has already run inside the
    // transaction, forcing a rollback of both.
    let result = repo
        .record(RecordTransactionInput {
            user_id,
            account_id: cash,
            amount: dec!(10),
            category: "x".repeat(65),
            comment: None,
            date: Utc::now(),
        })
        .await;
    assert!(matches!(result, Err(TransactionError::Database(_))));

    // no orphan row, no balance drift
    let rows = transactions::Entity::find()
        .filter(transactions::Column::AccountId.eq(cash))
        .all(&db)
        .await
        .unwrap();
    assert!(rows.is_empty());

    let accounts = AccountRepository::new(db.clone());
    let list = accounts.list_for_user(user_id).await.unwrap();
    assert_eq!(list.iter().find(|a| a.id == cash).unwrap().balance, Decimal::ZERO);
}

#[tokio::test]
async fn test_list_recent_orders_and_annotates() {
    let Some(db) = test_db().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };

    let (user_id, cash) = create_test_user(&db).await;
    let repo = TransactionRepository::new(db.clone());

    for amount in [dec!(1), dec!(2), dec!(3)] {
        repo.record(income(user_id, cash, amount)).await.unwrap();
    }

    let capped = repo.list_recent(user_id, Some(2)).await.unwrap();
    assert_eq!(capped.len(), 2);
    // newest first; same date, so UUIDv7 id breaks the tie
    assert_eq!(capped[0].transaction.amount, dec!(3));
    assert_eq!(capped[1].transaction.amount, dec!(2));
    assert_eq!(capped[0].account_name, "Cash");

    let full = repo.list_recent(user_id, None).await.unwrap();
    assert_eq!(full.len(), 3);
}

#[tokio::test]
async fn test_user_delete_cascades() {
    let Some(db) = test_db().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };

    let (user_id, cash) = create_test_user(&db).await;
    let repo = TransactionRepository::new(db.clone());
    repo.record(income(user_id, cash, dec!(5))).await.unwrap();

    let users = UserRepository::new(db.clone());
    users.delete(user_id).await.unwrap();

    let accounts = AccountRepository::new(db.clone());
    assert!(accounts.list_for_user(user_id).await.unwrap().is_empty());
    let rows = transactions::Entity::find()
        .filter(transactions::Column::AccountId.eq(cash))
        .all(&db)
        .await
        .unwrap();
    assert!(rows.is_empty());
}
