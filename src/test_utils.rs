//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating accounts, tasks, items and courses with sensible defaults.

use crate::{
    config::rewards::Policy,
    core::{
        account, course, item,
        ledger::{self, Reference},
        task,
    },
    entities::{self, account::Role, daily_task::TaskKind, ledger_entry::Direction},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{ConnectOptions, DatabaseConnection};
use tempfile::TempDir;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a file-backed `SQLite` database with a multi-connection pool.
///
/// The in-memory database is a single connection, so transactions there never overlap.
/// Race tests use this instead. Keep the returned directory alive for the test's
/// duration; dropping it deletes the file.
pub async fn setup_file_db() -> Result<(TempDir, DatabaseConnection)> {
    let dir = tempfile::tempdir().map_err(|e| Error::Config {
        message: format!("Failed to create temp dir: {e}"),
    })?;
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("points.db").display());
    let mut options = ConnectOptions::new(url);
    options.max_connections(4).sqlx_logging(false);

    let db = sea_orm::Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok((dir, db))
}

/// Default reward amounts, UTC calendar.
#[must_use]
pub fn test_policy() -> Policy {
    Policy::default()
}

/// Creates an ordinary account whose external id is derived from `name`.
pub async fn create_test_account(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::account::Model> {
    let external_id = format!("test-{}", name.to_lowercase().replace(' ', "-"));
    create_custom_account(db, &external_id, name, Role::Ordinary).await
}

/// Creates an account with a specific external id and role.
pub async fn create_custom_account(
    db: &DatabaseConnection,
    external_id: &str,
    name: &str,
    role: Role,
) -> Result<entities::account::Model> {
    account::register_account(db, external_id, name, role, Utc::now()).await
}

/// Creates an account and credits it with `balance` points through the ledger, so the
/// balance matches the ledger sum.
pub async fn create_funded_account(
    db: &DatabaseConnection,
    name: &str,
    balance: i64,
) -> Result<entities::account::Model> {
    let acc = create_test_account(db, name).await?;
    if balance > 0 {
        ledger::append_entry(
            db,
            acc.id,
            Direction::Credit,
            balance,
            "Test funding".to_string(),
            Some(Reference::tag("test")),
            Utc::now(),
        )
        .await?;
        ledger::adjust_balance(db, acc.id, balance).await?;
    }
    account::require_account(db, acc.id).await
}

/// Test database plus one ordinary account with a zero balance.
pub async fn setup_with_account() -> Result<(DatabaseConnection, entities::account::Model)> {
    let db = setup_test_db().await?;
    let acc = create_test_account(&db, "Test User").await?;
    Ok((db, acc))
}

/// Test database plus one account holding `balance` points.
pub async fn setup_with_balance(
    balance: i64,
) -> Result<(DatabaseConnection, entities::account::Model)> {
    let db = setup_test_db().await?;
    let acc = create_funded_account(&db, "Test User", balance).await?;
    Ok((db, acc))
}

/// Creates a `read` task.
pub async fn create_test_task(
    db: &DatabaseConnection,
    title: &str,
    reward: i64,
) -> Result<entities::daily_task::Model> {
    create_custom_task(db, title, TaskKind::Read, reward).await
}

pub async fn create_custom_task(
    db: &DatabaseConnection,
    title: &str,
    kind: TaskKind,
    reward: i64,
) -> Result<entities::daily_task::Model> {
    task::create_task(db, title.to_string(), kind, reward).await
}

pub async fn create_test_item(
    db: &DatabaseConnection,
    name: &str,
    price: i64,
    stock: i64,
) -> Result<entities::redeemable_item::Model> {
    item::create_item(db, name.to_string(), price, stock).await
}

pub async fn create_test_course(
    db: &DatabaseConnection,
    title: &str,
) -> Result<entities::course::Model> {
    course::create_course(db, title.to_string(), Utc::now()).await
}
