//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`;
//! the composite unique indexes that back reward idempotence are created explicitly because
//! entity attributes can only express single-column uniqueness.

use crate::entities::{
    Account, Article, Comment, Course, CourseProgress, DailyTask, LedgerEntry, Notification,
    RedeemableItem, RedemptionOrder, TaskCompletion, course_progress, ledger_entry,
    task_completion,
};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/engagement_points.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable or the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    tracing::debug!("Connecting to {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables and indexes. Safe to run against an existing database.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, Account).await?;
    create_table(db, &schema, LedgerEntry).await?;
    create_table(db, &schema, DailyTask).await?;
    create_table(db, &schema, TaskCompletion).await?;
    create_table(db, &schema, RedeemableItem).await?;
    create_table(db, &schema, RedemptionOrder).await?;
    create_table(db, &schema, Article).await?;
    create_table(db, &schema, Comment).await?;
    create_table(db, &schema, Course).await?;
    create_table(db, &schema, CourseProgress).await?;
    create_table(db, &schema, Notification).await?;

    // One claim per account, action and day
    let claim_index = Index::create()
        .if_not_exists()
        .name("idx_task_completions_claim")
        .table(TaskCompletion)
        .col(task_completion::Column::AccountId)
        .col(task_completion::Column::Action)
        .col(task_completion::Column::CompletedOn)
        .unique()
        .to_owned();
    db.execute(builder.build(&claim_index)).await?;

    let progress_index = Index::create()
        .if_not_exists()
        .name("idx_course_progress_learner")
        .table(CourseProgress)
        .col(course_progress::Column::AccountId)
        .col(course_progress::Column::CourseId)
        .unique()
        .to_owned();
    db.execute(builder.build(&progress_index)).await?;

    let ledger_index = Index::create()
        .if_not_exists()
        .name("idx_ledger_entries_account")
        .table(LedgerEntry)
        .col(ledger_entry::Column::AccountId)
        .col(ledger_entry::Column::CreatedAt)
        .to_owned();
    db.execute(builder.build(&ledger_index)).await?;

    tracing::info!("Database schema initialized");
    Ok(())
}
