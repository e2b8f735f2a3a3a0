//! Task completion entity - Proof that an account claimed a window-scoped reward.
//!
//! One row per (account, action, day). The unique index on those three columns is
//! what makes daily rewards idempotent; see `config::database::create_tables`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Task completion database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "task_completions")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Account that claimed the reward
    pub account_id: i64,
    /// Action key (`checkin`, `task:<id>`, `first-comment-of-day`)
    pub action: String,
    /// Daily task id when the action is a catalog task
    pub task_id: Option<i64>,
    /// Calendar day of the claim in the configured time zone
    pub completed_on: Date,
    /// Exact claim time
    pub created_at: DateTimeUtc,
}

/// `TaskCompletion` has no navigable relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
