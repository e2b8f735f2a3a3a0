//! Daily task entity - Catalog of repeatable rewarded actions.
//!
//! Rewards live here rather than in code so an administrator can change them
//! without a deploy.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What the user has to do to complete a task
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum TaskKind {
    /// Daily check-in
    #[sea_orm(string_value = "checkin")]
    Checkin,
    /// Read an article
    #[sea_orm(string_value = "read")]
    Read,
    /// Download a document
    #[sea_orm(string_value = "download")]
    Download,
    /// Complete a lesson
    #[sea_orm(string_value = "learn")]
    Learn,
}

/// Daily task database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_tasks")]
pub struct Model {
    /// Unique identifier for the task
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Title shown to users (e.g. "Read an article")
    #[sea_orm(unique)]
    pub title: String,
    /// Task kind tag
    pub kind: TaskKind,
    /// Points granted on completion
    pub reward: i64,
    /// Inactive tasks cannot be completed
    pub is_active: bool,
    /// When the task was created
    pub created_at: DateTime,
    /// When the task was last modified
    pub updated_at: DateTime,
}

/// `DailyTask` has no navigable relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
