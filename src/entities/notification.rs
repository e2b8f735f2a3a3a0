//! Notification entity - In-app message shown in an account's notification list.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Recipient
    pub account_id: i64,
    /// Short headline
    pub title: String,
    /// Message body
    pub body: String,
    /// Whether the recipient has seen it
    pub is_read: bool,
    /// When it was created
    pub created_at: DateTimeUtc,
}

/// `Notification` has no navigable relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
