//! Ledger entry entity - One signed point movement.
//!
//! Entries are append-only. `amount` is always positive; `direction` carries the sign.
//! `ref_type`/`ref_id` point at whatever caused the movement (`"task"`, `"course"`,
//! `"order"`, `"checkin"`, `"article"`, `"comment"`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sign of a ledger movement
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Direction {
    /// Points added to the balance
    #[sea_orm(string_value = "credit")]
    Credit,
    /// Points removed from the balance
    #[sea_orm(string_value = "debit")]
    Debit,
}

impl Direction {
    /// Applies the direction's sign to a positive magnitude.
    #[must_use]
    pub const fn signed(self, amount: i64) -> i64 {
        match self {
            Self::Credit => amount,
            Self::Debit => -amount,
        }
    }
}

/// Ledger entry database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Account the movement belongs to
    pub account_id: i64,
    /// Credit or debit
    pub direction: Direction,
    /// Magnitude in points, always > 0
    pub amount: i64,
    /// Human-readable reason (e.g. "Daily check-in")
    pub reason: String,
    /// Kind of entity that caused the movement
    pub ref_type: Option<String>,
    /// Id of the entity that caused the movement
    pub ref_id: Option<i64>,
    /// When the movement was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `LedgerEntry` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id"
    )]
    Account,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
