//! Account entity - A platform user holding a point balance.
//!
//! The balance is a cached aggregate of the account's ledger entries and is only
//! changed through relative updates made in the same transaction as a ledger insert.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Platform role of an account
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Role {
    /// Regular employee
    #[sea_orm(string_value = "ordinary")]
    Ordinary,
    /// Content and catalog administrator
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Administrator who can also manage other administrators
    #[sea_orm(string_value = "super-admin")]
    SuperAdmin,
}

impl Role {
    /// Whether this role may run catalog management operations.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

/// Account database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Unique identifier for the account
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identity supplied by the session collaborator (Discord user id for the bot)
    #[sea_orm(unique)]
    pub external_id: String,
    /// Name shown on the leaderboard
    pub display_name: String,
    /// Current point balance, never negative
    pub balance: i64,
    /// Platform role
    pub role: Role,
    /// Registration time, used as the leaderboard tie-break
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Account and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One account has many ledger entries
    #[sea_orm(has_many = "super::ledger_entry::Entity")]
    LedgerEntries,
    /// One account has many redemption orders
    #[sea_orm(has_many = "super::redemption_order::Entity")]
    RedemptionOrders,
}

impl Related<super::ledger_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl Related<super::redemption_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RedemptionOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
