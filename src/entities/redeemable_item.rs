//! Redeemable item entity - Mall catalog entry with a point price and finite stock.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Redeemable item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "redeemable_items")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Item name (e.g. "Coffee voucher")
    #[sea_orm(unique)]
    pub name: String,
    /// Price in points
    pub price: i64,
    /// Remaining stock, never negative
    pub stock: i64,
    /// Inactive items are hidden and cannot be redeemed
    pub is_active: bool,
    /// When the item was created
    pub created_at: DateTime,
    /// When the item was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between `RedeemableItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One item has many orders
    #[sea_orm(has_many = "super::redemption_order::Entity")]
    Orders,
}

impl Related<super::redemption_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
