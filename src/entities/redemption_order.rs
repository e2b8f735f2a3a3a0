//! Redemption order entity - One successful spend of points on a mall item.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fulfilment status of an order
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum OrderStatus {
    /// Points debited, awaiting fulfilment
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    /// Handed to delivery
    #[sea_orm(string_value = "shipped")]
    Shipped,
    /// Received by the employee
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Cancelled by an administrator
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    /// Whether an order may move from `self` to `next`.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Confirmed, Self::Shipped | Self::Cancelled) | (Self::Shipped, Self::Completed)
        )
    }
}

/// Redemption order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "redemption_orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Account that redeemed
    pub account_id: i64,
    /// Item redeemed
    pub item_id: i64,
    /// Item price at redemption time
    pub points_spent: i64,
    /// Fulfilment status
    pub status: OrderStatus,
    /// When the order was created
    pub created_at: DateTimeUtc,
    /// When the status last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `RedemptionOrder` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id"
    )]
    Account,
    /// Each order is for one item
    #[sea_orm(
        belongs_to = "super::redeemable_item::Entity",
        from = "Column::ItemId",
        to = "super::redeemable_item::Column::Id"
    )]
    Item,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::redeemable_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
