//! Spend authorization - redeeming points for mall items.
//!
//! A redemption is one transaction: decrement stock, debit the balance, create the
//! order, append the debit entry. Both decrements carry their precondition in the
//! `WHERE` clause (`stock > 0`, `balance >= price`), so two redemptions racing for the
//! last unit cannot both succeed even if both passed the earlier reads.

use crate::{
    core::{
        account, item,
        ledger::{self, Reference},
    },
    entities::{
        RedeemableItem, RedemptionOrder, account::Model as AccountModel,
        ledger_entry::Direction, redeemable_item,
        redemption_order::{self, OrderStatus},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};

/// Redeems one unit of `item_id` for `account_id`.
///
/// Checks, in order: the item exists and is active (`ItemNotFound`), it has stock
/// (`OutOfStock`), the balance covers the price (`InsufficientBalance`). Any failure
/// leaves balance, stock, orders and ledger unchanged.
pub async fn authorize_spend(
    db: &DatabaseConnection,
    account_id: i64,
    item_id: i64,
    now: DateTime<Utc>,
) -> Result<redemption_order::Model> {
    let txn = db.begin().await?;

    let item = item::get_item_by_id(&txn, item_id)
        .await?
        .filter(|i| i.is_active)
        .ok_or(Error::ItemNotFound { item_id })?;

    if item.stock <= 0 {
        return Err(Error::OutOfStock { item_id });
    }

    let acc = account::require_account(&txn, account_id).await?;
    if acc.balance < item.price {
        return Err(Error::InsufficientBalance {
            current: acc.balance,
            required: item.price,
        });
    }

    let taken = RedeemableItem::update_many()
        .col_expr(
            redeemable_item::Column::Stock,
            Expr::col(redeemable_item::Column::Stock).sub(1),
        )
        .filter(redeemable_item::Column::Id.eq(item_id))
        .filter(redeemable_item::Column::IsActive.eq(true))
        .filter(redeemable_item::Column::Stock.gt(0))
        .exec(&txn)
        .await?;
    if taken.rows_affected == 0 {
        return Err(Error::OutOfStock { item_id });
    }

    let new_balance = ledger::debit_balance(&txn, account_id, item.price).await?;

    let order = redemption_order::ActiveModel {
        account_id: Set(account_id),
        item_id: Set(item_id),
        points_spent: Set(item.price),
        status: Set(OrderStatus::Confirmed),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    ledger::append_entry(
        &txn,
        account_id,
        Direction::Debit,
        item.price,
        format!("Redeemed {}", item.name),
        Some(Reference::new("order", order.id)),
        now,
    )
    .await?;

    txn.commit().await?;

    tracing::info!(
        account_id,
        item_id,
        order_id = order.id,
        price = item.price,
        new_balance,
        "Redemption confirmed"
    );

    Ok(order)
}

/// An account's orders, newest first.
pub async fn get_orders_for_account(
    db: &DatabaseConnection,
    account_id: i64,
) -> Result<Vec<redemption_order::Model>> {
    RedemptionOrder::find()
        .filter(redemption_order::Column::AccountId.eq(account_id))
        .order_by_desc(redemption_order::Column::CreatedAt)
        .order_by_desc(redemption_order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Moves an order along the fulfilment workflow. Admin only.
///
/// Cancelling a confirmed order refunds the points with a credit entry and returns the
/// unit to stock, in the same transaction as the status change.
pub async fn advance_order_status(
    db: &DatabaseConnection,
    actor: &AccountModel,
    order_id: i64,
    next: OrderStatus,
    now: DateTime<Utc>,
) -> Result<redemption_order::Model> {
    if !actor.role.is_admin() {
        return Err(Error::PermissionDenied {
            action: "updating orders".to_string(),
        });
    }

    let txn = db.begin().await?;

    let order = RedemptionOrder::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or(Error::OrderNotFound { order_id })?;

    if !order.status.can_advance_to(next) {
        return Err(Error::InvalidStatusChange {
            order_id,
            from: format!("{:?}", order.status),
            to: format!("{next:?}"),
        });
    }

    // Only the first of two concurrent transitions sees the old status
    let moved = RedemptionOrder::update_many()
        .col_expr(redemption_order::Column::Status, Expr::value(next))
        .col_expr(redemption_order::Column::UpdatedAt, Expr::value(now))
        .filter(redemption_order::Column::Id.eq(order_id))
        .filter(redemption_order::Column::Status.eq(order.status))
        .exec(&txn)
        .await?;
    if moved.rows_affected == 0 {
        return Err(Error::InvalidStatusChange {
            order_id,
            from: format!("{:?}", order.status),
            to: format!("{next:?}"),
        });
    }

    if next == OrderStatus::Cancelled {
        ledger::append_entry(
            &txn,
            order.account_id,
            Direction::Credit,
            order.points_spent,
            format!("Refund for order {order_id}"),
            Some(Reference::new("order", order_id)),
            now,
        )
        .await?;
        ledger::adjust_balance(&txn, order.account_id, order.points_spent).await?;

        RedeemableItem::update_many()
            .col_expr(
                redeemable_item::Column::Stock,
                Expr::col(redeemable_item::Column::Stock).add(1),
            )
            .filter(redeemable_item::Column::Id.eq(order.item_id))
            .exec(&txn)
            .await?;
    }

    let updated = RedemptionOrder::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or(Error::OrderNotFound { order_id })?;

    txn.commit().await?;

    tracing::info!(order_id, status = ?next, "Order status changed");
    Ok(updated)
}
