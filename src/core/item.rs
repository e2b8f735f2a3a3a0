//! Mall catalog business logic.
//!
//! Provides functions for creating, retrieving, updating and restocking redeemable
//! items. Stock is only ever decremented by [`crate::core::spend`]; restocking here is a
//! relative increment so it cannot overwrite a concurrent redemption.

use crate::{
    config::rewards::ItemConfig,
    entities::{RedeemableItem, redeemable_item},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};

fn validate_item(name: &str, price: i64, stock: i64) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Item name cannot be empty".to_string(),
        });
    }
    if price <= 0 {
        return Err(Error::InvalidAmount { amount: price });
    }
    if stock < 0 {
        return Err(Error::InvalidAmount { amount: stock });
    }
    Ok(())
}

/// Retrieves all active items, ordered alphabetically by name.
pub async fn get_active_items(db: &DatabaseConnection) -> Result<Vec<redeemable_item::Model>> {
    RedeemableItem::find()
        .filter(redeemable_item::Column::IsActive.eq(true))
        .order_by_asc(redeemable_item::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an active item by its exact name.
pub async fn get_item_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<redeemable_item::Model>> {
    RedeemableItem::find()
        .filter(redeemable_item::Column::Name.eq(name))
        .filter(redeemable_item::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an item by id, active or not.
pub async fn get_item_by_id<C>(db: &C, item_id: i64) -> Result<Option<redeemable_item::Model>>
where
    C: ConnectionTrait,
{
    RedeemableItem::find_by_id(item_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates an active item.
///
/// # Errors
/// Returns an error if:
/// - The name is empty or whitespace-only
/// - The price is not positive or the stock is negative
/// - The database insert fails (including a duplicate name)
pub async fn create_item(
    db: &DatabaseConnection,
    name: String,
    price: i64,
    stock: i64,
) -> Result<redeemable_item::Model> {
    validate_item(&name, price, stock)?;

    let now = chrono::Utc::now().naive_utc();
    let item = redeemable_item::ActiveModel {
        name: Set(name.trim().to_string()),
        price: Set(price),
        stock: Set(stock),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    item.insert(db).await.map_err(Into::into)
}

/// Renames and/or re-prices an item. Past orders keep the price they were charged.
pub async fn update_item(
    db: &DatabaseConnection,
    item_id: i64,
    new_name: String,
    new_price: i64,
) -> Result<redeemable_item::Model> {
    validate_item(&new_name, new_price, 0)?;

    let mut item: redeemable_item::ActiveModel = get_item_by_id(db, item_id)
        .await?
        .ok_or(Error::ItemNotFound { item_id })?
        .into();

    item.name = Set(new_name.trim().to_string());
    item.price = Set(new_price);
    item.updated_at = Set(chrono::Utc::now().naive_utc());
    item.update(db).await.map_err(Into::into)
}

/// Adds `quantity` units of stock.
pub async fn restock_item(
    db: &DatabaseConnection,
    item_id: i64,
    quantity: i64,
) -> Result<redeemable_item::Model> {
    if quantity <= 0 {
        return Err(Error::InvalidAmount { amount: quantity });
    }

    let result = RedeemableItem::update_many()
        .col_expr(
            redeemable_item::Column::Stock,
            Expr::col(redeemable_item::Column::Stock).add(quantity),
        )
        .col_expr(
            redeemable_item::Column::UpdatedAt,
            Expr::value(chrono::Utc::now().naive_utc()),
        )
        .filter(redeemable_item::Column::Id.eq(item_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::ItemNotFound { item_id });
    }

    get_item_by_id(db, item_id)
        .await?
        .ok_or(Error::ItemNotFound { item_id })
}

/// Shows or hides an item in the mall.
pub async fn set_item_active(
    db: &DatabaseConnection,
    item_id: i64,
    active: bool,
) -> Result<redeemable_item::Model> {
    let mut item: redeemable_item::ActiveModel = get_item_by_id(db, item_id)
        .await?
        .ok_or(Error::ItemNotFound { item_id })?
        .into();

    item.is_active = Set(active);
    item.updated_at = Set(chrono::Utc::now().naive_utc());
    item.update(db).await.map_err(Into::into)
}

/// Inserts configured items whose names are not in the catalog yet.
pub async fn seed_items(db: &DatabaseConnection, seeds: &[ItemConfig]) -> Result<usize> {
    let mut inserted = 0;
    for seed in seeds {
        let exists = RedeemableItem::find()
            .filter(redeemable_item::Column::Name.eq(seed.name.trim()))
            .one(db)
            .await?
            .is_some();
        if !exists {
            create_item(db, seed.name.clone(), seed.price, seed.stock).await?;
            inserted += 1;
        }
    }
    if inserted > 0 {
        tracing::info!("Seeded {inserted} mall items");
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_item_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_item(&db, String::new(), 10, 1).await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        let result = create_item(&db, "Mug".to_string(), 0, 1).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: 0 }
        ));

        let result = create_item(&db, "Mug".to_string(), 10, -1).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: -1 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_list_items() -> Result<()> {
        let db = setup_test_db().await?;
        create_item(&db, " Mug ".to_string(), 80, 3).await?;
        let voucher = create_item(&db, "Coffee voucher".to_string(), 30, 5).await?;

        let items = get_active_items(&db).await?;
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Coffee voucher", "Mug"]);

        set_item_active(&db, voucher.id, false).await?;
        assert_eq!(get_active_items(&db).await?.len(), 1);
        assert!(get_item_by_name(&db, "Coffee voucher").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_restock_is_relative() -> Result<()> {
        let db = setup_test_db().await?;
        let mug = create_item(&db, "Mug".to_string(), 80, 3).await?;

        let restocked = restock_item(&db, mug.id, 2).await?;
        assert_eq!(restocked.stock, 5);

        let result = restock_item(&db, mug.id, 0).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        let missing = restock_item(&db, 999, 1).await;
        assert!(matches!(
            missing.unwrap_err(),
            Error::ItemNotFound { item_id: 999 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_item_price() -> Result<()> {
        let db = setup_test_db().await?;
        let mug = create_item(&db, "Mug".to_string(), 80, 3).await?;

        let updated = update_item(&db, mug.id, "Big mug".to_string(), 95).await?;
        assert_eq!(updated.name, "Big mug");
        assert_eq!(updated.price, 95);
        assert_eq!(updated.stock, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_items() -> Result<()> {
        let db = setup_test_db().await?;
        let seeds = vec![ItemConfig {
            name: "Mug".to_string(),
            price: 80,
            stock: 3,
        }];

        assert_eq!(seed_items(&db, &seeds).await?, 1);
        assert_eq!(seed_items(&db, &seeds).await?, 0);

        Ok(())
    }
}
