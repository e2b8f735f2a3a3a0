//! Account business logic - registration, lookup and the points leaderboard.
//!
//! Accounts are created with a zero balance and are never deleted. The balance itself is
//! only changed by the ledger functions, inside reward and spend transactions.

use crate::{
    config::users,
    entities::{
        Account,
        account::{self, Role},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, SqlErr, prelude::*};

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// Account id
    pub account_id: i64,
    /// Display name
    pub display_name: String,
    /// Current balance
    pub balance: i64,
    /// 1-based position in the returned list
    pub rank: u64,
}

/// Registers an account, or returns the existing one for `external_id`.
///
/// # Errors
/// Returns an error if:
/// - `external_id` or `display_name` is empty or whitespace-only
/// - The database insert fails for a reason other than a concurrent registration
pub async fn register_account(
    db: &DatabaseConnection,
    external_id: &str,
    display_name: &str,
    role: Role,
    now: DateTime<Utc>,
) -> Result<account::Model> {
    let external_id = external_id.trim();
    let display_name = display_name.trim();

    if external_id.is_empty() {
        return Err(Error::Config {
            message: "Account external id cannot be empty".to_string(),
        });
    }
    if display_name.is_empty() {
        return Err(Error::Config {
            message: "Account display name cannot be empty".to_string(),
        });
    }

    if let Some(existing) = get_account_by_external_id(db, external_id).await? {
        return Ok(existing);
    }

    let new_account = account::ActiveModel {
        external_id: Set(external_id.to_string()),
        display_name: Set(display_name.to_string()),
        balance: Set(0),
        role: Set(role),
        created_at: Set(now),
        ..Default::default()
    };

    match new_account.insert(db).await {
        Ok(created) => {
            tracing::info!(account_id = created.id, external_id, "Registered account");
            Ok(created)
        }
        // Lost a registration race: the other request's row is the account
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            get_account_by_external_id(db, external_id)
                .await?
                .ok_or(Error::Database(e))
        }
        Err(e) => Err(e.into()),
    }
}

/// Looks up the caller's account, registering it on first contact with the role
/// configured in the environment.
pub async fn get_or_register(
    db: &DatabaseConnection,
    external_id: &str,
    display_name: &str,
    now: DateTime<Utc>,
) -> Result<account::Model> {
    if let Some(existing) = get_account_by_external_id(db, external_id).await? {
        return Ok(existing);
    }
    register_account(db, external_id, display_name, users::role_for(external_id), now).await
}

/// Finds an account by its id.
pub async fn get_account_by_id<C>(db: &C, account_id: i64) -> Result<Option<account::Model>>
where
    C: ConnectionTrait,
{
    Account::find_by_id(account_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an account by id, failing with `AccountNotFound` when absent.
pub async fn require_account<C>(db: &C, account_id: i64) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    get_account_by_id(db, account_id)
        .await?
        .ok_or(Error::AccountNotFound { account_id })
}

/// Finds an account by the identity collaborator's id.
pub async fn get_account_by_external_id(
    db: &DatabaseConnection,
    external_id: &str,
) -> Result<Option<account::Model>> {
    Account::find()
        .filter(account::Column::ExternalId.eq(external_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Changes another account's role. Only a super-admin may do this.
pub async fn set_role(
    db: &DatabaseConnection,
    actor: &account::Model,
    target_id: i64,
    role: Role,
) -> Result<account::Model> {
    if actor.role != Role::SuperAdmin {
        return Err(Error::PermissionDenied {
            action: "changing roles".to_string(),
        });
    }

    let mut target: account::ActiveModel = require_account(db, target_id).await?.into();
    target.role = Set(role);
    target.update(db).await.map_err(Into::into)
}

/// Returns the top `limit` accounts by balance.
///
/// Ties are broken by registration time (earlier first), then by id, so the order is
/// deterministic regardless of storage iteration order.
pub async fn get_leaderboard(
    db: &DatabaseConnection,
    limit: u64,
) -> Result<Vec<LeaderboardEntry>> {
    let accounts = Account::find()
        .order_by_desc(account::Column::Balance)
        .order_by_asc(account::Column::CreatedAt)
        .order_by_asc(account::Column::Id)
        .limit(limit)
        .all(db)
        .await?;

    Ok(accounts
        .into_iter()
        .zip(1..)
        .map(|(acc, rank)| LeaderboardEntry {
            account_id: acc.id,
            display_name: acc.display_name,
            balance: acc.balance,
            rank,
        })
        .collect())
}

/// Presentation tier for a balance: `balance / step + 1`.
#[must_use]
pub const fn level_for_balance(balance: i64, step: i64) -> i64 {
    if step <= 0 || balance < 0 {
        return 1;
    }
    balance / step + 1
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::ledger;
    use crate::test_utils::*;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_register_account_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = register_account(&db, "  ", "Ann", Role::Ordinary, Utc::now()).await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        let result = register_account(&db, "42", "", Role::Ordinary, Utc::now()).await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_register_account_starts_at_zero() -> Result<()> {
        let db = setup_test_db().await?;

        let acc = register_account(&db, "u-1", " Ann ", Role::Ordinary, Utc::now()).await?;
        assert_eq!(acc.balance, 0);
        assert_eq!(acc.display_name, "Ann");
        assert_eq!(acc.role, Role::Ordinary);

        Ok(())
    }

    #[tokio::test]
    async fn test_register_account_is_idempotent_on_external_id() -> Result<()> {
        let db = setup_test_db().await?;

        let first = register_account(&db, "u-1", "Ann", Role::Ordinary, Utc::now()).await?;
        let second = register_account(&db, "u-1", "Other", Role::Admin, Utc::now()).await?;
        assert_eq!(first, second);

        Ok(())
    }

    #[tokio::test]
    async fn test_require_account_not_found() -> Result<()> {
        let db = setup_test_db().await?;

        let result = require_account(&db, 999).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::AccountNotFound { account_id: 999 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_role_requires_super_admin() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_custom_account(&db, "a", "Admin", Role::Admin).await?;
        let boss = create_custom_account(&db, "b", "Boss", Role::SuperAdmin).await?;
        let target = create_test_account(&db, "Target").await?;

        let denied = set_role(&db, &admin, target.id, Role::Admin).await;
        assert!(matches!(denied.unwrap_err(), Error::PermissionDenied { .. }));

        let promoted = set_role(&db, &boss, target.id, Role::Admin).await?;
        assert_eq!(promoted.role, Role::Admin);

        Ok(())
    }

    #[tokio::test]
    async fn test_leaderboard_orders_by_balance_then_registration() -> Result<()> {
        let db = setup_test_db().await?;
        let start = Utc::now();

        let mut ids = Vec::new();
        for (i, balance) in [50_i64, 10, 90, 10].into_iter().enumerate() {
            let created_at = start + Duration::seconds(i64::try_from(i)?);
            let acc = register_account(
                &db,
                &format!("u-{i}"),
                &format!("User {i}"),
                Role::Ordinary,
                created_at,
            )
            .await?;
            ledger::adjust_balance(&db, acc.id, balance).await?;
            ids.push(acc.id);
        }

        let board = get_leaderboard(&db, 10).await?;
        let balances: Vec<i64> = board.iter().map(|e| e.balance).collect();
        let ranks: Vec<u64> = board.iter().map(|e| e.rank).collect();
        assert_eq!(balances, vec![90, 50, 10, 10]);
        assert_eq!(ranks, vec![1, 2, 3, 4]);

        // Equal balances: the earlier registration ranks first
        assert_eq!(board[2].account_id, ids[1]);
        assert_eq!(board[3].account_id, ids[3]);

        let top_two = get_leaderboard(&db, 2).await?;
        assert_eq!(top_two.len(), 2);
        assert_eq!(top_two[0].account_id, ids[2]);

        Ok(())
    }

    #[test]
    fn test_level_for_balance() {
        assert_eq!(level_for_balance(0, 500), 1);
        assert_eq!(level_for_balance(499, 500), 1);
        assert_eq!(level_for_balance(500, 500), 2);
        assert_eq!(level_for_balance(1250, 500), 3);
        assert_eq!(level_for_balance(100, 0), 1);
    }
}
