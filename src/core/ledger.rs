//! Balance store and ledger data access.
//!
//! No business rules live here. Entries are appended, never updated or deleted, and
//! balances move only through relative SQL updates:
//! `UPDATE accounts SET balance = balance + ? WHERE id = ?`.
//! Callers are expected to run an append and its matching balance change inside the
//! same transaction, which is why the write functions accept any `ConnectionTrait`.

use crate::{
    entities::{
        Account, LedgerEntry, account,
        ledger_entry::{self, Direction},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};

/// Upper bound for a ledger page.
pub const MAX_PAGE_SIZE: u64 = 100;

/// What caused a ledger movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Entity kind tag, e.g. `"task"` or `"order"`
    pub kind: String,
    /// Entity id, when the cause has one
    pub id: Option<i64>,
}

impl Reference {
    /// Reference to a specific entity.
    #[must_use]
    pub fn new(kind: &str, id: i64) -> Self {
        Self {
            kind: kind.to_string(),
            id: Some(id),
        }
    }

    /// Reference carrying only a kind tag.
    #[must_use]
    pub fn tag(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            id: None,
        }
    }
}

/// One page of an account's ledger, newest first.
#[derive(Debug, Clone)]
pub struct LedgerPage {
    /// Entries on this page
    pub entries: Vec<ledger_entry::Model>,
    /// Total entries for the account across all pages
    pub total_count: u64,
    /// 1-based page number actually served
    pub page: u64,
    /// Page size actually used
    pub page_size: u64,
}

/// Appends one entry. `amount` must be positive; `direction` carries the sign.
pub async fn append_entry<C>(
    db: &C,
    account_id: i64,
    direction: Direction,
    amount: i64,
    reason: String,
    reference: Option<Reference>,
    now: DateTime<Utc>,
) -> Result<ledger_entry::Model>
where
    C: ConnectionTrait,
{
    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }

    let (ref_type, ref_id) = reference.map_or((None, None), |r| (Some(r.kind), r.id));

    let entry = ledger_entry::ActiveModel {
        account_id: Set(account_id),
        direction: Set(direction),
        amount: Set(amount),
        reason: Set(reason),
        ref_type: Set(ref_type),
        ref_id: Set(ref_id),
        created_at: Set(now),
        ..Default::default()
    };

    entry.insert(db).await.map_err(Into::into)
}

/// Adds `delta` to the balance with a single relative update and returns the new balance.
pub async fn adjust_balance<C>(db: &C, account_id: i64, delta: i64) -> Result<i64>
where
    C: ConnectionTrait,
{
    let result = Account::update_many()
        .col_expr(
            account::Column::Balance,
            Expr::col(account::Column::Balance).add(delta),
        )
        .filter(account::Column::Id.eq(account_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::AccountNotFound { account_id });
    }

    get_balance(db, account_id).await
}

/// Subtracts `amount` only if the balance covers it, and returns the new balance.
///
/// The sufficiency check is part of the `UPDATE`'s `WHERE` clause, so it is evaluated
/// against the row as it is at write time, not against an earlier read.
pub async fn debit_balance<C>(db: &C, account_id: i64, amount: i64) -> Result<i64>
where
    C: ConnectionTrait,
{
    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }

    let result = Account::update_many()
        .col_expr(
            account::Column::Balance,
            Expr::col(account::Column::Balance).sub(amount),
        )
        .filter(account::Column::Id.eq(account_id))
        .filter(account::Column::Balance.gte(amount))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        let current = get_balance(db, account_id).await?;
        return Err(Error::InsufficientBalance {
            current,
            required: amount,
        });
    }

    get_balance(db, account_id).await
}

/// Reads the current balance.
pub async fn get_balance<C>(db: &C, account_id: i64) -> Result<i64>
where
    C: ConnectionTrait,
{
    Account::find_by_id(account_id)
        .one(db)
        .await?
        .map(|acc| acc.balance)
        .ok_or(Error::AccountNotFound { account_id })
}

/// Returns one page of an account's ledger, newest first.
///
/// `page` is 1-based; 0 is treated as 1. `page_size` is clamped to `1..=MAX_PAGE_SIZE`.
pub async fn get_ledger(
    db: &DatabaseConnection,
    account_id: i64,
    page: u64,
    page_size: u64,
) -> Result<LedgerPage> {
    let page = page.max(1);
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);

    let paginator = LedgerEntry::find()
        .filter(ledger_entry::Column::AccountId.eq(account_id))
        .order_by_desc(ledger_entry::Column::CreatedAt)
        .order_by_desc(ledger_entry::Column::Id)
        .paginate(db, page_size);

    let total_count = paginator.num_items().await?;
    let entries = paginator.fetch_page(page - 1).await?;

    Ok(LedgerPage {
        entries,
        total_count,
        page,
        page_size,
    })
}

/// Sum of all ledger movements for an account (credits minus debits).
pub async fn ledger_sum<C>(db: &C, account_id: i64) -> Result<i64>
where
    C: ConnectionTrait,
{
    let entries = LedgerEntry::find()
        .filter(ledger_entry::Column::AccountId.eq(account_id))
        .all(db)
        .await?;

    Ok(entries
        .iter()
        .map(|entry| entry.direction.signed(entry.amount))
        .sum())
}

/// Whether the stored balance equals the ledger sum.
pub async fn verify_balance(db: &DatabaseConnection, account_id: i64) -> Result<bool> {
    let balance = get_balance(db, account_id).await?;
    let sum = ledger_sum(db, account_id).await?;
    if balance != sum {
        tracing::error!(account_id, balance, sum, "Balance does not match ledger");
    }
    Ok(balance == sum)
}
