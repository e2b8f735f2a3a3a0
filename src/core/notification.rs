//! In-app notifications. There is no push delivery; recipients read the list.

use crate::{
    entities::{Notification, notification},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*, sea_query::Expr};

/// Adds a notification to an account's list.
pub async fn notify<C>(
    db: &C,
    account_id: i64,
    title: String,
    body: String,
    now: DateTime<Utc>,
) -> Result<notification::Model>
where
    C: ConnectionTrait,
{
    let note = notification::ActiveModel {
        account_id: Set(account_id),
        title: Set(title),
        body: Set(body),
        is_read: Set(false),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::debug!(account_id, notification_id = note.id, "Notification queued");
    Ok(note)
}

/// An account's notifications, newest first.
pub async fn list_notifications(
    db: &DatabaseConnection,
    account_id: i64,
    unread_only: bool,
) -> Result<Vec<notification::Model>> {
    let mut query = Notification::find().filter(notification::Column::AccountId.eq(account_id));
    if unread_only {
        query = query.filter(notification::Column::IsRead.eq(false));
    }

    query
        .order_by_desc(notification::Column::CreatedAt)
        .order_by_desc(notification::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Marks one notification read. Returns `false` if it does not belong to the account
/// or was already read.
pub async fn mark_read(
    db: &DatabaseConnection,
    account_id: i64,
    notification_id: i64,
) -> Result<bool> {
    let result = Notification::update_many()
        .col_expr(notification::Column::IsRead, Expr::value(true))
        .filter(notification::Column::Id.eq(notification_id))
        .filter(notification::Column::AccountId.eq(account_id))
        .filter(notification::Column::IsRead.eq(false))
        .exec(db)
        .await?;
    Ok(result.rows_affected == 1)
}

/// Marks the listed notifications read, returning how many changed.
///
/// Ids that belong to another account or are already read are skipped, so a caller
/// can pass exactly what it displayed.
pub async fn mark_read_many(
    db: &DatabaseConnection,
    account_id: i64,
    notification_ids: &[i64],
) -> Result<u64> {
    if notification_ids.is_empty() {
        return Ok(0);
    }
    let result = Notification::update_many()
        .col_expr(notification::Column::IsRead, Expr::value(true))
        .filter(notification::Column::Id.is_in(notification_ids.iter().copied()))
        .filter(notification::Column::AccountId.eq(account_id))
        .filter(notification::Column::IsRead.eq(false))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Marks every unread notification read, returning how many changed.
pub async fn mark_all_read(db: &DatabaseConnection, account_id: i64) -> Result<u64> {
    let result = Notification::update_many()
        .col_expr(notification::Column::IsRead, Expr::value(true))
        .filter(notification::Column::AccountId.eq(account_id))
        .filter(notification::Column::IsRead.eq(false))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Number of unread notifications for an account.
pub async fn unread_count(db: &DatabaseConnection, account_id: i64) -> Result<u64> {
    Notification::find()
        .filter(notification::Column::AccountId.eq(account_id))
        .filter(notification::Column::IsRead.eq(false))
        .count(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use chrono::TimeDelta;

    #[tokio::test]
    async fn test_notify_and_read() -> Result<()> {
        let (db, acc) = setup_with_account().await?;
        let now = Utc::now();

        let first = notify(&db, acc.id, "One".to_string(), "a".to_string(), now).await?;
        notify(
            &db,
            acc.id,
            "Two".to_string(),
            "b".to_string(),
            now + TimeDelta::seconds(1),
        )
        .await?;

        let all = list_notifications(&db, acc.id, false).await?;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "Two");
        assert_eq!(unread_count(&db, acc.id).await?, 2);

        assert!(mark_read(&db, acc.id, first.id).await?);
        assert!(!mark_read(&db, acc.id, first.id).await?);
        assert_eq!(unread_count(&db, acc.id).await?, 1);

        let unread = list_notifications(&db, acc.id, true).await?;
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].title, "Two");

        assert_eq!(mark_all_read(&db, acc.id).await?, 1);
        assert_eq!(unread_count(&db, acc.id).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_marking_a_shown_page_keeps_the_rest_unread() -> Result<()> {
        let (db, acc) = setup_with_account().await?;
        let now = Utc::now();

        for i in 0..12 {
            notify(
                &db,
                acc.id,
                format!("Note {i}"),
                String::new(),
                now + TimeDelta::seconds(i),
            )
            .await?;
        }

        let shown: Vec<i64> = list_notifications(&db, acc.id, true)
            .await?
            .iter()
            .take(10)
            .map(|n| n.id)
            .collect();
        assert_eq!(mark_read_many(&db, acc.id, &shown).await?, 10);

        let remaining = list_notifications(&db, acc.id, true).await?;
        assert_eq!(remaining.len(), 2);
        assert_eq!(remaining[0].title, "Note 1");
        assert_eq!(remaining[1].title, "Note 0");

        assert_eq!(mark_read_many(&db, acc.id, &[]).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_mark_read_is_scoped_to_owner() -> Result<()> {
        let (db, acc) = setup_with_account().await?;
        let other = create_test_account(&db, "Other").await?;

        let note = notify(&db, acc.id, "Hi".to_string(), String::new(), Utc::now()).await?;
        assert!(!mark_read(&db, other.id, note.id).await?);
        assert_eq!(mark_read_many(&db, other.id, &[note.id]).await?, 0);
        assert_eq!(unread_count(&db, acc.id).await?, 1);

        Ok(())
    }
}
