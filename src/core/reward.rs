//! Reward issuance.
//!
//! A reward is one atomic unit: claim the action for its window, append a credit entry,
//! bump the balance. The claim comes first and is an insert-if-absent against the
//! `(account_id, action, completed_on)` unique index, so when two requests race only one
//! insert lands and the other gets `granted: false` with nothing written.
//! "Already claimed" is an ordinary outcome here, never an error.

use crate::{
    config::rewards::Policy,
    core::{
        account,
        eligibility::{Action, window_date},
        ledger::{self, Reference},
        notification, task,
    },
    entities::{
        CourseProgress, TaskCompletion, course_progress, daily_task::TaskKind,
        ledger_entry::Direction, task_completion,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, OnConflict},
};

/// A request to grant points for an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardRequest {
    /// Receiving account
    pub account_id: i64,
    /// Action being rewarded; decides the eligibility window
    pub action: Action,
    /// Points to grant, must be positive
    pub amount: i64,
    /// Ledger reason text
    pub reason: String,
    /// What caused the reward
    pub reference: Option<Reference>,
}

/// What happened to a reward request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardOutcome {
    /// Whether points were granted
    pub granted: bool,
    /// Points granted, 0 when not granted
    pub amount: i64,
    /// Balance before the request
    pub previous_balance: i64,
    /// Balance after the request
    pub new_balance: i64,
}

impl RewardOutcome {
    /// Outcome for a request that changed nothing.
    #[must_use]
    pub const fn not_granted(balance: i64) -> Self {
        Self {
            granted: false,
            amount: 0,
            previous_balance: balance,
            new_balance: balance,
        }
    }
}

/// Grants a reward as a single transaction.
///
/// Returns `granted: false` when the action was already claimed in its window.
///
/// # Errors
/// Returns an error if:
/// - `amount` is not positive
/// - The account does not exist
/// - The transaction cannot be committed
pub async fn issue_reward(
    db: &DatabaseConnection,
    request: RewardRequest,
    now: DateTime<Utc>,
    policy: &Policy,
) -> Result<RewardOutcome> {
    if request.amount <= 0 {
        return Err(Error::InvalidAmount {
            amount: request.amount,
        });
    }

    let txn = db.begin().await?;
    let outcome = grant_in_txn(&txn, &request, now, policy.offset).await?;

    if outcome.granted {
        txn.commit().await?;
        announce_level_change(db, request.account_id, &outcome, now, policy).await;
    } else {
        txn.rollback().await?;
    }

    Ok(outcome)
}

/// Grants a reward inside a caller's transaction.
///
/// Used when the reward has to commit or roll back together with the write that
/// earned it (the article insert, the comment insert, the progress update). When the
/// claim fails nothing is written and the caller's own writes are left alone.
pub(crate) async fn grant_in_txn<C>(
    conn: &C,
    request: &RewardRequest,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<RewardOutcome>
where
    C: ConnectionTrait,
{
    let acc = account::require_account(conn, request.account_id).await?;

    if !claim(conn, request, now, offset).await? {
        tracing::info!(
            account_id = request.account_id,
            action = %request.action,
            "Reward already claimed"
        );
        return Ok(RewardOutcome::not_granted(acc.balance));
    }

    ledger::append_entry(
        conn,
        request.account_id,
        Direction::Credit,
        request.amount,
        request.reason.clone(),
        request.reference.clone(),
        now,
    )
    .await?;
    let new_balance = ledger::adjust_balance(conn, request.account_id, request.amount).await?;

    tracing::info!(
        account_id = request.account_id,
        action = %request.action,
        amount = request.amount,
        new_balance,
        "Reward granted"
    );

    Ok(RewardOutcome {
        granted: true,
        amount: request.amount,
        previous_balance: acc.balance,
        new_balance,
    })
}

/// Records the claim for the request's window. `false` means someone got there first.
async fn claim<C>(
    conn: &C,
    request: &RewardRequest,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<bool>
where
    C: ConnectionTrait,
{
    match request.action {
        Action::CheckIn | Action::Task(_) | Action::FirstCommentOfDay => {
            let record = task_completion::ActiveModel {
                account_id: Set(request.account_id),
                action: Set(request.action.key()),
                task_id: Set(request.action.task_id()),
                completed_on: Set(window_date(now, offset)),
                created_at: Set(now),
                ..Default::default()
            };

            let inserted = TaskCompletion::insert(record)
                .on_conflict(
                    OnConflict::columns([
                        task_completion::Column::AccountId,
                        task_completion::Column::Action,
                        task_completion::Column::CompletedOn,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(conn)
                .await?;

            Ok(inserted == 1)
        }
        Action::CourseComplete(course_id) => {
            // Flip the one-shot flag; only a finished, unrewarded row qualifies
            let flipped = CourseProgress::update_many()
                .col_expr(course_progress::Column::CompletionRewarded, Expr::value(true))
                .filter(course_progress::Column::AccountId.eq(request.account_id))
                .filter(course_progress::Column::CourseId.eq(course_id))
                .filter(course_progress::Column::Progress.gte(100))
                .filter(course_progress::Column::CompletionRewarded.eq(false))
                .exec(conn)
                .await?;

            Ok(flipped.rows_affected == 1)
        }
        Action::ArticlePublish => Ok(true),
    }
}

/// Sends an in-app notification when a reward moved the account up a tier.
///
/// Best effort: failures are logged and never affect the already-committed reward.
pub(crate) async fn announce_level_change(
    db: &DatabaseConnection,
    account_id: i64,
    outcome: &RewardOutcome,
    now: DateTime<Utc>,
    policy: &Policy,
) {
    let step = policy.rewards.level_step;
    let old_level = account::level_for_balance(outcome.previous_balance, step);
    let new_level = account::level_for_balance(outcome.new_balance, step);

    if new_level <= old_level {
        return;
    }

    let sent = notification::notify(
        db,
        account_id,
        format!("Level {new_level} reached"),
        format!(
            "You now have {} points and reached level {new_level}.",
            outcome.new_balance
        ),
        now,
    )
    .await;

    if let Err(e) = sent {
        tracing::warn!(account_id, "Failed to send level notification: {e}");
    }
}

/// Daily check-in.
///
/// The amount comes from the first active check-in task when one exists, otherwise from
/// the configured default.
pub async fn check_in(
    db: &DatabaseConnection,
    account_id: i64,
    now: DateTime<Utc>,
    policy: &Policy,
) -> Result<RewardOutcome> {
    let amount = task::get_active_checkin_task(db)
        .await?
        .map_or(policy.rewards.checkin, |t| t.reward);

    issue_reward(
        db,
        RewardRequest {
            account_id,
            action: Action::CheckIn,
            amount,
            reason: "Daily check-in".to_string(),
            reference: Some(Reference::tag("checkin")),
        },
        now,
        policy,
    )
    .await
}

/// Completes a daily catalog task.
///
/// # Errors
/// Returns `TaskNotFound` if the task does not exist or is inactive.
pub async fn complete_task(
    db: &DatabaseConnection,
    account_id: i64,
    task_id: i64,
    now: DateTime<Utc>,
    policy: &Policy,
) -> Result<RewardOutcome> {
    let found = task::get_task_by_id(db, task_id)
        .await?
        .filter(|t| t.is_active)
        .ok_or(Error::TaskNotFound { task_id })?;

    if found.kind == TaskKind::Checkin {
        return check_in(db, account_id, now, policy).await;
    }

    issue_reward(
        db,
        RewardRequest {
            account_id,
            action: Action::Task(task_id),
            amount: found.reward,
            reason: format!("Completed task: {}", found.title),
            reference: Some(Reference::new("task", task_id)),
        },
        now,
        policy,
    )
    .await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{article, course, item, spend};
    use crate::entities::{
        LedgerEntry, Notification, RedeemableItem, RedemptionOrder, article::ArticleStatus,
        ledger_entry,
    };
    use crate::test_utils::*;
    use chrono::{TimeDelta, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase, PaginatorTrait};

    fn morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 8, 0, 0).unwrap()
    }

    async fn claim_count(db: &DatabaseConnection, account_id: i64) -> Result<u64> {
        TaskCompletion::find()
            .filter(task_completion::Column::AccountId.eq(account_id))
            .count(db)
            .await
            .map_err(Into::into)
    }

    async fn entry_count(db: &DatabaseConnection, account_id: i64) -> Result<u64> {
        LedgerEntry::find()
            .filter(ledger_entry::Column::AccountId.eq(account_id))
            .count(db)
            .await
            .map_err(Into::into)
    }

    #[tokio::test]
    async fn test_issue_reward_rejects_non_positive_amount() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = issue_reward(
            &db,
            RewardRequest {
                account_id: 1,
                action: Action::ArticlePublish,
                amount: 0,
                reason: "test".to_string(),
                reference: None,
            },
            Utc::now(),
            &test_policy(),
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: 0 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_issue_reward_missing_account() -> Result<()> {
        let db = setup_test_db().await?;

        let result = check_in(&db, 404, morning(), &test_policy()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::AccountNotFound { account_id: 404 }
        ));
        assert_eq!(claim_count(&db, 404).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_check_in_twice_same_day_grants_once() -> Result<()> {
        let (db, acc) = setup_with_account().await?;
        let policy = test_policy();

        let first = check_in(&db, acc.id, morning(), &policy).await?;
        assert!(first.granted);
        assert_eq!(first.amount, 10);
        assert_eq!(first.new_balance, 10);

        let later = morning() + TimeDelta::hours(10);
        let second = check_in(&db, acc.id, later, &policy).await?;
        assert!(!second.granted);
        assert_eq!(second.amount, 0);
        assert_eq!(second.new_balance, 10);

        assert_eq!(ledger::get_balance(&db, acc.id).await?, 10);
        assert_eq!(entry_count(&db, acc.id).await?, 1);
        assert_eq!(claim_count(&db, acc.id).await?, 1);

        let next_day = morning() + TimeDelta::days(1);
        assert!(check_in(&db, acc.id, next_day, &policy).await?.granted);
        assert_eq!(ledger::get_balance(&db, acc.id).await?, 20);

        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_check_in_grants_exactly_once() -> Result<()> {
        let (db, acc) = setup_with_account().await?;
        let policy = test_policy();

        let (a, b) = tokio::join!(
            check_in(&db, acc.id, morning(), &policy),
            check_in(&db, acc.id, morning(), &policy)
        );
        let granted = [a?, b?].iter().filter(|o| o.granted).count();

        assert_eq!(granted, 1);
        assert_eq!(entry_count(&db, acc.id).await?, 1);
        assert_eq!(claim_count(&db, acc.id).await?, 1);
        assert_eq!(ledger::get_balance(&db, acc.id).await?, 10);

        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_check_in_on_pooled_connections() -> Result<()> {
        let (_dir, db) = setup_file_db().await?;
        let acc = create_test_account(&db, "Racer").await?;
        let policy = test_policy();

        let (a, b, c, d) = tokio::join!(
            check_in(&db, acc.id, morning(), &policy),
            check_in(&db, acc.id, morning(), &policy),
            check_in(&db, acc.id, morning(), &policy),
            check_in(&db, acc.id, morning(), &policy)
        );

        // A loser either sees the claim or has its write refused by the lock
        let mut granted = 0;
        for result in [a, b, c, d] {
            match result {
                Ok(outcome) if outcome.granted => granted += 1,
                Ok(_) | Err(Error::Database(_)) => {}
                Err(e) => return Err(e),
            }
        }

        assert_eq!(granted, 1);
        assert_eq!(entry_count(&db, acc.id).await?, 1);
        assert_eq!(claim_count(&db, acc.id).await?, 1);
        assert_eq!(ledger::get_balance(&db, acc.id).await?, 10);
        assert!(ledger::verify_balance(&db, acc.id).await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_check_in_uses_task_reward_when_configured() -> Result<()> {
        let (db, acc) = setup_with_account().await?;
        create_custom_task(&db, "Check in", TaskKind::Checkin, 15).await?;

        let outcome = check_in(&db, acc.id, morning(), &test_policy()).await?;
        assert_eq!(outcome.amount, 15);

        Ok(())
    }

    #[tokio::test]
    async fn test_check_in_window_follows_configured_zone() -> Result<()> {
        let (db, acc) = setup_with_account().await?;
        let mut policy = test_policy();
        policy.offset = FixedOffset::east_opt(8 * 3600).unwrap();

        // 15:00 and 17:00 UTC fall on different days in UTC+8
        let before = Utc.with_ymd_and_hms(2024, 6, 3, 15, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 6, 3, 17, 0, 0).unwrap();

        assert!(check_in(&db, acc.id, before, &policy).await?.granted);
        assert!(check_in(&db, acc.id, after, &policy).await?.granted);

        Ok(())
    }

    #[tokio::test]
    async fn test_complete_task_once_per_day() -> Result<()> {
        let (db, acc) = setup_with_account().await?;
        let policy = test_policy();
        let read = create_test_task(&db, "Read an article", 5).await?;
        let learn = create_custom_task(&db, "Finish a lesson", TaskKind::Learn, 50).await?;

        assert!(complete_task(&db, acc.id, read.id, morning(), &policy).await?.granted);
        assert!(!complete_task(&db, acc.id, read.id, morning(), &policy).await?.granted);
        // A different task has its own claim
        let learned = complete_task(&db, acc.id, learn.id, morning(), &policy).await?;
        assert!(learned.granted);
        assert_eq!(learned.new_balance, 55);

        Ok(())
    }

    #[tokio::test]
    async fn test_complete_task_unknown_or_inactive() -> Result<()> {
        let (db, acc) = setup_with_account().await?;
        let policy = test_policy();

        let result = complete_task(&db, acc.id, 77, morning(), &policy).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::TaskNotFound { task_id: 77 }
        ));

        let task = create_test_task(&db, "Download a doc", 5).await?;
        crate::core::task::set_task_active(&db, task.id, false).await?;
        let result = complete_task(&db, acc.id, task.id, morning(), &policy).await;
        assert!(matches!(result.unwrap_err(), Error::TaskNotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_checkin_task_shares_check_in_claim() -> Result<()> {
        let (db, acc) = setup_with_account().await?;
        let policy = test_policy();
        let checkin_task = create_custom_task(&db, "Check in", TaskKind::Checkin, 10).await?;

        assert!(check_in(&db, acc.id, morning(), &policy).await?.granted);
        let again = complete_task(&db, acc.id, checkin_task.id, morning(), &policy).await?;
        assert!(!again.granted);
        assert_eq!(ledger::get_balance(&db, acc.id).await?, 10);

        Ok(())
    }

    #[tokio::test]
    async fn test_level_up_sends_notification() -> Result<()> {
        let (db, acc) = setup_with_account().await?;
        let mut policy = test_policy();
        policy.rewards.level_step = 15;

        check_in(&db, acc.id, morning(), &policy).await?;
        assert_eq!(Notification::find().count(&db).await?, 0);

        let read = create_test_task(&db, "Read an article", 5).await?;
        complete_task(&db, acc.id, read.id, morning(), &policy).await?;

        let notes = notification::list_notifications(&db, acc.id, false).await?;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Level 2 reached");

        Ok(())
    }

    #[tokio::test]
    async fn test_end_to_end_reward_and_spend() -> Result<()> {
        let (db, acc) = setup_with_account().await?;
        let policy = test_policy();
        let read = create_test_task(&db, "Read an article", 5).await?;
        let voucher = item::create_item(&db, "Coffee voucher".to_string(), 30, 5).await?;

        check_in(&db, acc.id, morning(), &policy).await?;
        assert_eq!(ledger::get_balance(&db, acc.id).await?, 10);
        assert_eq!(entry_count(&db, acc.id).await?, 1);

        complete_task(&db, acc.id, read.id, morning(), &policy).await?;
        assert_eq!(ledger::get_balance(&db, acc.id).await?, 15);
        assert_eq!(entry_count(&db, acc.id).await?, 2);

        article::create_article(
            &db,
            acc.id,
            "Hello".to_string(),
            "First post".to_string(),
            ArticleStatus::Published,
            morning(),
            &policy,
        )
        .await?;
        assert_eq!(ledger::get_balance(&db, acc.id).await?, 35);
        assert_eq!(entry_count(&db, acc.id).await?, 3);

        spend::authorize_spend(&db, acc.id, voucher.id, morning()).await?;
        assert_eq!(ledger::get_balance(&db, acc.id).await?, 5);
        assert_eq!(
            RedeemableItem::find_by_id(voucher.id)
                .one(&db)
                .await?
                .unwrap()
                .stock,
            4
        );
        assert_eq!(RedemptionOrder::find().count(&db).await?, 1);

        let page = ledger::get_ledger(&db, acc.id, 1, 10).await?;
        assert_eq!(page.total_count, 4);
        let last = &page.entries[0];
        assert_eq!(last.direction, Direction::Debit);
        assert_eq!(last.amount, 30);

        assert!(ledger::verify_balance(&db, acc.id).await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_course_reward_via_issue_reward_needs_finished_progress() -> Result<()> {
        let (db, acc) = setup_with_account().await?;
        let policy = test_policy();
        let c = course::create_course(&db, "Rust 101".to_string(), morning()).await?;

        let request = RewardRequest {
            account_id: acc.id,
            action: Action::CourseComplete(c.id),
            amount: 50,
            reason: "Completed course".to_string(),
            reference: Some(Reference::new("course", c.id)),
        };

        // No progress row yet: nothing to claim
        let early = issue_reward(&db, request.clone(), morning(), &policy).await?;
        assert!(!early.granted);
        assert_eq!(entry_count(&db, acc.id).await?, 0);

        Ok(())
    }
}
