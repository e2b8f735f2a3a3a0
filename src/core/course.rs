//! Courses and learner progress.
//!
//! Progress is stored per (account, course). The move from below 100 to 100 triggers the
//! one-shot completion reward in the same transaction as the progress write; the
//! `completion_rewarded` flag keeps a second trip to 100 from paying again.

use crate::{
    config::rewards::Policy,
    core::{
        account,
        eligibility::Action,
        ledger::Reference,
        reward::{self, RewardOutcome, RewardRequest},
    },
    entities::{Course, CourseProgress, course, course_progress},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::OnConflict};

/// Result of a progress update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Stored progress after the update
    pub progress: i32,
    /// Progress before the update, 0 for a first update
    pub previous: i32,
    /// Completion reward outcome, when this update reached 100
    pub reward: Option<RewardOutcome>,
}

/// Creates an active course.
pub async fn create_course(
    db: &DatabaseConnection,
    title: String,
    now: DateTime<Utc>,
) -> Result<course::Model> {
    if title.trim().is_empty() {
        return Err(Error::Config {
            message: "Course title cannot be empty".to_string(),
        });
    }

    course::ActiveModel {
        title: Set(title.trim().to_string()),
        is_active: Set(true),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Finds a course by id, active or not.
pub async fn get_course_by_id<C>(db: &C, course_id: i64) -> Result<Option<course::Model>>
where
    C: ConnectionTrait,
{
    Course::find_by_id(course_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Active courses, oldest first.
pub async fn list_courses(db: &DatabaseConnection) -> Result<Vec<course::Model>> {
    Course::find()
        .filter(course::Column::IsActive.eq(true))
        .order_by_asc(course::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The stored progress row for one learner and course, if any.
pub async fn get_progress<C>(
    db: &C,
    account_id: i64,
    course_id: i64,
) -> Result<Option<course_progress::Model>>
where
    C: ConnectionTrait,
{
    CourseProgress::find()
        .filter(course_progress::Column::AccountId.eq(account_id))
        .filter(course_progress::Column::CourseId.eq(course_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Records a learner's progress through a course.
///
/// # Errors
/// Returns an error if:
/// - `progress` is outside 0..=100
/// - The course does not exist or is inactive
/// - The account does not exist
pub async fn update_progress(
    db: &DatabaseConnection,
    account_id: i64,
    course_id: i64,
    progress: i32,
    now: DateTime<Utc>,
    policy: &Policy,
) -> Result<ProgressUpdate> {
    if !(0..=100).contains(&progress) {
        return Err(Error::InvalidProgress { progress });
    }

    let txn = db.begin().await?;

    let found = get_course_by_id(&txn, course_id)
        .await?
        .filter(|c| c.is_active)
        .ok_or(Error::CourseNotFound { course_id })?;
    account::require_account(&txn, account_id).await?;

    let previous = get_progress(&txn, account_id, course_id)
        .await?
        .map_or(0, |p| p.progress);

    let row = course_progress::ActiveModel {
        account_id: Set(account_id),
        course_id: Set(course_id),
        progress: Set(progress),
        completion_rewarded: Set(false),
        updated_at: Set(now),
        ..Default::default()
    };
    CourseProgress::insert(row)
        .on_conflict(
            OnConflict::columns([
                course_progress::Column::AccountId,
                course_progress::Column::CourseId,
            ])
            .update_columns([
                course_progress::Column::Progress,
                course_progress::Column::UpdatedAt,
            ])
            .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

    let reward = if previous < 100 && progress == 100 {
        let request = RewardRequest {
            account_id,
            action: Action::CourseComplete(course_id),
            amount: policy.rewards.course_complete,
            reason: format!("Completed course: {}", found.title),
            reference: Some(Reference::new("course", course_id)),
        };
        Some(reward::grant_in_txn(&txn, &request, now, policy.offset).await?)
    } else {
        None
    };

    txn.commit().await?;

    if let Some(outcome) = reward.filter(|o| o.granted) {
        reward::announce_level_change(db, account_id, &outcome, now, policy).await;
    }

    tracing::debug!(account_id, course_id, previous, progress, "Course progress updated");

    Ok(ProgressUpdate {
        progress,
        previous,
        reward,
    })
}
