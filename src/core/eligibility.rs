//! Eligibility checks - has this account already claimed this reward in this window?
//!
//! These checks are read-only and only serve as a fast path and a hint for the UI.
//! Two concurrent requests can both see "eligible"; the claim insert performed by
//! [`crate::core::reward`] inside the reward transaction decides which one wins.

use crate::{
    core::{account, task},
    entities::{
        Comment, CourseProgress, TaskCompletion, comment, course_progress, daily_task::TaskKind,
        task_completion,
    },
    errors::Result,
};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Utc};
use sea_orm::{ConnectionTrait, prelude::*};
use std::fmt;

/// A rewardable action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Daily check-in
    CheckIn,
    /// Completing a daily catalog task
    Task(i64),
    /// First comment of the calendar day
    FirstCommentOfDay,
    /// Course progress reaching 100%, once per account and course
    CourseComplete(i64),
    /// Publishing an article; never capped
    ArticlePublish,
}

impl Action {
    /// Stable key stored in claim records.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::CheckIn => "checkin".to_string(),
            Self::Task(task_id) => format!("task:{task_id}"),
            Self::FirstCommentOfDay => "first-comment-of-day".to_string(),
            Self::CourseComplete(course_id) => format!("course-complete:{course_id}"),
            Self::ArticlePublish => "article-publish".to_string(),
        }
    }

    /// Whether the action can be claimed once per calendar day.
    #[must_use]
    pub const fn is_daily(&self) -> bool {
        matches!(self, Self::CheckIn | Self::Task(_) | Self::FirstCommentOfDay)
    }

    /// Catalog task id for `Task` actions.
    #[must_use]
    pub const fn task_id(&self) -> Option<i64> {
        match self {
            Self::Task(task_id) => Some(*task_id),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Which referenced row was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    /// No such account
    Account(i64),
    /// No such active task
    Task(i64),
    /// No such course
    Course(i64),
}

/// Result of an eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// The reward can be claimed
    Eligible,
    /// Already claimed in the current window (or ever, for one-shot actions)
    AlreadyClaimed,
    /// A referenced row does not exist; never eligible
    NotFound(Missing),
}

impl Eligibility {
    /// Collapses the result to a yes/no answer.
    #[must_use]
    pub const fn is_eligible(self) -> bool {
        matches!(self, Self::Eligible)
    }
}

/// Calendar day containing `now` in the configured zone.
#[must_use]
pub fn window_date(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// Midnight starting the calendar day containing `now`, as a UTC instant.
#[must_use]
pub fn window_start(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let local_midnight = window_date(now, offset).and_time(NaiveTime::MIN);
    (local_midnight - TimeDelta::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}

/// Whether a claim record exists for this account, action and day.
pub async fn has_claim<C>(db: &C, account_id: i64, action: &Action, day: NaiveDate) -> Result<bool>
where
    C: ConnectionTrait,
{
    let claim = TaskCompletion::find()
        .filter(task_completion::Column::AccountId.eq(account_id))
        .filter(task_completion::Column::Action.eq(action.key()))
        .filter(task_completion::Column::CompletedOn.eq(day))
        .one(db)
        .await?;
    Ok(claim.is_some())
}

/// Checks whether `account_id` may claim `action` at `now`.
///
/// Never fails for a missing account, task or course; those produce
/// [`Eligibility::NotFound`]. Errors are storage failures only.
pub async fn check_eligibility<C>(
    db: &C,
    account_id: i64,
    action: &Action,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<Eligibility>
where
    C: ConnectionTrait,
{
    if account::get_account_by_id(db, account_id).await?.is_none() {
        return Ok(Eligibility::NotFound(Missing::Account(account_id)));
    }

    let today = window_date(now, offset);

    let claimed = match action {
        Action::CheckIn => has_claim(db, account_id, action, today).await?,
        Action::Task(task_id) => {
            let Some(found) = task::get_task_by_id(db, *task_id)
                .await?
                .filter(|t| t.is_active)
            else {
                return Ok(Eligibility::NotFound(Missing::Task(*task_id)));
            };
            // A check-in task shares the check-in claim
            let claim_action = if found.kind == TaskKind::Checkin {
                Action::CheckIn
            } else {
                *action
            };
            has_claim(db, account_id, &claim_action, today).await?
        }
        Action::FirstCommentOfDay => {
            let commented_today = Comment::find()
                .filter(comment::Column::AuthorId.eq(account_id))
                .filter(comment::Column::CreatedAt.gte(window_start(now, offset)))
                .one(db)
                .await?
                .is_some();
            commented_today || has_claim(db, account_id, action, today).await?
        }
        Action::CourseComplete(course_id) => {
            if crate::core::course::get_course_by_id(db, *course_id)
                .await?
                .is_none()
            {
                return Ok(Eligibility::NotFound(Missing::Course(*course_id)));
            }
            CourseProgress::find()
                .filter(course_progress::Column::AccountId.eq(account_id))
                .filter(course_progress::Column::CourseId.eq(*course_id))
                .one(db)
                .await?
                .is_some_and(|p| p.completion_rewarded)
        }
        Action::ArticlePublish => false,
    };

    Ok(if claimed {
        Eligibility::AlreadyClaimed
    } else {
        Eligibility::Eligible
    })
}
