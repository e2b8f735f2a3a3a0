//! Daily task business logic - the catalog of repeatable rewarded actions.
//!
//! Administrators create and tune tasks; the reward amount is stored on the task so it
//! can change without a code change. Tasks are deactivated rather than deleted.

use crate::{
    config::rewards::TaskConfig,
    core::eligibility::{self, Action},
    entities::{
        DailyTask,
        daily_task::{self, TaskKind},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};

/// A task together with whether the account already completed it today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatus {
    /// The task
    pub task: daily_task::Model,
    /// Whether today's claim exists
    pub completed: bool,
}

fn validate_task(title: &str, reward: i64) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::Config {
            message: "Task title cannot be empty".to_string(),
        });
    }
    if reward <= 0 {
        return Err(Error::InvalidAmount { amount: reward });
    }
    Ok(())
}

/// Creates an active task.
///
/// # Errors
/// Returns an error if:
/// - The title is empty or whitespace-only
/// - The reward is not positive
/// - The database insert fails (including a duplicate title)
pub async fn create_task(
    db: &DatabaseConnection,
    title: String,
    kind: TaskKind,
    reward: i64,
) -> Result<daily_task::Model> {
    validate_task(&title, reward)?;

    let now = Utc::now().naive_utc();
    let task = daily_task::ActiveModel {
        title: Set(title.trim().to_string()),
        kind: Set(kind),
        reward: Set(reward),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    task.insert(db).await.map_err(Into::into)
}

/// Changes a task's reward amount.
pub async fn update_task_reward(
    db: &DatabaseConnection,
    task_id: i64,
    reward: i64,
) -> Result<daily_task::Model> {
    if reward <= 0 {
        return Err(Error::InvalidAmount { amount: reward });
    }

    let mut task: daily_task::ActiveModel = get_task_by_id(db, task_id)
        .await?
        .ok_or(Error::TaskNotFound { task_id })?
        .into();

    task.reward = Set(reward);
    task.updated_at = Set(Utc::now().naive_utc());
    task.update(db).await.map_err(Into::into)
}

/// Activates or deactivates a task.
pub async fn set_task_active(
    db: &DatabaseConnection,
    task_id: i64,
    active: bool,
) -> Result<daily_task::Model> {
    let mut task: daily_task::ActiveModel = get_task_by_id(db, task_id)
        .await?
        .ok_or(Error::TaskNotFound { task_id })?
        .into();

    task.is_active = Set(active);
    task.updated_at = Set(Utc::now().naive_utc());
    task.update(db).await.map_err(Into::into)
}

/// All active tasks, ordered by title.
pub async fn get_active_tasks(db: &DatabaseConnection) -> Result<Vec<daily_task::Model>> {
    DailyTask::find()
        .filter(daily_task::Column::IsActive.eq(true))
        .order_by_asc(daily_task::Column::Title)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a task by id, active or not.
pub async fn get_task_by_id<C>(db: &C, task_id: i64) -> Result<Option<daily_task::Model>>
where
    C: ConnectionTrait,
{
    DailyTask::find_by_id(task_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an active task by its exact title.
pub async fn get_task_by_title(
    db: &DatabaseConnection,
    title: &str,
) -> Result<Option<daily_task::Model>> {
    DailyTask::find()
        .filter(daily_task::Column::Title.eq(title))
        .filter(daily_task::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(Into::into)
}

/// The active check-in task with the lowest id, if any.
pub async fn get_active_checkin_task<C>(db: &C) -> Result<Option<daily_task::Model>>
where
    C: ConnectionTrait,
{
    DailyTask::find()
        .filter(daily_task::Column::Kind.eq(TaskKind::Checkin))
        .filter(daily_task::Column::IsActive.eq(true))
        .order_by_asc(daily_task::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Inserts configured tasks whose titles are not in the catalog yet.
///
/// Returns the number of tasks inserted. Existing tasks are left untouched so admin
/// edits survive restarts.
pub async fn seed_tasks(db: &DatabaseConnection, seeds: &[TaskConfig]) -> Result<usize> {
    let mut inserted = 0;
    for seed in seeds {
        let exists = DailyTask::find()
            .filter(daily_task::Column::Title.eq(seed.title.trim()))
            .one(db)
            .await?
            .is_some();
        if exists {
            continue;
        }
        create_task(db, seed.title.clone(), seed.kind, seed.reward).await?;
        inserted += 1;
    }
    if inserted > 0 {
        tracing::info!("Seeded {inserted} daily tasks");
    }
    Ok(inserted)
}

/// Active tasks with today's completion state for one account.
pub async fn tasks_for_today(
    db: &DatabaseConnection,
    account_id: i64,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<Vec<TaskStatus>> {
    let today = eligibility::window_date(now, offset);
    let mut statuses = Vec::new();

    for task in get_active_tasks(db).await? {
        let action = if task.kind == TaskKind::Checkin {
            Action::CheckIn
        } else {
            Action::Task(task.id)
        };
        let completed = eligibility::has_claim(db, account_id, &action, today).await?;
        statuses.push(TaskStatus { task, completed });
    }

    Ok(statuses)
}
