//! Articles and comments, the two content actions that earn points.
//!
//! Every publication pays `article_publish` points, with no daily cap. A comment pays
//! `first_comment` points only when it is the author's first comment of the calendar
//! day. In both cases the reward commits together with the row that earned it.

use crate::{
    config::rewards::Policy,
    core::{
        account,
        eligibility::{self, Action},
        ledger::Reference,
        reward::{self, RewardOutcome, RewardRequest},
    },
    entities::{
        Article, Comment,
        article::{self, ArticleStatus},
        comment,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ConnectionTrait, DatabaseTransaction, QueryOrder, Set, TransactionTrait, prelude::*,
    sea_query::Expr,
};

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Config {
            message: format!("Article {field} cannot be empty"),
        });
    }
    Ok(())
}

fn publish_request(author_id: i64, found: &article::Model, policy: &Policy) -> RewardRequest {
    RewardRequest {
        account_id: author_id,
        action: Action::ArticlePublish,
        amount: policy.rewards.article_publish,
        reason: format!("Published article: {}", found.title),
        reference: Some(Reference::new("article", found.id)),
    }
}

async fn finish(
    db: &DatabaseConnection,
    txn: DatabaseTransaction,
    account_id: i64,
    outcome: RewardOutcome,
    now: DateTime<Utc>,
    policy: &Policy,
) -> Result<()> {
    txn.commit().await?;
    if outcome.granted {
        reward::announce_level_change(db, account_id, &outcome, now, policy).await;
    }
    Ok(())
}

/// Finds an article by id, in any status.
pub async fn get_article_by_id<C>(db: &C, article_id: i64) -> Result<Option<article::Model>>
where
    C: ConnectionTrait,
{
    Article::find_by_id(article_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Published articles, most recently published first.
pub async fn list_published_articles(db: &DatabaseConnection) -> Result<Vec<article::Model>> {
    Article::find()
        .filter(article::Column::Status.eq(ArticleStatus::Published))
        .order_by_desc(article::Column::PublishedAt)
        .order_by_desc(article::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Comments on an article, oldest first.
pub async fn list_comments(
    db: &DatabaseConnection,
    article_id: i64,
) -> Result<Vec<comment::Model>> {
    Comment::find()
        .filter(comment::Column::ArticleId.eq(article_id))
        .order_by_asc(comment::Column::CreatedAt)
        .order_by_asc(comment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates an article. Creating it directly as published pays the publication reward.
///
/// # Errors
/// Returns an error if:
/// - The title or content is empty
/// - The author account does not exist
pub async fn create_article(
    db: &DatabaseConnection,
    author_id: i64,
    title: String,
    content: String,
    status: ArticleStatus,
    now: DateTime<Utc>,
    policy: &Policy,
) -> Result<(article::Model, RewardOutcome)> {
    require_text("title", &title)?;
    require_text("content", &content)?;

    let txn = db.begin().await?;
    let author = account::require_account(&txn, author_id).await?;

    let created = article::ActiveModel {
        author_id: Set(author_id),
        title: Set(title.trim().to_string()),
        content: Set(content),
        status: Set(status),
        created_at: Set(now),
        published_at: Set((status == ArticleStatus::Published).then_some(now)),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let outcome = if status == ArticleStatus::Published {
        reward::grant_in_txn(
            &txn,
            &publish_request(author_id, &created, policy),
            now,
            policy.offset,
        )
        .await?
    } else {
        RewardOutcome::not_granted(author.balance)
    };

    finish(db, txn, author_id, outcome, now, policy).await?;
    tracing::info!(article_id = created.id, author_id, status = ?status, "Article created");

    Ok((created, outcome))
}

/// Publishes a draft. Only the author may publish.
///
/// Publishing an article that is already published changes nothing and pays nothing.
pub async fn publish_article(
    db: &DatabaseConnection,
    article_id: i64,
    actor_id: i64,
    now: DateTime<Utc>,
    policy: &Policy,
) -> Result<(article::Model, RewardOutcome)> {
    let txn = db.begin().await?;

    let found = get_article_by_id(&txn, article_id)
        .await?
        .ok_or(Error::ArticleNotFound { article_id })?;
    if found.author_id != actor_id {
        return Err(Error::PermissionDenied {
            action: "publishing another author's article".to_string(),
        });
    }

    let moved = Article::update_many()
        .col_expr(article::Column::Status, Expr::value(ArticleStatus::Published))
        .col_expr(article::Column::PublishedAt, Expr::value(Some(now)))
        .filter(article::Column::Id.eq(article_id))
        .filter(article::Column::Status.eq(ArticleStatus::Draft))
        .exec(&txn)
        .await?;

    let outcome = if moved.rows_affected == 1 {
        reward::grant_in_txn(
            &txn,
            &publish_request(actor_id, &found, policy),
            now,
            policy.offset,
        )
        .await?
    } else {
        let author = account::require_account(&txn, actor_id).await?;
        RewardOutcome::not_granted(author.balance)
    };

    let published = get_article_by_id(&txn, article_id)
        .await?
        .ok_or(Error::ArticleNotFound { article_id })?;

    finish(db, txn, actor_id, outcome, now, policy).await?;
    Ok((published, outcome))
}

/// Adds a comment to a published article and tries the first-comment-of-day reward.
///
/// The comment is stored whether or not the reward is granted.
pub async fn add_comment(
    db: &DatabaseConnection,
    article_id: i64,
    author_id: i64,
    content: String,
    now: DateTime<Utc>,
    policy: &Policy,
) -> Result<(comment::Model, RewardOutcome)> {
    if content.trim().is_empty() {
        return Err(Error::Config {
            message: "Comment cannot be empty".to_string(),
        });
    }

    // Must be decided before the insert; the new comment would count as today's
    let eligible = eligibility::check_eligibility(
        db,
        author_id,
        &Action::FirstCommentOfDay,
        now,
        policy.offset,
    )
    .await?
    .is_eligible();

    let txn = db.begin().await?;

    get_article_by_id(&txn, article_id)
        .await?
        .filter(|a| a.status == ArticleStatus::Published)
        .ok_or(Error::ArticleNotFound { article_id })?;
    let author = account::require_account(&txn, author_id).await?;

    let created = comment::ActiveModel {
        article_id: Set(article_id),
        author_id: Set(author_id),
        content: Set(content),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let outcome = if eligible {
        let request = RewardRequest {
            account_id: author_id,
            action: Action::FirstCommentOfDay,
            amount: policy.rewards.first_comment,
            reason: "First comment of the day".to_string(),
            reference: Some(Reference::new("comment", created.id)),
        };
        reward::grant_in_txn(&txn, &request, now, policy.offset).await?
    } else {
        RewardOutcome::not_granted(author.balance)
    };

    finish(db, txn, author_id, outcome, now, policy).await?;
    Ok((created, outcome))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::ledger;
    use crate::test_utils::*;
    use chrono::{TimeDelta, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap()
    }

    async fn published(
        db: &DatabaseConnection,
        author_id: i64,
        title: &str,
    ) -> Result<article::Model> {
        let (a, _) = create_article(
            db,
            author_id,
            title.to_string(),
            "body".to_string(),
            ArticleStatus::Published,
            noon(),
            &test_policy(),
        )
        .await?;
        Ok(a)
    }

    #[tokio::test]
    async fn test_create_article_requires_text() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_article(
            &db,
            1,
            " ".to_string(),
            "body".to_string(),
            ArticleStatus::Draft,
            noon(),
            &test_policy(),
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_draft_pays_nothing_until_published() -> Result<()> {
        let (db, acc) = setup_with_account().await?;
        let policy = test_policy();

        let (draft, outcome) = create_article(
            &db,
            acc.id,
            "Draft".to_string(),
            "body".to_string(),
            ArticleStatus::Draft,
            noon(),
            &policy,
        )
        .await?;
        assert!(!outcome.granted);
        assert!(draft.published_at.is_none());

        let (live, outcome) = publish_article(&db, draft.id, acc.id, noon(), &policy).await?;
        assert!(outcome.granted);
        assert_eq!(outcome.amount, 20);
        assert_eq!(live.status, ArticleStatus::Published);
        assert!(live.published_at.is_some());

        // Already published: no second payment
        let (_, again) = publish_article(&db, draft.id, acc.id, noon(), &policy).await?;
        assert!(!again.granted);
        assert_eq!(ledger::get_balance(&db, acc.id).await?, 20);

        Ok(())
    }

    #[tokio::test]
    async fn test_publish_is_uncapped() -> Result<()> {
        let (db, acc) = setup_with_account().await?;

        for title in ["One", "Two", "Three"] {
            published(&db, acc.id, title).await?;
        }

        assert_eq!(ledger::get_balance(&db, acc.id).await?, 60);
        assert_eq!(list_published_articles(&db).await?.len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_publish_by_other_account_denied() -> Result<()> {
        let (db, acc) = setup_with_account().await?;
        let other = create_test_account(&db, "Other").await?;
        let (draft, _) = create_article(
            &db,
            acc.id,
            "Draft".to_string(),
            "body".to_string(),
            ArticleStatus::Draft,
            noon(),
            &test_policy(),
        )
        .await?;

        let result = publish_article(&db, draft.id, other.id, noon(), &test_policy()).await;
        assert!(matches!(result.unwrap_err(), Error::PermissionDenied { .. }));

        let missing = publish_article(&db, 999, acc.id, noon(), &test_policy()).await;
        assert!(matches!(
            missing.unwrap_err(),
            Error::ArticleNotFound { article_id: 999 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_first_comment_of_day_pays_once() -> Result<()> {
        let (db, acc) = setup_with_account().await?;
        let policy = test_policy();
        let writer = create_test_account(&db, "Writer").await?;
        let post = published(&db, writer.id, "Post").await?;

        let (_, first) =
            add_comment(&db, post.id, acc.id, "Nice".to_string(), noon(), &policy).await?;
        assert!(first.granted);
        assert_eq!(first.amount, 5);

        let (_, second) = add_comment(
            &db,
            post.id,
            acc.id,
            "Again".to_string(),
            noon() + TimeDelta::hours(1),
            &policy,
        )
        .await?;
        assert!(!second.granted);
        assert_eq!(list_comments(&db, post.id).await?.len(), 2);

        let (_, tomorrow) = add_comment(
            &db,
            post.id,
            acc.id,
            "Next day".to_string(),
            noon() + TimeDelta::days(1),
            &policy,
        )
        .await?;
        assert!(tomorrow.granted);
        assert_eq!(ledger::get_balance(&db, acc.id).await?, 10);

        Ok(())
    }

    #[tokio::test]
    async fn test_comment_on_draft_rejected() -> Result<()> {
        let (db, acc) = setup_with_account().await?;
        let (draft, _) = create_article(
            &db,
            acc.id,
            "Draft".to_string(),
            "body".to_string(),
            ArticleStatus::Draft,
            noon(),
            &test_policy(),
        )
        .await?;

        let result = add_comment(
            &db,
            draft.id,
            acc.id,
            "Hi".to_string(),
            noon(),
            &test_policy(),
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::ArticleNotFound { .. }));
        assert_eq!(ledger::get_balance(&db, acc.id).await?, 0);

        Ok(())
    }
}
