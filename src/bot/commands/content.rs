//! Content Discord commands - articles, comments and course progress.
//!
//! These are the earning paths that hang off content rather than the daily task list.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, caller_account, report_failure, reward_note},
        core::{article, course},
        entities::article::ArticleStatus,
        errors::Result,
    };
    use std::fmt::Write;

    const ARTICLES_SHOWN: usize = 10;

    /// Parent command for articles.
    #[poise::command(
        slash_command,
        subcommands("article_write", "article_publish", "article_list")
    )]
    pub async fn article(ctx: Context<'_>) -> Result<()> {
        ctx.say("Article subcommands: write, publish, list").await?;
        Ok(())
    }

    /// Writes an article, as a draft unless you publish it straight away.
    #[poise::command(slash_command, rename = "write")]
    pub async fn article_write(
        ctx: Context<'_>,
        #[description = "Article title"] title: String,
        #[description = "Article text"] content: String,
        #[description = "Publish now (default: save as draft)"] publish: Option<bool>,
    ) -> Result<()> {
        let caller = caller_account(ctx).await?;
        let data = ctx.data();
        let status = if publish.unwrap_or(false) {
            ArticleStatus::Published
        } else {
            ArticleStatus::Draft
        };

        match article::create_article(
            &data.database,
            caller.id,
            title,
            content,
            status,
            chrono::Utc::now(),
            &data.policy,
        )
        .await
        {
            Ok((created, outcome)) if created.status == ArticleStatus::Published => {
                ctx.say(format!(
                    "✅ Published article #{} '{}'. {}",
                    created.id,
                    created.title,
                    reward_note(&outcome)
                ))
                .await?;
            }
            Ok((created, _)) => {
                ctx.say(format!(
                    "📝 Saved draft #{} '{}'. Use `/article publish {}` when it's ready.",
                    created.id, created.title, created.id
                ))
                .await?;
            }
            Err(e) => return report_failure(ctx, e).await,
        }
        Ok(())
    }

    /// Publishes one of your drafts.
    #[poise::command(slash_command, rename = "publish")]
    pub async fn article_publish(
        ctx: Context<'_>,
        #[description = "Article number"] article_id: i64,
    ) -> Result<()> {
        let caller = caller_account(ctx).await?;
        let data = ctx.data();

        match article::publish_article(
            &data.database,
            article_id,
            caller.id,
            chrono::Utc::now(),
            &data.policy,
        )
        .await
        {
            Ok((published, outcome)) if outcome.granted => {
                ctx.say(format!(
                    "✅ Published '{}'! {}",
                    published.title,
                    reward_note(&outcome)
                ))
                .await?;
            }
            Ok((published, _)) => {
                ctx.say(format!("⚠️ '{}' is already published.", published.title))
                    .await?;
            }
            Err(e) => return report_failure(ctx, e).await,
        }
        Ok(())
    }

    /// Lists the most recently published articles.
    #[poise::command(slash_command, rename = "list")]
    pub async fn article_list(ctx: Context<'_>) -> Result<()> {
        let articles = article::list_published_articles(&ctx.data().database).await?;
        if articles.is_empty() {
            ctx.say("No articles have been published yet.").await?;
            return Ok(());
        }

        let mut text = String::from("**Latest articles**\n");
        for a in articles.iter().take(ARTICLES_SHOWN) {
            writeln!(&mut text, "#{} {}", a.id, a.title)?;
        }
        ctx.say(text).await?;
        Ok(())
    }

    /// Comments on a published article. Your first comment each day earns points.
    #[poise::command(slash_command)]
    pub async fn comment(
        ctx: Context<'_>,
        #[description = "Article number"] article_id: i64,
        #[description = "Your comment"] text: String,
    ) -> Result<()> {
        let caller = caller_account(ctx).await?;
        let data = ctx.data();

        match article::add_comment(
            &data.database,
            article_id,
            caller.id,
            text,
            chrono::Utc::now(),
            &data.policy,
        )
        .await
        {
            Ok((_, outcome)) if outcome.granted => {
                ctx.say(format!(
                    "💬 Comment posted. First comment today: {}",
                    reward_note(&outcome)
                ))
                .await?;
            }
            Ok(_) => {
                ctx.say("💬 Comment posted.").await?;
            }
            Err(e) => return report_failure(ctx, e).await,
        }
        Ok(())
    }

    /// Parent command for courses.
    #[poise::command(slash_command, subcommands("course_list", "course_progress"))]
    pub async fn course(ctx: Context<'_>) -> Result<()> {
        ctx.say("Course subcommands: list, progress").await?;
        Ok(())
    }

    /// Lists the active courses and how far you've got in each.
    #[poise::command(slash_command, rename = "list")]
    pub async fn course_list(ctx: Context<'_>) -> Result<()> {
        let caller = caller_account(ctx).await?;
        let db = &ctx.data().database;

        let courses = course::list_courses(db).await?;
        if courses.is_empty() {
            ctx.say("No courses are available.").await?;
            return Ok(());
        }

        let mut text = String::from("**Courses**\n");
        for c in &courses {
            let progress = course::get_progress(db, caller.id, c.id)
                .await?
                .map_or(0, |p| p.progress);
            writeln!(&mut text, "#{} {} - {progress}%", c.id, c.title)?;
        }
        ctx.say(text).await?;
        Ok(())
    }

    /// Records your progress through a course. Reaching 100% pays once.
    #[poise::command(slash_command, rename = "progress")]
    pub async fn course_progress(
        ctx: Context<'_>,
        #[description = "Course number"] course_id: i64,
        #[description = "Percent complete"]
        #[min = 0]
        #[max = 100]
        progress: i32,
    ) -> Result<()> {
        let caller = caller_account(ctx).await?;
        let data = ctx.data();

        match course::update_progress(
            &data.database,
            caller.id,
            course_id,
            progress,
            chrono::Utc::now(),
            &data.policy,
        )
        .await
        {
            Ok(update) => match update.reward {
                Some(outcome) if outcome.granted => {
                    ctx.say(format!("🎓 Course complete! {}", reward_note(&outcome)))
                        .await?;
                }
                Some(_) => {
                    ctx.say("🎓 Back at 100%. The completion reward was already paid.")
                        .await?;
                }
                None => {
                    ctx.say(format!(
                        "📈 Progress updated: {}% → {}%.",
                        update.previous, update.progress
                    ))
                    .await?;
                }
            },
            Err(e) => return report_failure(ctx, e).await,
        }
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
