//! Points Discord commands - check-in, tasks, balance, ledger and leaderboard.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, caller_account, handlers::autocomplete, report_failure},
        core::{account, ledger, notification, reward, task},
        entities::ledger_entry::Direction,
        errors::Result,
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    const LEDGER_PAGE_SIZE: u64 = 10;
    const NOTIFICATIONS_SHOWN: usize = 10;

    /// Daily check-in. Pays once per calendar day.
    #[poise::command(slash_command)]
    pub async fn checkin(ctx: Context<'_>) -> Result<()> {
        let caller = caller_account(ctx).await?;
        let data = ctx.data();

        match reward::check_in(&data.database, caller.id, chrono::Utc::now(), &data.policy).await
        {
            Ok(outcome) if outcome.granted => {
                ctx.say(format!(
                    "✅ Checked in! **+{}** points. Balance: **{}**",
                    outcome.amount, outcome.new_balance
                ))
                .await?;
            }
            Ok(outcome) => {
                ctx.say(format!(
                    "⚠️ You've already checked in today. Balance: **{}**",
                    outcome.new_balance
                ))
                .await?;
            }
            Err(e) => return report_failure(ctx, e).await,
        }
        Ok(())
    }

    /// Shows today's tasks and which ones you've completed.
    #[poise::command(slash_command)]
    pub async fn tasks(ctx: Context<'_>) -> Result<()> {
        let caller = caller_account(ctx).await?;
        let data = ctx.data();

        let statuses = task::tasks_for_today(
            &data.database,
            caller.id,
            chrono::Utc::now(),
            data.policy.offset,
        )
        .await?;

        if statuses.is_empty() {
            ctx.say("No tasks are available today.").await?;
            return Ok(());
        }

        let mut text = String::from("**Today's tasks**\n");
        for status in &statuses {
            let mark = if status.completed { "✅" } else { "⬜" };
            writeln!(
                &mut text,
                "{mark} {} (+{})",
                status.task.title, status.task.reward
            )?;
        }

        ctx.say(text).await?;
        Ok(())
    }

    /// Claims a daily task.
    #[poise::command(slash_command)]
    pub async fn complete_task(
        ctx: Context<'_>,
        #[description = "Task to complete"]
        #[autocomplete = "autocomplete::autocomplete_task_title"]
        task_title: String,
    ) -> Result<()> {
        let caller = caller_account(ctx).await?;
        let data = ctx.data();

        let Some(found) = task::get_task_by_title(&data.database, &task_title).await? else {
            ctx.say(format!("❌ No active task named '{task_title}'."))
                .await?;
            return Ok(());
        };

        match reward::complete_task(
            &data.database,
            caller.id,
            found.id,
            chrono::Utc::now(),
            &data.policy,
        )
        .await
        {
            Ok(outcome) if outcome.granted => {
                ctx.say(format!(
                    "✅ Completed '{}'! **+{}** points. Balance: **{}**",
                    found.title, outcome.amount, outcome.new_balance
                ))
                .await?;
            }
            Ok(_) => {
                ctx.say(format!("⚠️ You've already completed '{}' today.", found.title))
                    .await?;
            }
            Err(e) => return report_failure(ctx, e).await,
        }
        Ok(())
    }

    /// Shows your balance and level.
    #[poise::command(slash_command)]
    pub async fn points(ctx: Context<'_>) -> Result<()> {
        let caller = caller_account(ctx).await?;
        let level = account::level_for_balance(caller.balance, ctx.data().policy.rewards.level_step);

        ctx.say(format!(
            "💰 **{}** has **{}** points (level {level}).",
            caller.display_name, caller.balance
        ))
        .await?;
        Ok(())
    }

    /// Shows your point history, newest first.
    #[poise::command(slash_command)]
    pub async fn ledger(
        ctx: Context<'_>,
        #[description = "Page number (default 1)"]
        #[min = 1]
        page: Option<u64>,
    ) -> Result<()> {
        let caller = caller_account(ctx).await?;
        let history = ledger::get_ledger(
            &ctx.data().database,
            caller.id,
            page.unwrap_or(1),
            LEDGER_PAGE_SIZE,
        )
        .await?;

        if history.entries.is_empty() {
            ctx.say("No ledger entries on this page.").await?;
            return Ok(());
        }

        let mut description = String::new();
        for entry in &history.entries {
            let sign = match entry.direction {
                Direction::Credit => '+',
                Direction::Debit => '-',
            };
            writeln!(
                &mut description,
                "`{}` **{sign}{}** {}",
                entry.created_at.format("%Y-%m-%d %H:%M"),
                entry.amount,
                entry.reason
            )?;
        }

        let pages = history.total_count.div_ceil(history.page_size).max(1);
        let embed = serenity::CreateEmbed::default()
            .title(format!("Ledger for {}", caller.display_name))
            .description(description)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "Page {} of {pages} • {} entries",
                history.page, history.total_count
            )))
            .color(0x0058_65F2);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows the accounts with the most points.
    #[poise::command(slash_command)]
    pub async fn leaderboard(
        ctx: Context<'_>,
        #[description = "How many places to show (default 10)"]
        #[min = 1]
        #[max = 25]
        limit: Option<u64>,
    ) -> Result<()> {
        let entries = account::get_leaderboard(&ctx.data().database, limit.unwrap_or(10)).await?;

        if entries.is_empty() {
            ctx.say("Nobody has earned points yet.").await?;
            return Ok(());
        }

        let mut text = String::from("🏆 **Leaderboard**\n");
        for entry in &entries {
            writeln!(
                &mut text,
                "{}. {} - {} points",
                entry.rank, entry.display_name, entry.balance
            )?;
        }

        ctx.say(text).await?;
        Ok(())
    }

    /// Shows your latest notifications and marks the ones shown as read.
    #[poise::command(slash_command)]
    pub async fn notifications(
        ctx: Context<'_>,
        #[description = "Only show unread notifications"] unread_only: Option<bool>,
    ) -> Result<()> {
        let caller = caller_account(ctx).await?;
        let db = &ctx.data().database;

        let notes =
            notification::list_notifications(db, caller.id, unread_only.unwrap_or(true)).await?;
        if notes.is_empty() {
            ctx.say("📭 No notifications.").await?;
            return Ok(());
        }

        let shown = &notes[..notes.len().min(NOTIFICATIONS_SHOWN)];
        let mut text = String::new();
        for note in shown {
            let marker = if note.is_read { "" } else { "🆕 " };
            writeln!(&mut text, "{marker}**{}** - {}", note.title, note.body)?;
        }
        if notes.len() > shown.len() {
            writeln!(
                &mut text,
                "_…and {} more. Run the command again to see them._",
                notes.len() - shown.len()
            )?;
        }

        // Only what was displayed; the rest stay unread for the next call
        let shown_ids: Vec<i64> = shown.iter().map(|n| n.id).collect();
        let marked = notification::mark_read_many(db, caller.id, &shown_ids).await?;
        tracing::debug!(account_id = caller.id, marked, "Notifications read");

        ctx.say(text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
