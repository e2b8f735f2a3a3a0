//! Admin Discord commands - the task catalog, the mall catalog, courses and order
//! fulfilment.
//!
//! Every leaf command checks the caller's role before touching anything.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, handlers::autocomplete, report_failure, require_admin},
        core::{course, item, spend, task},
        entities::{daily_task::TaskKind, redemption_order::OrderStatus},
        errors::Result,
    };
    use std::fmt::Write;

    /// Kind choices offered in the slash command UI
    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum KindChoice {
        Checkin,
        Read,
        Download,
        Learn,
    }

    impl From<KindChoice> for TaskKind {
        fn from(choice: KindChoice) -> Self {
            match choice {
                KindChoice::Checkin => Self::Checkin,
                KindChoice::Read => Self::Read,
                KindChoice::Download => Self::Download,
                KindChoice::Learn => Self::Learn,
            }
        }
    }

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum StatusChoice {
        Shipped,
        Completed,
        Cancelled,
    }

    impl From<StatusChoice> for OrderStatus {
        fn from(choice: StatusChoice) -> Self {
            match choice {
                StatusChoice::Shipped => Self::Shipped,
                StatusChoice::Completed => Self::Completed,
                StatusChoice::Cancelled => Self::Cancelled,
            }
        }
    }

    /// Parent command for administrator tools.
    #[poise::command(
        slash_command,
        subcommands("manage_task", "manage_item", "manage_course", "manage_order")
    )]
    pub async fn manage(ctx: Context<'_>) -> Result<()> {
        ctx.say("Use `/manage task`, `/manage item`, `/manage course` or `/manage order`.")
            .await?;
        Ok(())
    }

    /// Daily task catalog.
    #[poise::command(
        slash_command,
        rename = "task",
        subcommands("task_create", "task_reward", "task_disable", "task_list")
    )]
    pub async fn manage_task(ctx: Context<'_>) -> Result<()> {
        ctx.say("Task subcommands: create, reward, disable, list").await?;
        Ok(())
    }

    /// Creates a daily task.
    #[poise::command(slash_command, rename = "create")]
    pub async fn task_create(
        ctx: Context<'_>,
        #[description = "Unique task title"] title: String,
        #[description = "What kind of action this is"] kind: KindChoice,
        #[description = "Points paid per completion"] reward: i64,
    ) -> Result<()> {
        if require_admin(ctx).await?.is_none() {
            return Ok(());
        }

        match task::create_task(&ctx.data().database, title, kind.into(), reward).await {
            Ok(created) => {
                ctx.say(format!(
                    "✅ Task '{}' created, worth **{}** points.",
                    created.title, created.reward
                ))
                .await?;
            }
            Err(e) => return report_failure(ctx, e).await,
        }
        Ok(())
    }

    /// Changes a task's reward.
    #[poise::command(slash_command, rename = "reward")]
    pub async fn task_reward(
        ctx: Context<'_>,
        #[description = "Task to change"]
        #[autocomplete = "autocomplete::autocomplete_task_title"]
        title: String,
        #[description = "New reward"] reward: i64,
    ) -> Result<()> {
        if require_admin(ctx).await?.is_none() {
            return Ok(());
        }
        let db = &ctx.data().database;

        let Some(found) = task::get_task_by_title(db, &title).await? else {
            ctx.say(format!("❌ No active task named '{title}'.")).await?;
            return Ok(());
        };

        match task::update_task_reward(db, found.id, reward).await {
            Ok(updated) => {
                ctx.say(format!(
                    "✅ '{}' now pays **{}** points.",
                    updated.title, updated.reward
                ))
                .await?;
            }
            Err(e) => return report_failure(ctx, e).await,
        }
        Ok(())
    }

    /// Deactivates a task. Its completion history is kept.
    #[poise::command(slash_command, rename = "disable")]
    pub async fn task_disable(
        ctx: Context<'_>,
        #[description = "Task to disable"]
        #[autocomplete = "autocomplete::autocomplete_task_title"]
        title: String,
    ) -> Result<()> {
        if require_admin(ctx).await?.is_none() {
            return Ok(());
        }
        let db = &ctx.data().database;

        let Some(found) = task::get_task_by_title(db, &title).await? else {
            ctx.say(format!("❌ No active task named '{title}'.")).await?;
            return Ok(());
        };

        task::set_task_active(db, found.id, false).await?;
        ctx.say(format!("✅ Task '{}' disabled.", found.title))
            .await?;
        Ok(())
    }

    #[poise::command(slash_command, rename = "list")]
    pub async fn task_list(ctx: Context<'_>) -> Result<()> {
        if require_admin(ctx).await?.is_none() {
            return Ok(());
        }

        let tasks = task::get_active_tasks(&ctx.data().database).await?;
        if tasks.is_empty() {
            ctx.say("No active tasks. Use `/manage task create`.").await?;
            return Ok(());
        }

        let mut text = String::from("**Active tasks**\n");
        for t in &tasks {
            writeln!(&mut text, "• {} ({:?}) - {} points", t.title, t.kind, t.reward)?;
        }
        ctx.say(text).await?;
        Ok(())
    }

    /// Mall catalog.
    #[poise::command(
        slash_command,
        rename = "item",
        subcommands("item_add", "item_price", "item_restock", "item_disable")
    )]
    pub async fn manage_item(ctx: Context<'_>) -> Result<()> {
        ctx.say("Item subcommands: add, price, restock, disable").await?;
        Ok(())
    }

    /// Adds an item to the mall.
    #[poise::command(slash_command, rename = "add")]
    pub async fn item_add(
        ctx: Context<'_>,
        #[description = "Unique item name"] name: String,
        #[description = "Price in points"] price: i64,
        #[description = "Units available"] stock: i64,
    ) -> Result<()> {
        if require_admin(ctx).await?.is_none() {
            return Ok(());
        }

        match item::create_item(&ctx.data().database, name, price, stock).await {
            Ok(created) => {
                ctx.say(format!(
                    "✅ '{}' added at **{}** points with {} in stock.",
                    created.name, created.price, created.stock
                ))
                .await?;
            }
            Err(e) => return report_failure(ctx, e).await,
        }
        Ok(())
    }

    /// Changes an item's price. Existing orders keep what they paid.
    #[poise::command(slash_command, rename = "price")]
    pub async fn item_price(
        ctx: Context<'_>,
        #[description = "Item to change"]
        #[autocomplete = "autocomplete::autocomplete_item_name"]
        name: String,
        #[description = "New price in points"] price: i64,
    ) -> Result<()> {
        if require_admin(ctx).await?.is_none() {
            return Ok(());
        }
        let db = &ctx.data().database;

        let Some(found) = item::get_item_by_name(db, &name).await? else {
            ctx.say(format!("❌ No item named '{name}'.")).await?;
            return Ok(());
        };

        match item::update_item(db, found.id, found.name.clone(), price).await {
            Ok(updated) => {
                ctx.say(format!(
                    "✅ '{}' now costs **{}** points.",
                    updated.name, updated.price
                ))
                .await?;
            }
            Err(e) => return report_failure(ctx, e).await,
        }
        Ok(())
    }

    /// Adds stock to an item.
    #[poise::command(slash_command, rename = "restock")]
    pub async fn item_restock(
        ctx: Context<'_>,
        #[description = "Item to restock"]
        #[autocomplete = "autocomplete::autocomplete_item_name"]
        name: String,
        #[description = "Units to add"] quantity: i64,
    ) -> Result<()> {
        if require_admin(ctx).await?.is_none() {
            return Ok(());
        }
        let db = &ctx.data().database;

        let Some(found) = item::get_item_by_name(db, &name).await? else {
            ctx.say(format!("❌ No item named '{name}'.")).await?;
            return Ok(());
        };

        match item::restock_item(db, found.id, quantity).await {
            Ok(updated) => {
                ctx.say(format!("✅ '{}' now has {} in stock.", updated.name, updated.stock))
                    .await?;
            }
            Err(e) => return report_failure(ctx, e).await,
        }
        Ok(())
    }

    /// Removes an item from the mall.
    #[poise::command(slash_command, rename = "disable")]
    pub async fn item_disable(
        ctx: Context<'_>,
        #[description = "Item to disable"]
        #[autocomplete = "autocomplete::autocomplete_item_name"]
        name: String,
    ) -> Result<()> {
        if require_admin(ctx).await?.is_none() {
            return Ok(());
        }
        let db = &ctx.data().database;

        let Some(found) = item::get_item_by_name(db, &name).await? else {
            ctx.say(format!("❌ No item named '{name}'.")).await?;
            return Ok(());
        };

        item::set_item_active(db, found.id, false).await?;
        ctx.say(format!("✅ '{}' removed from the mall.", found.name))
            .await?;
        Ok(())
    }

    /// Adds a course learners can report progress on.
    #[poise::command(slash_command, rename = "course")]
    pub async fn manage_course(
        ctx: Context<'_>,
        #[description = "Course title"] title: String,
    ) -> Result<()> {
        if require_admin(ctx).await?.is_none() {
            return Ok(());
        }

        match course::create_course(&ctx.data().database, title, chrono::Utc::now()).await {
            Ok(created) => {
                ctx.say(format!("✅ Course #{} '{}' created.", created.id, created.title))
                    .await?;
            }
            Err(e) => return report_failure(ctx, e).await,
        }
        Ok(())
    }

    /// Moves an order to its next status. Cancelling refunds the points.
    #[poise::command(slash_command, rename = "order")]
    pub async fn manage_order(
        ctx: Context<'_>,
        #[description = "Order number"] order_id: i64,
        #[description = "New status"] status: StatusChoice,
    ) -> Result<()> {
        let Some(admin) = require_admin(ctx).await? else {
            return Ok(());
        };

        match spend::advance_order_status(
            &ctx.data().database,
            &admin,
            order_id,
            status.into(),
            chrono::Utc::now(),
        )
        .await
        {
            Ok(order) => {
                ctx.say(format!("✅ Order #{} is now {:?}.", order.id, order.status))
                    .await?;
            }
            Err(e) => return report_failure(ctx, e).await,
        }
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
