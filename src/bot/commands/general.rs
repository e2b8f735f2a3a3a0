//! General Discord commands - ping and help.
//! These commands don't touch the database.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{bot::Context, errors::Result};

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: Context<'_>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: Context<'_>) -> Result<()> {
        let help_text = "**Points Help**\n\
        Earn points for everyday actions and spend them in the mall.\n\n\
        **Earning**\n\
        • `/checkin` - Daily check-in, once per day.\n\
        • `/tasks` - Today's tasks and which ones you've done.\n\
        • `/complete_task <task>` - Claim a daily task.\n\n\
        **Your Points**\n\
        • `/points` - Balance and level.\n\
        • `/ledger [page]` - Your point history.\n\
        • `/leaderboard [limit]` - Top balances.\n\
        • `/notifications [unread_only]` - Your in-app messages.\n\n\
        **Content**\n\
        • `/article write <title> <content> [publish]` - Write an article; publishing pays.\n\
        • `/article publish <id>` - Publish one of your drafts.\n\
        • `/article list` - Latest articles.\n\
        • `/comment <article> <text>` - Your first comment each day pays.\n\
        • `/course list` - Courses and your progress.\n\
        • `/course progress <course> <percent>` - Reaching 100% pays once.\n\n\
        **Mall**\n\
        • `/mall` - Items you can redeem.\n\
        • `/redeem <item>` - Spend points on an item.\n\
        • `/orders` - Your redemptions.\n\n\
        **Admin**\n\
        • `/manage task <subcommand>` - Create, tune and disable tasks.\n\
        • `/manage item <subcommand>` - Add, restock and disable items.\n\
        • `/manage course <title>` - Add a course.\n\
        • `/manage order <id> <status>` - Move an order along.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
