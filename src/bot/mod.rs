//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the points ledger, including all slash
//! commands, autocomplete handlers, bot context management and the framework runner.
//! Commands never hold business logic; they resolve the caller's account, call `core`,
//! and turn the outcome into a message.

/// Discord command implementations (points, content, mall, manage, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::rewards::Policy,
    core::{account, reward::RewardOutcome},
    entities::account::Model as AccountModel,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::info;

/// Shared data available to all bot commands.
/// This structure holds the database connection and the reward policy loaded at
/// startup.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Reward amounts and calendar zone
    pub policy: Policy,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub const fn new(database: DatabaseConnection, policy: Policy) -> Self {
        Self { database, policy }
    }
}

/// Context type passed to every command.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Resolves the invoking Discord user to an account, registering it on first use.
pub async fn caller_account(ctx: Context<'_>) -> Result<AccountModel> {
    let author = ctx.author();
    let display_name = author.global_name.as_deref().unwrap_or(&author.name);
    account::get_or_register(
        &ctx.data().database,
        &author.id.to_string(),
        display_name,
        chrono::Utc::now(),
    )
    .await
}

/// User-facing text for business rejections.
///
/// Returns `None` for infrastructure failures, which the caller reports generically and
/// propagates so they reach the framework error handler and the logs.
#[must_use]
pub fn rejection_message(error: &Error) -> Option<String> {
    let message = match error {
        Error::InsufficientBalance { current, required } => format!(
            "❌ Not enough points: you have **{current}**, this costs **{required}**."
        ),
        Error::OutOfStock { .. } => "❌ That item is out of stock.".to_string(),
        Error::ItemNotFound { .. } => "❌ That item is not available.".to_string(),
        Error::TaskNotFound { .. } => "❌ That task is not available.".to_string(),
        Error::CourseNotFound { .. } => "❌ That course is not available.".to_string(),
        Error::ArticleNotFound { .. } => "❌ That article does not exist.".to_string(),
        Error::OrderNotFound { order_id } => format!("❌ Order #{order_id} does not exist."),
        Error::AccountNotFound { .. } => "❌ That account does not exist.".to_string(),
        Error::InvalidStatusChange { from, to, .. } => {
            format!("❌ An order cannot go from {from} to {to}.")
        }
        Error::InvalidAmount { amount } => format!("❌ Invalid amount: {amount}."),
        Error::InvalidProgress { progress } => {
            format!("❌ Progress must be between 0 and 100, got {progress}.")
        }
        Error::PermissionDenied { action } => {
            format!("⛔ You don't have permission for {action}.")
        }
        Error::Config { message } => format!("❌ {message}"),
        _ => return None,
    };
    Some(message)
}

/// Trailing line describing what a reward-bearing action paid.
#[must_use]
pub fn reward_note(outcome: &RewardOutcome) -> String {
    if outcome.granted {
        format!(
            "**+{}** points. Balance: **{}**",
            outcome.amount, outcome.new_balance
        )
    } else {
        format!("No points this time. Balance: **{}**", outcome.new_balance)
    }
}

/// Replies with the rejection text, or with a generic failure and returns the error.
pub async fn report_failure(ctx: Context<'_>, error: Error) -> Result<()> {
    if let Some(message) = rejection_message(&error) {
        ctx.say(message).await?;
        return Ok(());
    }
    ctx.say("❌ Something went wrong. Please try again later.")
        .await?;
    Err(error)
}

/// Rejects the command unless the caller is an administrator.
pub async fn require_admin(ctx: Context<'_>) -> Result<Option<AccountModel>> {
    let caller = caller_account(ctx).await?;
    if caller.role.is_admin() {
        return Ok(Some(caller));
    }
    ctx.say("⛔ This command is for administrators only.")
        .await?;
    Ok(None)
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!("Error in command `{}`: {:?}", ctx.command().name, error);
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                tracing::error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Every slash command the bot registers.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::ping(),
        commands::help(),
        commands::checkin(),
        commands::tasks(),
        commands::complete_task(),
        commands::points(),
        commands::ledger(),
        commands::leaderboard(),
        commands::notifications(),
        commands::article(),
        commands::comment(),
        commands::course(),
        commands::mall(),
        commands::redeem(),
        commands::orders(),
        commands::manage(),
    ]
}

/// Builds the poise framework and runs the Discord client until it stops.
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Registered commands globally");
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot client...");
    client.start().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_errors_have_messages() {
        let msg = rejection_message(&Error::InsufficientBalance {
            current: 29,
            required: 30,
        });
        assert!(msg.is_some_and(|m| m.contains("29") && m.contains("30")));

        assert!(rejection_message(&Error::OutOfStock { item_id: 1 }).is_some());
        assert!(
            rejection_message(&Error::PermissionDenied {
                action: "updating orders".to_string()
            })
            .is_some()
        );
    }

    #[test]
    fn test_reward_note_reports_grant_or_balance() {
        let paid = RewardOutcome {
            granted: true,
            amount: 20,
            previous_balance: 5,
            new_balance: 25,
        };
        assert_eq!(reward_note(&paid), "**+20** points. Balance: **25**");

        let unpaid = RewardOutcome::not_granted(25);
        let note = reward_note(&unpaid);
        assert!(note.starts_with("No points"));
        assert!(note.contains("25"));
    }

    #[test]
    fn test_content_commands_are_registered() {
        let commands = all_commands();
        let names: Vec<&str> = commands.iter().map(|c| c.name.as_str()).collect();
        for expected in ["checkin", "article", "comment", "course", "redeem", "manage"] {
            assert!(names.contains(&expected), "missing /{expected}");
        }

        let subcommands = |parent: &str| -> Vec<String> {
            commands
                .iter()
                .find(|c| c.name == parent)
                .map(|c| c.subcommands.iter().map(|s| s.name.clone()).collect())
                .unwrap_or_default()
        };
        assert_eq!(subcommands("article"), ["write", "publish", "list"]);
        assert_eq!(subcommands("course"), ["list", "progress"]);
        assert!(subcommands("manage").contains(&"course".to_string()));
    }

    #[test]
    fn test_infrastructure_errors_are_not_user_facing() {
        let err = Error::Database(sea_orm::DbErr::Custom("disk full".to_string()));
        assert!(rejection_message(&err).is_none());
    }
}
