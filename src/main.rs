#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use engagement_points::{
    bot::{self, BotData},
    config::{database, rewards},
    core::{item, task},
    errors::{Error, Result},
};
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Reward table, calendar zone and catalog seeds
    let config = rewards::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {e}"))?;
    let policy = config.policy()?;
    info!(
        utc_offset_minutes = config.calendar.utc_offset_minutes,
        "Loaded reward configuration"
    );

    // 4. Database
    std::fs::create_dir_all("data").map_err(|e| Error::Config {
        message: format!("Cannot create data directory: {e}"),
    })?;
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db).await?;
    info!("Database initialized successfully.");

    // 5. Seed catalogs; existing rows are left alone
    task::seed_tasks(&db, &config.tasks).await?;
    item::seed_items(&db, &config.items).await?;

    // 6. Run the bot
    // DISCORD_BOT_TOKEN is loaded here, directly before use
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))?;

    bot::run_bot(token, BotData::new(db, policy)).await
}
