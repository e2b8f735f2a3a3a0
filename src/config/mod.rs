/// Database configuration and connection management
pub mod database;

/// Reward table, calendar zone and catalog seeds from config.toml
pub mod rewards;

/// Role assignment from environment variables
pub mod users;
