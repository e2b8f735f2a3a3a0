//! Reward configuration loading from config.toml
//!
//! Holds the default reward table, the time zone that defines a calendar-day
//! eligibility window, and catalog seeds (daily tasks and mall items) that are
//! inserted on startup when missing.

use crate::entities::daily_task::TaskKind;
use crate::errors::{Error, Result};
use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Point amounts for built-in actions
    #[serde(default)]
    pub rewards: RewardConfig,
    /// Calendar settings
    #[serde(default)]
    pub calendar: CalendarConfig,
    /// Daily tasks to seed
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
    /// Mall items to seed
    #[serde(default)]
    pub items: Vec<ItemConfig>,
}

/// Point amounts for actions that are not catalog tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Daily check-in, used when no active check-in task exists
    pub checkin: i64,
    /// First comment of the day
    pub first_comment: i64,
    /// Publishing an article
    pub article_publish: i64,
    /// Reaching 100% on a course
    pub course_complete: i64,
    /// Points per level on the presentation tier scale
    pub level_step: i64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            checkin: 10,
            first_comment: 5,
            article_publish: 20,
            course_complete: 50,
            level_step: 500,
        }
    }
}

/// Calendar settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Offset of the server's time zone from UTC, in minutes
    pub utc_offset_minutes: i32,
}

impl CalendarConfig {
    /// The configured zone as a chrono offset.
    pub fn offset(&self) -> Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| Error::Config {
                message: format!("Invalid utc_offset_minutes: {}", self.utc_offset_minutes),
            })
    }
}

/// Seed entry for a daily task
#[derive(Debug, Deserialize, Clone)]
pub struct TaskConfig {
    /// Task title, unique
    pub title: String,
    /// Task kind
    pub kind: TaskKind,
    /// Points granted on completion
    pub reward: i64,
}

/// Seed entry for a mall item
#[derive(Debug, Deserialize, Clone)]
pub struct ItemConfig {
    /// Item name, unique
    pub name: String,
    /// Price in points
    pub price: i64,
    /// Initial stock
    pub stock: i64,
}

/// Everything the reward operations need to know about configuration.
#[derive(Debug, Clone, Copy)]
pub struct Policy {
    /// Reward table
    pub rewards: RewardConfig,
    /// Time zone defining the calendar day
    pub offset: FixedOffset,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            rewards: RewardConfig::default(),
            offset: Utc.fix(),
        }
    }
}

impl RewardConfig {
    /// Rejects amounts that could never be credited.
    pub fn validate(&self) -> Result<()> {
        let amounts = [
            ("checkin", self.checkin),
            ("first_comment", self.first_comment),
            ("article_publish", self.article_publish),
            ("course_complete", self.course_complete),
            ("level_step", self.level_step),
        ];
        match amounts.iter().find(|(_, amount)| *amount <= 0) {
            Some((field, amount)) => Err(Error::Config {
                message: format!("[rewards].{field} must be positive, got {amount}"),
            }),
            None => Ok(()),
        }
    }
}

impl Config {
    /// Builds the reward policy, validating reward amounts and the calendar offset.
    pub fn policy(&self) -> Result<Policy> {
        self.rewards.validate()?;
        Ok(Policy {
            rewards: self.rewards,
            offset: self.calendar.offset()?,
        })
    }
}

/// Parses configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A task kind is unknown
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_config(&contents)
}

/// Loads configuration from `ENGAGEMENT_CONFIG` or ./config.toml.
///
/// A missing file is not an error: defaults are used and nothing is seeded.
pub fn load_default_config() -> Result<Config> {
    let path = std::env::var("ENGAGEMENT_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&path).exists() {
        load_config(&path)
    } else {
        tracing::warn!("No config file at {path}, using default rewards");
        Ok(Config::default())
    }
}
