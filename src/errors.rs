//! Unified error types for the points ledger.
//!
//! Business-rule rejections (missing rows, stock, balance) are distinct variants so
//! callers can turn them into user-facing messages. `Database` carries infrastructure
//! failures and is surfaced as a generic server error.

use thiserror::Error;

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration or input that failed validation
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong
        message: String,
    },

    /// Storage failure: connection loss, unexpected constraint violation, etc.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// No account with this id
    #[error("Account {account_id} not found")]
    AccountNotFound {
        /// Requested account id
        account_id: i64,
    },

    /// No daily task with this id, or it is inactive
    #[error("Task {task_id} not found")]
    TaskNotFound {
        /// Requested task id
        task_id: i64,
    },

    /// No course with this id
    #[error("Course {course_id} not found")]
    CourseNotFound {
        /// Requested course id
        course_id: i64,
    },

    /// No article with this id
    #[error("Article {article_id} not found")]
    ArticleNotFound {
        /// Requested article id
        article_id: i64,
    },

    /// No redeemable item with this id, or it is inactive
    #[error("Item {item_id} not found")]
    ItemNotFound {
        /// Requested item id
        item_id: i64,
    },

    /// No redemption order with this id
    #[error("Order {order_id} not found")]
    OrderNotFound {
        /// Requested order id
        order_id: i64,
    },

    /// Order status change not allowed from its current status
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidStatusChange {
        /// Order id
        order_id: i64,
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    /// Item has no stock left
    #[error("Item {item_id} is out of stock")]
    OutOfStock {
        /// Item id
        item_id: i64,
    },

    /// Account balance is below the required amount
    #[error("Insufficient balance: have {current} points, need {required}")]
    InsufficientBalance {
        /// Balance at the time of the check
        current: i64,
        /// Points required
        required: i64,
    },

    /// Point amounts must be positive (stock: non-negative)
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// Offending amount
        amount: i64,
    },

    /// Course progress must be within 0..=100
    #[error("Invalid progress: {progress}")]
    InvalidProgress {
        /// Offending progress value
        progress: i32,
    },

    /// Caller lacks the role required for an admin operation
    #[error("Permission denied: {action} requires an admin role")]
    PermissionDenied {
        /// The attempted operation
        action: String,
    },

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),

    /// Formatting into a message buffer failed
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Integer conversion out of range
    #[error("Integer conversion error: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
