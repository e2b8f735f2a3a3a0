//! Core business logic - framework-agnostic ledger, reward and catalog operations.
//!
//! Every function takes a database connection (or a transaction, where the operation
//! has to join a caller's atomic unit) plus an explicit `now`, so the bot layer and the
//! tests drive the same code paths.

/// Account registration, lookup, leaderboard and tier levels
pub mod account;
/// Articles and comments, the sources of publish and first-comment rewards
pub mod article;
/// Courses and learner progress, the source of the one-shot completion reward
pub mod course;
/// Read-only "already claimed?" checks per action and window
pub mod eligibility;
/// Mall catalog of redeemable items
pub mod item;
/// Balance store and append-only ledger access
pub mod ledger;
/// In-app notification list
pub mod notification;
/// Reward issuance: the atomic claim + ledger + balance unit
pub mod reward;
/// Spend authorization: the atomic order + debit + stock unit
pub mod spend;
/// Daily task catalog
pub mod task;
