//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Article, comment and course commands
pub mod content;

/// General utility commands
pub mod general;

/// Admin catalog and order management commands
pub mod manage;

/// Mall browsing and redemption commands
pub mod mall;

/// Earning and balance commands
pub mod points;

// Export commands
pub use content::*;
pub use general::*;
pub use mall::*;
pub use manage::*;
pub use points::*;
