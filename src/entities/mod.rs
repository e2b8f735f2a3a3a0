//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod account;
pub mod article;
pub mod comment;
pub mod course;
pub mod course_progress;
pub mod daily_task;
pub mod ledger_entry;
pub mod notification;
pub mod redeemable_item;
pub mod redemption_order;
pub mod task_completion;

// Re-export specific types to avoid conflicts
pub use account::{Column as AccountColumn, Entity as Account, Model as AccountModel};
pub use article::{Column as ArticleColumn, Entity as Article, Model as ArticleModel};
pub use comment::{Column as CommentColumn, Entity as Comment, Model as CommentModel};
pub use course::{Column as CourseColumn, Entity as Course, Model as CourseModel};
pub use course_progress::{
    Column as CourseProgressColumn, Entity as CourseProgress, Model as CourseProgressModel,
};
pub use daily_task::{Column as DailyTaskColumn, Entity as DailyTask, Model as DailyTaskModel};
pub use ledger_entry::{
    Column as LedgerEntryColumn, Entity as LedgerEntry, Model as LedgerEntryModel,
};
pub use notification::{
    Column as NotificationColumn, Entity as Notification, Model as NotificationModel,
};
pub use redeemable_item::{
    Column as RedeemableItemColumn, Entity as RedeemableItem, Model as RedeemableItemModel,
};
pub use redemption_order::{
    Column as RedemptionOrderColumn, Entity as RedemptionOrder, Model as RedemptionOrderModel,
};
pub use task_completion::{
    Column as TaskCompletionColumn, Entity as TaskCompletion, Model as TaskCompletionModel,
};
