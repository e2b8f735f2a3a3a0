//! Course progress entity - How far an account has got through a course.
//!
//! `completion_rewarded` flips from false to true exactly once, inside the
//! transaction that grants the completion reward.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Course progress database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "course_progress")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Learner
    pub account_id: i64,
    /// Course
    pub course_id: i64,
    /// Percent complete, 0..=100
    pub progress: i32,
    /// Whether the completion reward has been paid
    pub completion_rewarded: bool,
    /// Last progress update
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `CourseProgress` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each row belongs to one course
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
