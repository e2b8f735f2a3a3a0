//! Article entity - Employee-authored content. Publishing earns points.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Publication state of an article
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ArticleStatus {
    /// Visible only to the author
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Visible to everyone
    #[sea_orm(string_value = "published")]
    Published,
}

/// Article database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "articles")]
pub struct Model {
    /// Unique identifier for the article
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Authoring account
    pub author_id: i64,
    /// Headline
    pub title: String,
    /// Body text
    pub content: String,
    /// Draft or published
    pub status: ArticleStatus,
    /// When the article was created
    pub created_at: DateTimeUtc,
    /// When the article was published, if it has been
    pub published_at: Option<DateTimeUtc>,
}

/// Defines relationships between Article and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One article has many comments
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
