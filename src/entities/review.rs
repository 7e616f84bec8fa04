//! Review entity - One party's rating of the other after a delivered order.
//!
//! A reviewer may review a given order at most once; the pair
//! (`order_id`, `reviewer_id`) is guarded by the review service.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    /// Unique identifier for the review
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Reviewed order
    pub order_id: i64,
    /// User writing the review
    pub reviewer_id: i64,
    /// User being reviewed
    pub reviewee_id: i64,
    /// Overall rating, 1 to 5
    pub rating: i32,
    /// Optional free text
    pub comment: Option<String>,
    /// Optional quality sub-rating, 1 to 5
    pub quality_rating: Option<i32>,
    /// Optional delivery sub-rating, 1 to 5
    pub delivery_rating: Option<i32>,
    /// When the review was written
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Review and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each review belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    /// The reviewing user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReviewerId",
        to = "super::user::Column::Id"
    )]
    Reviewer,
    /// The reviewed user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RevieweeId",
        to = "super::user::Column::Id"
    )]
    Reviewee,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
