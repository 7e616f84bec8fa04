//! Notification entity - A message addressed to one user.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category tag of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    /// Order placed or progressed
    #[sea_orm(string_value = "order")]
    Order,
    /// Order dispatched or delivered
    #[sea_orm(string_value = "delivery")]
    Delivery,
    /// Marketing message
    #[sea_orm(string_value = "promotion")]
    Promotion,
    /// Emergency order placed
    #[sea_orm(string_value = "emergency")]
    Emergency,
}

/// Notification database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    /// Unique identifier for the notification
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Recipient user
    pub user_id: i64,
    /// Short headline
    pub title: String,
    /// Body text
    pub message: String,
    /// Category tag
    pub category: NotificationCategory,
    /// Whether the recipient has read it
    pub is_read: bool,
    /// Optional structured payload (e.g., `{"order_id": 7}`)
    pub data: Option<Json>,
    /// When the notification was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Notification and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each notification belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
