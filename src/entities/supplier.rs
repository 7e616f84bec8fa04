//! Supplier entity - The business profile of a supplier user.
//!
//! Holds slow-changing configuration (delivery radius, minimum order, average
//! delivery time) and the online flag suppliers toggle from their dashboard.
//! Offline suppliers are invisible to proximity and search queries.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Supplier database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "suppliers")]
pub struct Model {
    /// Unique identifier for the supplier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user, one-to-one
    #[sea_orm(unique)]
    pub user_id: i64,
    /// Trading name shown to vendors
    pub business_name: String,
    /// Kind of business (e.g., "wholesale", "farm")
    pub business_type: Option<String>,
    /// How far the supplier is willing to deliver, in kilometers
    pub delivery_radius_km: i32,
    /// Minimum order value in rupees
    pub min_order_amount: f64,
    /// Whether the supplier is currently taking orders
    pub is_online: bool,
    /// Typical time from dispatch to delivery, in minutes
    pub avg_delivery_time_minutes: i32,
    /// When the profile was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Supplier and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each supplier profile belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// One supplier lists many products
    #[sea_orm(has_many = "super::product::Entity")]
    Products,
    /// One supplier receives many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
