//! Vendor entity - The stall profile of a vendor user.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Vendor database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vendors")]
pub struct Model {
    /// Unique identifier for the vendor
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user, one-to-one
    #[sea_orm(unique)]
    pub user_id: i64,
    /// Name of the food stall
    pub stall_name: String,
    /// What the stall sells (e.g., "chaat", "dosa")
    pub food_type: Option<String>,
    /// Planned daily spend on raw materials, in rupees
    pub daily_budget: Option<f64>,
    /// When the profile was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Vendor and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each vendor profile belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// One vendor places many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
