//! User entity - Every marketplace participant, vendor or supplier.
//!
//! A user carries identity (unique phone), an optional stored location and an
//! aggregate rating recomputed from the reviews they receive. The role decides
//! which profile (supplier or vendor) hangs off the user.

use crate::core::geo::GeoPoint;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which side of the marketplace a user is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Street-food stall operator buying raw materials
    #[sea_orm(string_value = "vendor")]
    Vendor,
    /// Merchant listing products and fulfilling orders
    #[sea_orm(string_value = "supplier")]
    Supplier,
}

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Phone number, unique across all users
    #[sea_orm(unique)]
    pub phone: String,
    /// Optional contact email
    pub email: Option<String>,
    /// Display name
    pub name: String,
    /// Vendor or supplier
    pub role: UserRole,
    /// Stored latitude in degrees, if the user shared a location
    pub latitude: Option<f64>,
    /// Stored longitude in degrees, if the user shared a location
    pub longitude: Option<f64>,
    /// Free-text address
    pub address: Option<String>,
    /// Whether the account has been verified
    pub is_verified: bool,
    /// Average of all review ratings received, 0 when unrated
    pub rating: f64,
    /// When the user registered
    pub created_at: DateTimeUtc,
    /// When the profile was last edited
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// The stored location as a point, when both coordinates are present.
    #[must_use]
    pub fn location(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A supplier user has one supplier profile
    #[sea_orm(has_one = "super::supplier::Entity")]
    Supplier,
    /// A vendor user has one vendor profile
    #[sea_orm(has_one = "super::vendor::Entity")]
    Vendor,
    /// One user has many notifications
    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::vendor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
