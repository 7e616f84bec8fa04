//! Product entity - A raw material listed by exactly one supplier.
//!
//! Stock is adjusted manually by the supplier and decremented atomically when
//! an order is placed. Unavailable products never show up in search.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the supplier listing this product
    pub supplier_id: i64,
    /// Name of the product (e.g., "Onions", "Paneer")
    pub name: String,
    /// Category used for browsing (e.g., "vegetables", "dairy")
    pub category: String,
    /// Selling unit (e.g., "kg", "litre", "dozen")
    pub unit: String,
    /// Price per unit in rupees
    pub price_per_unit: f64,
    /// Smallest quantity a vendor may order
    pub min_quantity: i32,
    /// Units currently in stock
    pub stock_quantity: i32,
    /// Whether the supplier is currently offering this product
    pub is_available: bool,
    /// Optional grade label (e.g., "A", "premium")
    pub quality_grade: Option<String>,
    /// Optional expiry for perishables
    pub expiry_date: Option<DateTimeUtc>,
    /// Optional product image location
    pub image_url: Option<String>,
    /// When the product was listed
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product belongs to one supplier
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
