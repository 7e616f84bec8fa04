//! Order entity - A vendor's purchase from a single supplier.
//!
//! Line items are embedded as a JSON value list rather than a child table: a
//! line is a snapshot of product, quantity and unit price at order time, not an
//! independently addressable record. `total_amount` always equals the sum of
//! the line totals and is computed by the server.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed by the vendor, awaiting the supplier
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Accepted by the supplier
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    /// Being packed
    #[sea_orm(string_value = "preparing")]
    Preparing,
    /// Dispatched to the vendor
    #[sea_orm(string_value = "out_for_delivery")]
    OutForDelivery,
    /// Received by the vendor (terminal)
    #[sea_orm(string_value = "delivered")]
    Delivered,
    /// Abandoned before dispatch (terminal)
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    /// The wire and storage name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether no further transition can leave this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of an order, priced when the order was placed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product this line refers to
    pub product_id: i64,
    /// Product name at order time
    pub product_name: String,
    /// Ordered quantity, in the product's unit
    pub quantity: i32,
    /// Product unit at order time
    pub unit: String,
    /// Unit price snapshot in rupees
    pub price_per_unit: f64,
    /// `quantity * price_per_unit`
    pub total: f64,
}

/// The embedded line item list of an order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct OrderItems(pub Vec<OrderItem>);

impl OrderItems {
    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.0.iter().map(|item| item.total).sum()
    }
}

/// Opaque references to recorded voice notes attached to an order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct VoiceNotes(pub Vec<String>);

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Ordering vendor
    pub vendor_id: i64,
    /// Fulfilling supplier
    pub supplier_id: i64,
    /// Human-facing order number, globally unique
    #[sea_orm(unique)]
    pub order_number: String,
    /// Embedded line items
    #[sea_orm(column_type = "Json")]
    pub items: OrderItems,
    /// Sum of line totals in rupees
    pub total_amount: f64,
    /// Current lifecycle status
    pub status: OrderStatus,
    /// Emergency orders carry a 30-minute delivery target
    pub is_emergency: bool,
    /// Where to deliver
    pub delivery_address: String,
    /// Delivery latitude, if known
    pub delivery_latitude: Option<f64>,
    /// Delivery longitude, if known
    pub delivery_longitude: Option<f64>,
    /// Set when the order goes out for delivery
    pub estimated_delivery_time: Option<DateTimeUtc>,
    /// Set when the order is delivered
    pub actual_delivery_time: Option<DateTimeUtc>,
    /// Attached voice note references
    #[sea_orm(column_type = "Json")]
    pub voice_notes: VoiceNotes,
    /// Free-text instructions from the vendor
    pub notes: Option<String>,
    /// When the order was placed
    pub created_at: DateTimeUtc,
    /// When the order last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order is placed by one vendor
    #[sea_orm(
        belongs_to = "super::vendor::Entity",
        from = "Column::VendorId",
        to = "super::vendor::Column::Id"
    )]
    Vendor,
    /// Each order is fulfilled by one supplier
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
    /// One order collects reviews from both parties
    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
}

impl Related<super::vendor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
