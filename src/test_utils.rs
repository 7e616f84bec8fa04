//! Shared test utilities for the marketplace.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test users, profiles, products and orders with sensible
//! defaults.

use crate::{
    core::{
        geo::GeoPoint,
        order::{NewOrder, NewOrderItem},
        product::{self, NewProduct},
        supplier::NewSupplierProfile,
        user::{self, NewProfile, NewUser, UserWithProfile},
        vendor::NewVendorProfile,
    },
    entities::{self, user::UserRole},
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Karol Bagh market, Delhi. Default location for test suppliers.
pub const KAROL_BAGH: GeoPoint = GeoPoint {
    latitude: 28.6519,
    longitude: 77.1909,
};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Registration input for a vendor user without a location.
pub fn new_vendor_user(phone: &str) -> NewUser {
    NewUser {
        phone: phone.to_string(),
        email: None,
        name: "Test Vendor".to_string(),
        role: UserRole::Vendor,
        latitude: None,
        longitude: None,
        address: None,
    }
}

/// Registration input for a supplier user.
pub fn new_supplier_user(phone: &str, location: Option<GeoPoint>) -> NewUser {
    NewUser {
        phone: phone.to_string(),
        email: None,
        name: "Test Supplier".to_string(),
        role: UserRole::Supplier,
        latitude: location.map(|p| p.latitude),
        longitude: location.map(|p| p.longitude),
        address: Some("Karol Bagh Market".to_string()),
    }
}

/// Supplier profile with every optional field defaulted and offline.
pub fn supplier_profile(business_name: &str) -> NewSupplierProfile {
    NewSupplierProfile {
        business_name: business_name.to_string(),
        business_type: None,
        delivery_radius_km: None,
        min_order_amount: None,
        avg_delivery_time_minutes: None,
        is_online: false,
    }
}

/// Vendor profile with no food type or budget.
pub fn vendor_profile(stall_name: &str) -> NewVendorProfile {
    NewVendorProfile {
        stall_name: stall_name.to_string(),
        food_type: None,
        daily_budget: None,
    }
}

/// Product input with sensible defaults.
///
/// # Defaults
/// * `category`: "vegetables"
/// * `unit`: "kg"
/// * `min_quantity`, `stock_quantity`: unset (1 and 0)
pub fn new_product(supplier_id: i64, name: &str, price_per_unit: f64) -> NewProduct {
    NewProduct {
        supplier_id,
        name: name.to_string(),
        category: "vegetables".to_string(),
        unit: "kg".to_string(),
        price_per_unit,
        min_quantity: None,
        stock_quantity: None,
        quality_grade: None,
        expiry_date: None,
        image_url: None,
    }
}

/// Registers a supplier user located at `location` with a default profile.
pub async fn create_test_supplier(
    db: &DatabaseConnection,
    phone: &str,
    location: GeoPoint,
    is_online: bool,
) -> Result<UserWithProfile> {
    let mut profile = supplier_profile("Test Wholesale");
    profile.is_online = is_online;
    user::register_user(
        db,
        new_supplier_user(phone, Some(location)),
        Some(NewProfile::Supplier(profile)),
    )
    .await
}

/// Registers a vendor user with stall "Test Stall".
pub async fn create_test_vendor(db: &DatabaseConnection, phone: &str) -> Result<UserWithProfile> {
    user::register_user(
        db,
        new_vendor_user(phone),
        Some(NewProfile::Vendor(vendor_profile("Test Stall"))),
    )
    .await
}

/// Lists a product with the given price and stock.
pub async fn create_test_product(
    db: &DatabaseConnection,
    supplier_id: i64,
    name: &str,
    price_per_unit: f64,
    stock_quantity: i32,
) -> Result<entities::product::Model> {
    let mut input = new_product(supplier_id, name, price_per_unit);
    input.stock_quantity = Some(stock_quantity);
    product::create_product(db, input).await
}

/// IDs and rows of the standard marketplace fixture.
#[derive(Debug, Clone)]
pub struct Marketplace {
    pub vendor_id: i64,
    pub vendor_user_id: i64,
    pub supplier_id: i64,
    pub supplier_user_id: i64,
    /// "Onions", 30.0 per kg, 100 in stock
    pub product: entities::product::Model,
}

/// Creates a database with one vendor, one online supplier at
/// [`KAROL_BAGH`] and one product.
pub async fn setup_marketplace() -> Result<(DatabaseConnection, Marketplace)> {
    let db = setup_test_db().await?;

    let supplier = create_test_supplier(&db, "9800000001", KAROL_BAGH, true).await?;
    let vendor = create_test_vendor(&db, "9800000002").await?;

    let supplier_id = supplier
        .supplier
        .as_ref()
        .map(|s| s.id)
        .ok_or_else(|| crate::errors::Error::not_found("Supplier", supplier.user.id))?;
    let vendor_id = vendor
        .vendor
        .as_ref()
        .map(|v| v.id)
        .ok_or_else(|| crate::errors::Error::not_found("Vendor", vendor.user.id))?;

    let product = create_test_product(&db, supplier_id, "Onions", 30.0, 100).await?;

    Ok((
        db,
        Marketplace {
            vendor_id,
            vendor_user_id: vendor.user.id,
            supplier_id,
            supplier_user_id: supplier.user.id,
            product,
        },
    ))
}

/// Order input delivered to Karol Bagh market.
pub fn order_request(vendor_id: i64, supplier_id: i64, items: Vec<NewOrderItem>) -> NewOrder {
    NewOrder {
        vendor_id,
        supplier_id,
        items,
        delivery_address: "Karol Bagh Market, Stall 12".to_string(),
        delivery_latitude: None,
        delivery_longitude: None,
        is_emergency: false,
        notes: None,
        voice_notes: Vec::new(),
    }
}

/// Order line without a caller-side price.
pub const fn order_item(product_id: i64, quantity: i32) -> NewOrderItem {
    NewOrderItem {
        product_id,
        quantity,
        price_per_unit: None,
    }
}
