//! Product business logic - Listing products and managing stock.
//!
//! Suppliers set stock directly; order placement decrements it atomically in
//! [`crate::core::order::create_order`].

use crate::{
    core::supplier,
    entities::{Product, product},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Input for listing a product
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    /// Listing supplier
    pub supplier_id: i64,
    /// Product name
    pub name: String,
    /// Browsing category
    pub category: String,
    /// Selling unit
    pub unit: String,
    /// Price per unit in rupees
    pub price_per_unit: f64,
    /// Minimum order quantity, defaults to 1
    #[serde(default)]
    pub min_quantity: Option<i32>,
    /// Initial stock, defaults to 0
    #[serde(default)]
    pub stock_quantity: Option<i32>,
    /// Optional grade label
    #[serde(default)]
    pub quality_grade: Option<String>,
    /// Optional expiry
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    /// Optional image location
    #[serde(default)]
    pub image_url: Option<String>,
}

fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, "cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// Lists a new, available product for a supplier.
///
/// # Errors
/// Returns an error if:
/// - The name, category or unit is blank
/// - The price is negative or not finite (NaN, infinity)
/// - The minimum quantity is below 1 or the stock is negative
/// - The supplier does not exist
/// - The database insert fails
pub async fn create_product(db: &DatabaseConnection, input: NewProduct) -> Result<product::Model> {
    let name = required("name", &input.name)?;
    let category = required("category", &input.category)?;
    let unit = required("unit", &input.unit)?;

    if !input.price_per_unit.is_finite() || input.price_per_unit < 0.0 {
        return Err(Error::validation(
            "price_per_unit",
            "must be a non-negative number",
        ));
    }
    let min_quantity = input.min_quantity.unwrap_or(1);
    if min_quantity < 1 {
        return Err(Error::validation("min_quantity", "must be at least 1"));
    }
    let stock_quantity = input.stock_quantity.unwrap_or(0);
    if stock_quantity < 0 {
        return Err(Error::validation("stock_quantity", "cannot be negative"));
    }

    supplier::get_supplier_by_id(db, input.supplier_id)
        .await?
        .ok_or_else(|| Error::not_found("Supplier", input.supplier_id))?;

    let product = product::ActiveModel {
        supplier_id: Set(input.supplier_id),
        name: Set(name),
        category: Set(category.to_lowercase()),
        unit: Set(unit),
        price_per_unit: Set(input.price_per_unit),
        min_quantity: Set(min_quantity),
        stock_quantity: Set(stock_quantity),
        is_available: Set(true),
        quality_grade: Set(input.quality_grade),
        expiry_date: Set(input.expiry_date),
        image_url: Set(input.image_url),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}

/// Retrieves a specific product by its unique ID.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// All products of a supplier, available or not, ordered alphabetically.
pub async fn get_products_for_supplier(
    db: &DatabaseConnection,
    supplier_id: i64,
) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::SupplierId.eq(supplier_id))
        .order_by_asc(product::Column::Name)
        .order_by_asc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sets the stock level of a product.
///
/// # Errors
/// Returns an error if the quantity is negative, the product does not exist,
/// or the update fails.
pub async fn update_stock(
    db: &DatabaseConnection,
    product_id: i64,
    stock_quantity: i32,
) -> Result<product::Model> {
    if stock_quantity < 0 {
        return Err(Error::validation("stock_quantity", "cannot be negative"));
    }

    let mut product: product::ActiveModel = get_product_by_id(db, product_id)
        .await?
        .ok_or_else(|| Error::not_found("Product", product_id))?
        .into();

    product.stock_quantity = Set(stock_quantity);
    let updated = product.update(db).await?;
    info!(product_id, stock_quantity, "Product stock set");
    Ok(updated)
}

/// Marks a product as offered or withdrawn.
///
/// # Errors
/// Returns an error if the product does not exist or the update fails.
pub async fn set_available(
    db: &DatabaseConnection,
    product_id: i64,
    is_available: bool,
) -> Result<product::Model> {
    let mut product: product::ActiveModel = get_product_by_id(db, product_id)
        .await?
        .ok_or_else(|| Error::not_found("Product", product_id))?
        .into();

    product.is_available = Set(is_available);
    product.update(db).await.map_err(Into::into)
}
