//! Supplier business logic - Profiles, online status and dashboard stats.

use crate::{
    entities::{Order, Review, Supplier, order, review, supplier},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::info;

const DEFAULT_DELIVERY_RADIUS_KM: i32 = 5;
const DEFAULT_AVG_DELIVERY_TIME_MINUTES: i32 = 30;

/// Input for a supplier profile
#[derive(Debug, Clone, Deserialize)]
pub struct NewSupplierProfile {
    /// Trading name
    pub business_name: String,
    /// Kind of business
    #[serde(default)]
    pub business_type: Option<String>,
    /// Delivery radius in km, defaults to 5
    #[serde(default)]
    pub delivery_radius_km: Option<i32>,
    /// Minimum order amount, defaults to 0
    #[serde(default)]
    pub min_order_amount: Option<f64>,
    /// Average delivery time in minutes, defaults to 30
    #[serde(default)]
    pub avg_delivery_time_minutes: Option<i32>,
    /// Start online, defaults to offline
    #[serde(default)]
    pub is_online: bool,
}

/// Aggregates shown on the supplier dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierStats {
    /// Every order ever received
    pub total_orders: u64,
    /// Sum of non-cancelled order totals
    pub total_revenue: f64,
    /// Mean rating received from vendors, 0 when unrated
    pub average_rating: f64,
}

/// Creates a supplier profile for an existing user.
///
/// Generic over the connection so registration can run it inside its
/// transaction.
///
/// # Errors
/// Returns an error if the business name is blank, a numeric setting is
/// negative, or the insert fails.
pub async fn create_supplier<C>(
    db: &C,
    user_id: i64,
    profile: NewSupplierProfile,
) -> Result<supplier::Model>
where
    C: ConnectionTrait,
{
    let business_name = profile.business_name.trim();
    if business_name.is_empty() {
        return Err(Error::validation("business_name", "cannot be empty"));
    }

    let delivery_radius_km = profile
        .delivery_radius_km
        .unwrap_or(DEFAULT_DELIVERY_RADIUS_KM);
    let avg_delivery_time_minutes = profile
        .avg_delivery_time_minutes
        .unwrap_or(DEFAULT_AVG_DELIVERY_TIME_MINUTES);
    let min_order_amount = profile.min_order_amount.unwrap_or(0.0);

    if delivery_radius_km < 0 {
        return Err(Error::validation("delivery_radius_km", "cannot be negative"));
    }
    if avg_delivery_time_minutes < 0 {
        return Err(Error::validation(
            "avg_delivery_time_minutes",
            "cannot be negative",
        ));
    }
    if !min_order_amount.is_finite() || min_order_amount < 0.0 {
        return Err(Error::validation(
            "min_order_amount",
            "must be a non-negative number",
        ));
    }

    supplier::ActiveModel {
        user_id: Set(user_id),
        business_name: Set(business_name.to_string()),
        business_type: Set(profile.business_type),
        delivery_radius_km: Set(delivery_radius_km),
        min_order_amount: Set(min_order_amount),
        is_online: Set(profile.is_online),
        avg_delivery_time_minutes: Set(avg_delivery_time_minutes),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Retrieves a supplier by ID.
pub async fn get_supplier_by_id<C>(db: &C, supplier_id: i64) -> Result<Option<supplier::Model>>
where
    C: ConnectionTrait,
{
    Supplier::find_by_id(supplier_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the supplier profile of a user.
pub async fn get_supplier_by_user_id(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Option<supplier::Model>> {
    Supplier::find()
        .filter(supplier::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Sets whether a supplier is taking orders.
///
/// # Errors
/// Returns an error if the supplier does not exist or the update fails.
pub async fn set_online(
    db: &DatabaseConnection,
    supplier_id: i64,
    is_online: bool,
) -> Result<supplier::Model> {
    let mut supplier: supplier::ActiveModel = Supplier::find_by_id(supplier_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Supplier", supplier_id))?
        .into();

    supplier.is_online = Set(is_online);
    let updated = supplier.update(db).await?;
    info!(supplier_id, is_online, "Supplier status changed");
    Ok(updated)
}

/// Computes dashboard aggregates for a supplier.
///
/// # Errors
/// Returns an error if the supplier does not exist or a query fails.
pub async fn supplier_stats(db: &DatabaseConnection, supplier_id: i64) -> Result<SupplierStats> {
    let supplier = get_supplier_by_id(db, supplier_id)
        .await?
        .ok_or_else(|| Error::not_found("Supplier", supplier_id))?;

    let orders = Order::find()
        .filter(order::Column::SupplierId.eq(supplier_id))
        .all(db)
        .await?;

    let total_revenue = orders
        .iter()
        .filter(|o| o.status != order::OrderStatus::Cancelled)
        .map(|o| o.total_amount)
        .sum();

    let ratings: Vec<i32> = Review::find()
        .filter(review::Column::RevieweeId.eq(supplier.user_id))
        .all(db)
        .await?
        .into_iter()
        .map(|r| r.rating)
        .collect();

    Ok(SupplierStats {
        total_orders: orders.len() as u64,
        total_revenue,
        average_rating: average(&ratings),
    })
}

/// Mean of integer ratings, 0 for an empty slice.
#[must_use]
pub fn average(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    f64::from(ratings.iter().sum::<i32>()) / ratings.len() as f64
}
