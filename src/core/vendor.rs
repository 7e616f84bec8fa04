//! Vendor business logic - Stall profiles and spending stats.

use crate::{
    entities::{Order, Vendor, order, vendor},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const FAVORITE_SUPPLIER_COUNT: usize = 3;

/// Input for a vendor profile
#[derive(Debug, Clone, Deserialize)]
pub struct NewVendorProfile {
    /// Stall name
    pub stall_name: String,
    /// What the stall sells
    #[serde(default)]
    pub food_type: Option<String>,
    /// Planned daily spend
    #[serde(default)]
    pub daily_budget: Option<f64>,
}

/// Aggregates shown on the vendor dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorStats {
    /// Every order ever placed
    pub total_orders: u64,
    /// Sum of non-cancelled order totals
    pub total_spent: f64,
    /// Up to three supplier IDs ordered from most often
    pub favorite_suppliers: Vec<i64>,
}

/// Creates a vendor profile for an existing user.
///
/// # Errors
/// Returns an error if the stall name is blank, the budget is negative, or
/// the insert fails.
pub async fn create_vendor<C>(
    db: &C,
    user_id: i64,
    profile: NewVendorProfile,
) -> Result<vendor::Model>
where
    C: ConnectionTrait,
{
    let stall_name = profile.stall_name.trim();
    if stall_name.is_empty() {
        return Err(Error::validation("stall_name", "cannot be empty"));
    }
    if profile
        .daily_budget
        .is_some_and(|budget| !budget.is_finite() || budget < 0.0)
    {
        return Err(Error::validation("daily_budget", "must be a non-negative number"));
    }

    vendor::ActiveModel {
        user_id: Set(user_id),
        stall_name: Set(stall_name.to_string()),
        food_type: Set(profile.food_type),
        daily_budget: Set(profile.daily_budget),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Retrieves a vendor by ID.
pub async fn get_vendor_by_id<C>(db: &C, vendor_id: i64) -> Result<Option<vendor::Model>>
where
    C: ConnectionTrait,
{
    Vendor::find_by_id(vendor_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the vendor profile of a user.
pub async fn get_vendor_by_user_id(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Option<vendor::Model>> {
    Vendor::find()
        .filter(vendor::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Computes dashboard aggregates for a vendor.
///
/// Favorite suppliers are ranked by order count, ties going to the lower
/// supplier ID.
///
/// # Errors
/// Returns an error if the vendor does not exist or a query fails.
pub async fn vendor_stats(db: &DatabaseConnection, vendor_id: i64) -> Result<VendorStats> {
    get_vendor_by_id(db, vendor_id)
        .await?
        .ok_or_else(|| Error::not_found("Vendor", vendor_id))?;

    let orders = Order::find()
        .filter(order::Column::VendorId.eq(vendor_id))
        .all(db)
        .await?;

    let total_spent = orders
        .iter()
        .filter(|o| o.status != order::OrderStatus::Cancelled)
        .map(|o| o.total_amount)
        .sum();

    let mut counts: HashMap<i64, usize> = HashMap::new();
    for o in &orders {
        *counts.entry(o.supplier_id).or_default() += 1;
    }
    let mut ranked: Vec<(i64, usize)> = counts.into_iter().collect();
    ranked.sort_by(|(a_id, a_n), (b_id, b_n)| b_n.cmp(a_n).then(a_id.cmp(b_id)));

    Ok(VendorStats {
        total_orders: orders.len() as u64,
        total_spent,
        favorite_suppliers: ranked
            .into_iter()
            .take(FAVORITE_SUPPLIER_COUNT)
            .map(|(id, _)| id)
            .collect(),
    })
}
