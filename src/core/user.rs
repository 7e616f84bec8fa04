//! User business logic - Registration and profile management.
//!
//! Registration creates the user row and, in the same database transaction,
//! the supplier or vendor profile matching the user's role. Users are never
//! hard-deleted.

use crate::{
    core::{geo::GeoPoint, supplier, vendor},
    entities::{User, supplier as supplier_entity, user, user::UserRole, vendor as vendor_entity},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Input for registering a user
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    /// Unique phone number
    pub phone: String,
    /// Optional email
    #[serde(default)]
    pub email: Option<String>,
    /// Display name
    pub name: String,
    /// Vendor or supplier
    pub role: UserRole,
    /// Latitude, given together with longitude
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude, given together with latitude
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Free-text address
    #[serde(default)]
    pub address: Option<String>,
}

/// Role-specific profile created alongside the user
#[derive(Debug, Clone)]
pub enum NewProfile {
    /// Supplier business details
    Supplier(supplier::NewSupplierProfile),
    /// Vendor stall details
    Vendor(vendor::NewVendorProfile),
}

/// Editable profile fields; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    /// New display name
    #[serde(default)]
    pub name: Option<String>,
    /// New email
    #[serde(default)]
    pub email: Option<String>,
    /// New address
    #[serde(default)]
    pub address: Option<String>,
    /// New latitude, together with longitude
    #[serde(default)]
    pub latitude: Option<f64>,
    /// New longitude, together with latitude
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// A user with whichever profile their role carries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserWithProfile {
    /// The user row
    pub user: user::Model,
    /// Supplier profile for supplier users
    pub supplier: Option<supplier_entity::Model>,
    /// Vendor profile for vendor users
    pub vendor: Option<vendor_entity::Model>,
}

fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, "cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// Registers a user and, optionally, their role profile in one transaction.
///
/// # Errors
/// Returns an error if:
/// - The phone or name is empty, or the coordinates are invalid
/// - The phone number is already registered
/// - The profile kind does not match the role
/// - A database operation fails
#[instrument(skip(db, new_user, profile), fields(role = ?new_user.role))]
pub async fn register_user(
    db: &DatabaseConnection,
    new_user: NewUser,
    profile: Option<NewProfile>,
) -> Result<UserWithProfile> {
    let phone = required("phone", &new_user.phone)?;
    let name = required("name", &new_user.name)?;
    let location = GeoPoint::from_optional(new_user.latitude, new_user.longitude)?;

    match (&profile, new_user.role) {
        (Some(NewProfile::Supplier(_)), UserRole::Vendor) => {
            return Err(Error::validation("profile", "vendor users cannot have a supplier profile"));
        }
        (Some(NewProfile::Vendor(_)), UserRole::Supplier) => {
            return Err(Error::validation("profile", "supplier users cannot have a vendor profile"));
        }
        _ => {}
    }

    let txn = db.begin().await?;

    let existing = User::find()
        .filter(user::Column::Phone.eq(phone.as_str()))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(Error::validation("phone", "already registered"));
    }

    let now = chrono::Utc::now();
    let user = user::ActiveModel {
        phone: Set(phone),
        email: Set(new_user.email),
        name: Set(name),
        role: Set(new_user.role),
        latitude: Set(location.map(|p| p.latitude)),
        longitude: Set(location.map(|p| p.longitude)),
        address: Set(new_user.address),
        is_verified: Set(false),
        rating: Set(0.0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let (supplier, vendor) = match profile {
        Some(NewProfile::Supplier(details)) => (
            Some(supplier::create_supplier(&txn, user.id, details).await?),
            None,
        ),
        Some(NewProfile::Vendor(details)) => {
            (None, Some(vendor::create_vendor(&txn, user.id, details).await?))
        }
        None => (None, None),
    };

    txn.commit().await?;
    info!(user_id = user.id, "Registered user");

    Ok(UserWithProfile {
        user,
        supplier,
        vendor,
    })
}

/// Retrieves a user by ID.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Looks a user up by phone, together with their profile.
pub async fn get_user_by_phone(
    db: &DatabaseConnection,
    phone: &str,
) -> Result<Option<UserWithProfile>> {
    let Some(user) = User::find()
        .filter(user::Column::Phone.eq(phone.trim()))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let supplier = supplier::get_supplier_by_user_id(db, user.id).await?;
    let vendor = vendor::get_vendor_by_user_id(db, user.id).await?;

    Ok(Some(UserWithProfile {
        user,
        supplier,
        vendor,
    }))
}

/// Applies a partial profile edit and refreshes `updated_at`.
///
/// # Errors
/// Returns an error if the user does not exist, a provided name is blank,
/// the coordinates are invalid, or the update fails.
pub async fn update_user(
    db: &DatabaseConnection,
    user_id: i64,
    changes: UserUpdate,
) -> Result<user::Model> {
    let location = GeoPoint::from_optional(changes.latitude, changes.longitude)?;

    let mut user: user::ActiveModel = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("User", user_id))?
        .into();

    if let Some(name) = changes.name {
        user.name = Set(required("name", &name)?);
    }
    if let Some(email) = changes.email {
        user.email = Set(Some(email));
    }
    if let Some(address) = changes.address {
        user.address = Set(Some(address));
    }
    if let Some(point) = location {
        user.latitude = Set(Some(point.latitude));
        user.longitude = Set(Some(point.longitude));
    }
    user.updated_at = Set(chrono::Utc::now());

    user.update(db).await.map_err(Into::into)
}
