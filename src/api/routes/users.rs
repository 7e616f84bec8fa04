//! Registration and user profiles.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

use crate::{
    api::{AppState, errors::ApiResult},
    core::{
        supplier::NewSupplierProfile,
        user::{self, NewProfile, NewUser, UserUpdate, UserWithProfile},
        vendor::NewVendorProfile,
    },
    entities::user::Model as UserModel,
    errors::Error,
};

/// Routes under `/users`.
pub fn router() -> Router {
    Router::new()
        .route("/", post(register))
        .route("/:id", get(get_user).patch(update_user))
        .route("/by-phone/:phone", get(get_by_phone))
}

/// Registration body: the user plus at most one role profile
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// User fields
    #[serde(flatten)]
    pub user: NewUser,
    /// Profile for supplier users
    #[serde(default)]
    pub supplier: Option<NewSupplierProfile>,
    /// Profile for vendor users
    #[serde(default)]
    pub vendor: Option<NewVendorProfile>,
}

/// Registers a user and their role profile.
pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserWithProfile>)> {
    let profile = match (body.supplier, body.vendor) {
        (Some(_), Some(_)) => {
            return Err(Error::validation("profile", "give either a supplier or a vendor profile"));
        }
        (Some(supplier), None) => Some(NewProfile::Supplier(supplier)),
        (None, Some(vendor)) => Some(NewProfile::Vendor(vendor)),
        (None, None) => None,
    };
    let registered = user::register_user(&state.db, body.user, profile).await?;
    Ok((StatusCode::CREATED, Json(registered)))
}

/// One user by ID.
pub async fn get_user(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserModel>> {
    user::get_user_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::not_found("User", id))
}

/// Partial profile update.
pub async fn update_user(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<UserUpdate>,
) -> ApiResult<Json<UserModel>> {
    Ok(Json(user::update_user(&state.db, id, body).await?))
}

/// A user and their profile, looked up by phone.
pub async fn get_by_phone(
    Extension(state): Extension<Arc<AppState>>,
    Path(phone): Path<String>,
) -> ApiResult<Json<UserWithProfile>> {
    user::get_user_by_phone(&state.db, &phone)
        .await?
        .map(Json)
        .ok_or_else(|| Error::not_found("User", phone))
}
