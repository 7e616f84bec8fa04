//! Supplier discovery, availability and stats.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    routing::{get, patch},
};
use serde::Deserialize;

use crate::{
    api::{AppState, errors::ApiResult, params},
    core::{
        product,
        proximity::{self, SupplierWithDistance},
        supplier::{self, SupplierStats},
    },
    entities::{product::Model as ProductModel, supplier::Model as SupplierModel},
};

/// Routes under `/suppliers`.
pub fn router() -> Router {
    Router::new()
        .route("/nearby", get(nearby))
        .route("/:id/status", patch(set_status))
        .route("/:id/stats", get(stats))
        .route("/:id/products", get(products))
}

/// Query string of `GET /suppliers/nearby`, kept as text until validated
#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    /// Reference latitude in degrees
    pub lat: Option<String>,
    /// Reference longitude in degrees
    pub lon: Option<String>,
    /// Kilometers; the configured default when absent
    pub radius: Option<String>,
}

/// Online suppliers around a point, nearest first.
pub async fn nearby(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<NearbyQuery>,
) -> ApiResult<Json<Vec<SupplierWithDistance>>> {
    let latitude = params::coordinate(query.lat.as_deref()).unwrap_or(f64::NAN);
    let longitude = params::coordinate(query.lon.as_deref()).unwrap_or(f64::NAN);
    let radius = params::radius(query.radius.as_deref())?
        .unwrap_or(state.settings.search.default_radius_km);
    let found =
        proximity::find_nearby_suppliers(state.proximity.as_ref(), latitude, longitude, radius).await?;
    Ok(Json(found))
}

/// Body of `PATCH /suppliers/:id/status`
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    /// Whether the supplier accepts orders now
    pub is_online: bool,
}

/// Toggles a supplier online or offline.
pub async fn set_status(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<StatusBody>,
) -> ApiResult<Json<SupplierModel>> {
    Ok(Json(supplier::set_online(&state.db, id, body.is_online).await?))
}

/// Order count, revenue and rating for a supplier.
pub async fn stats(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<SupplierStats>> {
    Ok(Json(supplier::supplier_stats(&state.db, id).await?))
}

/// A supplier's catalog by name.
pub async fn products(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<ProductModel>>> {
    Ok(Json(product::get_products_for_supplier(&state.db, id).await?))
}
