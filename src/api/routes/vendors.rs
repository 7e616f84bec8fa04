//! Vendor dashboards.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    routing::get,
};

use crate::{
    api::{AppState, errors::ApiResult},
    core::vendor::{self, VendorStats},
};

/// Routes under `/vendors`.
pub fn router() -> Router {
    Router::new().route("/:id/stats", get(stats))
}

/// Order count, spend and favorite suppliers for a vendor.
pub async fn stats(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<VendorStats>> {
    Ok(Json(vendor::vendor_stats(&state.db, id).await?))
}
