//! Advisory AI endpoints.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    routing::post,
};
use tracing::warn;

use crate::{
    ai::{
        NegotiationAdvice, NegotiationRequest, QualityCheckRequest, QualityReport,
        RecommendationRequest, Recommendations,
    },
    api::{AppState, errors::ApiResult},
    core::{geo::GeoPoint, proximity::ProductQuery},
};

/// Stored candidates handed to the model alongside a recommendation request.
const MAX_CANDIDATES: usize = 10;

/// Routes under `/ai`.
pub fn router() -> Router {
    Router::new()
        .route("/recommendations", post(recommendations))
        .route("/quality-check", post(quality_check))
        .route("/price-negotiation", post(price_negotiation))
}

/// Supplier and product suggestions from nearby stock.
pub async fn recommendations(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<RecommendationRequest>,
) -> ApiResult<Json<Recommendations>> {
    let near = GeoPoint::new(body.latitude, body.longitude)?;
    let mut candidates = state
        .proximity
        .find_products(ProductQuery {
            category: Some(body.category.clone()),
            near: Some(near),
            radius_km: Some(state.settings.search.default_radius_km),
            ..Default::default()
        })
        .await
        .unwrap_or_else(|err| {
            warn!(error = %err, "Could not load recommendation candidates");
            Vec::new()
        });
    candidates.truncate(MAX_CANDIDATES);

    Ok(Json(state.advisor.recommend(&body, &candidates).await?))
}

/// Quality score for a product photo.
pub async fn quality_check(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<QualityCheckRequest>,
) -> ApiResult<Json<QualityReport>> {
    Ok(Json(state.advisor.quality_check(&body).await?))
}

/// Negotiation advice for a price gap.
pub async fn price_negotiation(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<NegotiationRequest>,
) -> ApiResult<Json<NegotiationAdvice>> {
    Ok(Json(state.advisor.negotiate(&body).await?))
}
