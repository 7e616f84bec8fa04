//! Supplier catalog and product search.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::{get, patch, post},
};
use serde::Deserialize;

use crate::{
    api::{AppState, errors::ApiResult, params},
    core::{
        product::{self, NewProduct},
        proximity::{self, ProductWithSupplier},
    },
    entities::product::Model as ProductModel,
};

/// Routes under `/products`.
pub fn router() -> Router {
    Router::new()
        .route("/", post(create))
        .route("/search", get(search))
        .route("/category/:category", get(by_category))
        .route("/:id/stock", patch(set_stock))
        .route("/:id/availability", patch(set_availability))
}

/// Lists a new product.
pub async fn create(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<NewProduct>,
) -> ApiResult<(StatusCode, Json<ProductModel>)> {
    let created = product::create_product(&state.db, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Query string of `GET /products/search`
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Name fragment; empty matches everything
    #[serde(default)]
    pub query: String,
    /// Optional reference latitude
    pub lat: Option<String>,
    /// Optional reference longitude
    pub lon: Option<String>,
}

/// Product search by name, ranked by distance when a point is given.
pub async fn search(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<ProductWithSupplier>>> {
    let found =
        proximity::search_products(
            state.proximity.as_ref(),
            &query.query,
            params::coordinate(query.lat.as_deref()),
            params::coordinate(query.lon.as_deref()),
        )
        .await?;
    Ok(Json(found))
}

/// Optional reference point in a query string
#[derive(Debug, Deserialize)]
pub struct PointQuery {
    /// Reference latitude
    pub lat: Option<String>,
    /// Reference longitude
    pub lon: Option<String>,
}

/// Available products in one category.
pub async fn by_category(
    Extension(state): Extension<Arc<AppState>>,
    Path(category): Path<String>,
    Query(point): Query<PointQuery>,
) -> ApiResult<Json<Vec<ProductWithSupplier>>> {
    let found =
        proximity::products_by_category(
            state.proximity.as_ref(),
            &category,
            params::coordinate(point.lat.as_deref()),
            params::coordinate(point.lon.as_deref()),
        )
        .await?;
    Ok(Json(found))
}

/// Body of `PATCH /products/:id/stock`
#[derive(Debug, Deserialize)]
pub struct StockBody {
    /// New absolute stock level
    pub stock_quantity: i32,
}

/// Sets the stock level.
pub async fn set_stock(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<StockBody>,
) -> ApiResult<Json<ProductModel>> {
    Ok(Json(product::update_stock(&state.db, id, body.stock_quantity).await?))
}

/// Body of `PATCH /products/:id/availability`
#[derive(Debug, Deserialize)]
pub struct AvailabilityBody {
    /// Whether the product is offered
    pub is_available: bool,
}

/// Offers or withdraws a product.
pub async fn set_availability(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<AvailabilityBody>,
) -> ApiResult<Json<ProductModel>> {
    Ok(Json(product::set_available(&state.db, id, body.is_available).await?))
}
