//! Order placement, lookup and status changes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, patch, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    api::{AppState, errors::ApiResult},
    core::{
        order::{self, NewOrder, OrderWithDetails},
        order_status,
    },
    entities::order::{Model as OrderModel, OrderStatus},
    errors::Error,
};

/// Routes under `/orders`.
pub fn router() -> Router {
    Router::new()
        .route("/", post(create))
        .route("/emergency", get(emergency))
        .route("/vendor/:vendor_id", get(for_vendor))
        .route("/supplier/:supplier_id", get(for_supplier))
        .route("/:id", get(get_order))
        .route("/:id/status", patch(update_status))
}

/// An order row with its derived SLA state
#[derive(Debug, Serialize)]
pub struct OrderView {
    /// The stored order
    #[serde(flatten)]
    pub order: OrderModel,
    /// Emergency order still open after the 30 minute SLA
    pub overdue: bool,
}

impl From<OrderModel> for OrderView {
    fn from(order: OrderModel) -> Self {
        let overdue = order_status::is_overdue(&order, Utc::now());
        Self { order, overdue }
    }
}

/// Places an order.
pub async fn create(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<NewOrder>,
) -> ApiResult<(StatusCode, Json<OrderView>)> {
    let created = order::create_order(&state.db, body).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// One order with vendor and supplier details.
pub async fn get_order(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<OrderWithDetails>> {
    order::get_order_with_details(&state.db, id)
        .await?
        .map(Json)
        .ok_or(Error::OrderNotFound { id })
}

/// A vendor's orders, newest first.
pub async fn for_vendor(
    Extension(state): Extension<Arc<AppState>>,
    Path(vendor_id): Path<i64>,
) -> ApiResult<Json<Vec<OrderWithDetails>>> {
    Ok(Json(order::get_orders_for_vendor(&state.db, vendor_id).await?))
}

/// A supplier's orders, newest first.
pub async fn for_supplier(
    Extension(state): Extension<Arc<AppState>>,
    Path(supplier_id): Path<i64>,
) -> ApiResult<Json<Vec<OrderWithDetails>>> {
    Ok(Json(order::get_orders_for_supplier(&state.db, supplier_id).await?))
}

/// Open emergency orders, oldest first.
pub async fn emergency(
    Extension(state): Extension<Arc<AppState>>,
) -> ApiResult<Json<Vec<OrderWithDetails>>> {
    Ok(Json(order::get_emergency_orders(&state.db).await?))
}

/// Body of `PATCH /orders/:id/status`
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    /// Requested next status
    pub status: OrderStatus,
}

/// Moves an order to its next status.
pub async fn update_status(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<StatusBody>,
) -> ApiResult<Json<OrderView>> {
    let updated = order::update_order_status(&state.db, id, body.status).await?;
    Ok(Json(updated.into()))
}
