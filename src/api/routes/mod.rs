//! Route table for `/api`.

use axum::{Json, Router, extract::Extension, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;

use super::AppState;

pub mod ai;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod suppliers;
pub mod users;
pub mod vendors;

/// Router for everything under `/api`.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/users", users::router())
        .nest("/suppliers", suppliers::router())
        .nest("/vendors", vendors::router())
        .nest("/products", products::router())
        .nest("/orders", orders::router())
        .nest("/reviews", reviews::router())
        .nest("/notifications", notifications::router())
        .nest("/ai", ai::router())
}

/// Liveness plus the active AI provider, if any.
pub async fn health(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "ai_provider": state.advisor.provider_name(),
    }))
}
