//! HTTP API - axum router over the core services.
//!
//! Handlers only extract, delegate to [`crate::core`] or [`crate::ai`] and
//! serialize. Every route lives under `/api`.

use std::sync::Arc;

use axum::{Extension, Router};
use sea_orm::DatabaseConnection;

use crate::{
    ai::Advisor,
    config::settings::Settings,
    core::proximity::{ProximityRepository, SeaOrmProximity},
};

pub mod errors;
mod params;
pub mod routes;

/// Shared handler state
pub struct AppState {
    /// Connection used by every core service
    pub db: DatabaseConnection,
    /// Geo queries for the nearby/search endpoints
    pub proximity: Arc<dyn ProximityRepository>,
    /// Advisory AI calls, degrading when no provider is configured
    pub advisor: Advisor,
    /// Loaded `config.toml` settings
    pub settings: Settings,
}

impl AppState {
    /// State backed by `db`, with proximity queries over the same connection.
    pub fn new(db: DatabaseConnection, advisor: Advisor, settings: Settings) -> Self {
        let proximity = Arc::new(SeaOrmProximity::new(db.clone()));
        Self {
            db,
            proximity,
            advisor,
            settings,
        }
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::router())
        .layer(Extension(Arc::new(state)))
}

#[cfg(test)]
mod tests;
