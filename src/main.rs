use dotenvy::dotenv;
use std::time::Duration;
use street_supply::{
    ai::{Advisor, select_provider},
    api::{AppState, build_router},
    config::{ai::credentials_from_env, database, settings},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load settings from config.toml (defaults when absent)
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;

    // 4. Connect and create the schema
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database schema ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Pick the recommendation provider from whichever API key is set
    let provider = select_provider(credentials_from_env(), &settings.ai);
    let advisor = Advisor::new(provider, Duration::from_secs(settings.ai.timeout_secs));
    match advisor.provider_name() {
        Some(name) => info!(provider = name, "AI recommendations enabled."),
        None => info!("No AI API key configured, advisory endpoints will return fallbacks."),
    }

    // 6. Serve the API
    let bind_address = settings.server.bind_address.clone();
    let app = build_router(AppState::new(db, advisor, settings));
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", bind_address, e))?;
    info!("Listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down.");
        })
        .await?;

    Ok(())
}
