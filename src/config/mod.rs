/// Database configuration and connection management
pub mod database;

/// Service settings loading from config.toml
pub mod settings;

/// Recommendation provider credentials from environment variables
pub mod ai;
