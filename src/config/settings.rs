//! Service settings loading from config.toml
//!
//! Every section and field has a default, so a missing file or a partial file
//! is fine. Secrets (provider API keys) are deliberately absent here and come
//! from the environment instead, see [`crate::config::ai`].

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP listener settings
    pub server: ServerSettings,
    /// Proximity query defaults
    pub search: SearchSettings,
    /// Recommendation provider tuning
    pub ai: AiSettings,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address the API binds to
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

/// Proximity query defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Radius used by the nearby-suppliers endpoint when the caller gives none
    pub default_radius_km: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_radius_km: 5.0,
        }
    }
}

/// Recommendation provider tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    /// Upper bound on a single provider call
    pub timeout_secs: u64,
    /// Chat model used with the `OpenAI` provider
    pub openai_model: String,
    /// Model used with the Gemini provider
    pub gemini_model: String,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            openai_model: "gpt-4o".to_string(),
            gemini_model: "gemini-pro".to_string(),
        }
    }
}

/// Parses settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A field has the wrong type
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    debug!("Attempting to load settings from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_settings(&contents)
}

/// Loads settings from the default location (./config.toml), falling back to
/// built-in defaults when the file does not exist.
pub fn load_default_settings() -> Result<Settings> {
    let path = Path::new("config.toml");
    if path.exists() {
        load_settings(path)
    } else {
        info!("No config.toml found, using default settings");
        Ok(Settings::default())
    }
}
