//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `NIJITTER_API_URL` - REST backend base URL (default: `http://localhost:8080/api`)
//! - `NIJITTER_IMAGE_URL` - Image host prepended to relative image paths
//! - `NIJITTER_CREDENTIALS` - Credential file (default: `<config dir>/nijitter/credentials.json`)
//! - `NIJITTER_TIMEOUT_SECS` - HTTP request timeout in seconds (default: 30)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default REST backend used when `NIJITTER_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST backend (the `data-api-url` of the page shells).
    pub api_url: Url,
    /// Image host (the `data-image-url` of the page shells).
    pub image_url: Option<String>,
    /// Where the access token and pending signup email are persisted.
    pub credentials_path: PathBuf,
    /// Timeout applied to every HTTP request.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Configuration for `api_url` with every other field at its default.
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            image_url: None,
            credentials_path: default_credentials_path()
                .unwrap_or_else(|| PathBuf::from("nijitter-credentials.json")),
            timeout: Duration::from_secs(30),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is malformed or no credentials
    /// location can be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = Url::parse(&get_env_or_default("NIJITTER_API_URL", DEFAULT_API_URL))
            .map_err(|e| ConfigError::InvalidEnvVar("NIJITTER_API_URL".to_string(), e.to_string()))?;

        let image_url = get_optional_env("NIJITTER_IMAGE_URL");

        let credentials_path = match get_optional_env("NIJITTER_CREDENTIALS") {
            Some(path) => PathBuf::from(path),
            None => default_credentials_path()
                .ok_or_else(|| ConfigError::MissingEnvVar("NIJITTER_CREDENTIALS".to_string()))?,
        };

        let timeout = get_env_or_default("NIJITTER_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("NIJITTER_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            api_url,
            image_url,
            credentials_path,
            timeout,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn default_credentials_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("nijitter").join("credentials.json"))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = ClientConfig::new(Url::parse("http://127.0.0.1:9/api").unwrap());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.image_url.is_none());
        assert!(
            config
                .credentials_path
                .to_string_lossy()
                .ends_with("credentials.json")
        );
    }

    #[test]
    fn test_default_api_url_parses() {
        assert!(Url::parse(DEFAULT_API_URL).is_ok());
    }
}
