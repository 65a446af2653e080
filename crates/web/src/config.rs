//! Web server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - MySQL connection string, or all of `DBUSER`, `DBPASS`,
//!   `DBHOST` and `DBNAME`
//! - `CLIENT_ID` - Slack OAuth client ID
//! - `CLIENT_SECRET` - Slack OAuth client secret
//! - `REDIRECT_URL` - Slack OAuth redirect URI (this server's `/signup`)
//! - `TEAM_ID` - Slack workspace allowed to sign up
//! - `SLACK_URL` - Slack authorize URL; the state token is appended to it
//!
//! ## Optional
//! - `NIJITTER_WEB_HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8080)
//! - `API_URL` - REST backend exposed to pages as `data-api-url` (default: `/api`)
//! - `IMAGE_URL` - Image host exposed to pages as `data-image-url`
//! - `NIJITTER_STATIC_DIR` - Static asset root (default: ./static)
//! - `SLACK_API_URL` - Slack Web API base (default: <https://slack.com/api>)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default Slack Web API base.
pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Web server configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// MySQL connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// REST backend base URL handed to pages
    pub api_url: String,
    /// Image host handed to pages
    pub image_url: String,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Slack sign-up gate
    pub slack: SlackConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Slack OAuth configuration for the sign-up gate.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct SlackConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_url: String,
    /// Only members of this workspace may sign up.
    pub team_id: String,
    /// Authorize URL; the state token is appended verbatim.
    pub authorize_url: String,
    /// Web API base, overridable for tests.
    pub api_url: String,
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_url", &self.redirect_url)
            .field("team_id", &self.team_id)
            .field("authorize_url", &self.authorize_url)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl WebConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url()?;
        let host = get_env_or_default("NIJITTER_WEB_HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("NIJITTER_WEB_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("PORT", "8080")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;

        Ok(Self {
            database_url,
            host,
            port,
            api_url: get_env_or_default("API_URL", "/api"),
            image_url: get_env_or_default("IMAGE_URL", ""),
            static_dir: PathBuf::from(get_env_or_default("NIJITTER_STATIC_DIR", "./static")),
            slack: SlackConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl SlackConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: get_required_env("CLIENT_ID")?,
            client_secret: SecretString::from(get_required_env("CLIENT_SECRET")?),
            redirect_url: get_required_env("REDIRECT_URL")?,
            team_id: get_required_env("TEAM_ID")?,
            authorize_url: get_required_env("SLACK_URL")?,
            api_url: get_env_or_default("SLACK_API_URL", DEFAULT_SLACK_API_URL),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    get_optional_env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get `DATABASE_URL`, or build it from the `DB*` variables.
fn get_database_url() -> Result<SecretString, ConfigError> {
    if let Some(value) = get_optional_env("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }

    let url = mysql_url(
        &get_required_env("DBUSER")?,
        &get_optional_env("DBPASS").unwrap_or_default(),
        &get_required_env("DBHOST")?,
        &get_required_env("DBNAME")?,
    )?;
    Ok(SecretString::from(url))
}

/// Build a MySQL URL on port 3306, percent-encoding the credentials.
fn mysql_url(user: &str, password: &str, host: &str, database: &str) -> Result<String, ConfigError> {
    let invalid = |e: String| ConfigError::InvalidEnvVar("DBHOST".to_string(), e);

    let mut url = Url::parse(&format!("mysql://{host}:3306/{database}"))
        .map_err(|e| invalid(e.to_string()))?;
    url.set_username(user)
        .map_err(|()| invalid("cannot carry credentials".to_string()))?;
    if !password.is_empty() {
        url.set_password(Some(password))
            .map_err(|()| invalid("cannot carry credentials".to_string()))?;
    }
    Ok(url.into())
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
    fn test_mysql_url_encodes_password() {
        let url = mysql_url("nijitter", "p@ss/word", "db", "nijitter").unwrap();
        assert_eq!(url, "mysql://nijitter:p%40ss%2Fword@db:3306/nijitter");
    }

    #[test]
    fn test_mysql_url_without_password() {
        let url = mysql_url("root", "", "localhost", "app").unwrap();
        assert_eq!(url, "mysql://root@localhost:3306/app");
    }

    #[test]
    fn test_slack_config_debug_redacts_secret() {
        let slack = SlackConfig {
            client_id: "id".to_string(),
            client_secret: SecretString::from("super-secret".to_string()),
            redirect_url: "https://nijitter.example/signup".to_string(),
            team_id: "T123".to_string(),
            authorize_url: "https://slack.com/oauth/v2/authorize?state=".to_string(),
            api_url: DEFAULT_SLACK_API_URL.to_string(),
        };
        let debug = format!("{slack:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
