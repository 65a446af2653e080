//! Database operations for the page-shell server (MySQL).
//!
//! The schema is owned by the REST backend; this server only reads
//! profiles and manages Slack sign-up state tokens.
//!
//! ## Tables
//!
//! - `users` - Profile data rendered into `/user/{id}`
//! - `slack_verifications` - One-shot OAuth state tokens with an expiry

pub mod slack_verifications;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;
use thiserror::Error;

pub use slack_verifications::{SlackVerificationRepository, StateCheck};
pub use users::{ProfileRow, UserRepository};

/// Connection attempts made before giving up at startup.
pub const CONNECT_ATTEMPTS: u32 = 10;

/// Pause between connection attempts.
pub const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

fn pool_options() -> MySqlPoolOptions {
    MySqlPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
}

/// Create a MySQL connection pool, retrying while the database comes up.
///
/// # Arguments
///
/// * `database_url` - MySQL connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns the last `sqlx::Error` once every attempt has failed.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<MySqlPool, sqlx::Error> {
    let mut attempt = 1;
    loop {
        match pool_options().connect(database_url.expose_secret()).await {
            Ok(pool) => return Ok(pool),
            Err(e) if attempt < CONNECT_ATTEMPTS => {
                tracing::warn!(attempt, error = %e, "Database not reachable, retrying");
                attempt += 1;
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Create a pool that connects on first use.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL cannot be parsed.
pub fn create_lazy_pool(database_url: &secrecy::SecretString) -> Result<MySqlPool, sqlx::Error> {
    pool_options().connect_lazy(database_url.expose_secret())
}
