//! Slack OAuth state tokens.
//!
//! `/state` stores a random token with a 15 minute expiry and sends the user
//! to Slack with it; `/signup` checks and consumes it when Slack redirects
//! back.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use sqlx::MySqlPool;

use super::RepositoryError;

/// Lifetime of a state token.
pub const STATE_TTL: Duration = Duration::minutes(15);

/// Length of generated state tokens.
pub const STATE_LEN: usize = 32;

/// Outcome of checking a state token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateCheck {
    Valid,
    Unknown,
    Expired,
}

impl StateCheck {
    /// Classify a stored expiry against `now`.
    #[must_use]
    pub fn from_expiry(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match expires_at {
            None => Self::Unknown,
            Some(expires_at) if now > expires_at => Self::Expired,
            Some(_) => Self::Valid,
        }
    }
}

/// Generate a random alphanumeric state token.
#[must_use]
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LEN)
        .map(char::from)
        .collect()
}

/// Repository for `slack_verifications`.
pub struct SlackVerificationRepository<'a> {
    pool: &'a MySqlPool,
}

impl<'a> SlackVerificationRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }

    /// Store a new state token and return it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self) -> Result<String, RepositoryError> {
        let state = generate_state();
        let expires_at = Utc::now() + STATE_TTL;

        sqlx::query("INSERT INTO slack_verifications (token, expires_at) VALUES (?, ?)")
            .bind(&state)
            .bind(expires_at)
            .execute(self.pool)
            .await?;

        Ok(state)
    }

    /// Check a state token without consuming it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn check(&self, state: &str) -> Result<StateCheck, RepositoryError> {
        let expires_at: Option<DateTime<Utc>> = sqlx::query_scalar(
            "SELECT expires_at FROM slack_verifications WHERE token = ?",
        )
        .bind(state)
        .fetch_optional(self.pool)
        .await?;

        Ok(StateCheck::from_expiry(expires_at, Utc::now()))
    }

    /// Delete a state token. Deleting an unknown token is not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, state: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM slack_verifications WHERE token = ?")
            .bind(state)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
