//! Slack OAuth code exchange for the sign-up gate.
//!
//! Only members of the configured Slack workspace may create an account.
//! After the user authorizes the app, Slack redirects to `/signup` with a
//! `code`, which is exchanged at `oauth.v2.access`; the workspace id in the
//! response must match `TEAM_ID`.

use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::SlackConfig;

/// Errors that can occur when verifying a Slack sign-up.
#[derive(Debug, Error)]
pub enum SlackError {
    /// HTTP request failed.
    #[error("Slack request failed: {0}")]
    Request(String),

    /// Failed to parse response.
    #[error("Slack response error: {0}")]
    Response(String),

    /// The user belongs to another workspace.
    #[error("Slack team mismatch: {0:?}")]
    TeamMismatch(Option<String>),
}

#[derive(Debug, Deserialize)]
struct AccessResponse {
    #[serde(default)]
    ok: Option<bool>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    team: Option<Team>,
}

#[derive(Debug, Deserialize)]
struct Team {
    id: String,
}

/// Slack OAuth client.
#[derive(Clone)]
pub struct SlackClient {
    client: Client,
    config: SlackConfig,
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SlackClient {
    /// Create a new Slack client.
    #[must_use]
    pub fn new(config: SlackConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Where `/state` sends the user: the authorize URL followed by `state`.
    #[must_use]
    pub fn authorize_url(&self, state: &str) -> String {
        format!("{}{state}", self.config.authorize_url)
    }

    /// Exchange an OAuth `code` and check the user's workspace.
    ///
    /// # Errors
    ///
    /// Returns `SlackError::Request` or `SlackError::Response` if Slack
    /// cannot be reached or answers with something unreadable, and
    /// `SlackError::TeamMismatch` if the workspace is not the allowed one.
    #[instrument(skip_all)]
    pub async fn verify_member(&self, code: &str) -> Result<(), SlackError> {
        let response = self
            .client
            .post(format!("{}/oauth.v2.access", self.config.api_url))
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.expose_secret()),
                ("redirect_uri", self.config.redirect_url.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SlackError::Request(e.to_string()))?;

        let body: AccessResponse = response
            .json()
            .await
            .map_err(|e| SlackError::Response(e.to_string()))?;

        if body.ok == Some(false) {
            warn!(error = ?body.error, "Slack refused the OAuth code");
        }

        let team = body.team.map(|t| t.id);
        if team.as_deref() != Some(self.config.team_id.as_str()) {
            return Err(SlackError::TeamMismatch(team));
        }

        debug!("Slack workspace verified");
        Ok(())
    }
}
