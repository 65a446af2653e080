//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::MySqlPool;

use crate::config::WebConfig;
use crate::db::ProfileRow;
use crate::slack::SlackClient;

/// How long a profile lookup is served from memory.
pub const PROFILE_CACHE_TTL: Duration = Duration::from_secs(60);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    pool: MySqlPool,
    slack: SlackClient,
    profiles: Cache<String, ProfileRow>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: WebConfig, pool: MySqlPool) -> Self {
        let slack = SlackClient::new(config.slack.clone());
        let profiles = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(PROFILE_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                slack,
                profiles,
            }),
        }
    }

    /// Get a reference to the web configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &MySqlPool {
        &self.inner.pool
    }

    /// Get a reference to the Slack OAuth client.
    #[must_use]
    pub fn slack(&self) -> &SlackClient {
        &self.inner.slack
    }

    /// Recently looked-up profiles, keyed by handle.
    #[must_use]
    pub fn profiles(&self) -> &Cache<String, ProfileRow> {
        &self.inner.profiles
    }
}
