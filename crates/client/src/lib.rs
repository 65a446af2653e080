//! Nijitter client library.
//!
//! Everything a front end needs to drive the Nijitter REST backend:
//!
//! - [`api::NijitterApi`] - one method per endpoint behind a single request
//!   pipeline (bearer token injection, 401/403 handling)
//! - [`feed::Feed`] - cursor pagination state with synchronous subscribers
//! - [`store`] - access token and pending-signup email persistence
//! - [`navigator::Navigator`] - hook for redirects and alerts
//! - [`compose`], [`notifications`], [`search`], [`interactions`] - the
//!   page behaviours built on top of the API
//!
//! # Example
//!
//! ```rust,ignore
//! let config = ClientConfig::from_env()?;
//! let store = Arc::new(FileStore::open(&config.credentials_path)?);
//! let api = NijitterApi::new(&config, store, Arc::new(TracingNavigator))?;
//!
//! let timeline = TimelineFeed::timeline(api.clone(), TimelineKind::Latest);
//! timeline.subscribe(|state| render(&state.carrots));
//! timeline.load().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod compose;
pub mod config;
pub mod error;
pub mod feed;
pub mod interactions;
pub mod navigator;
pub mod notifications;
pub mod search;
pub mod store;

pub use api::{NijitterApi, Upload};
pub use compose::Composer;
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use feed::{
    Feed, FeedState, PageSource, RepliesSource, Subscription, TimelineFeed, TimelineKind,
    TimelineSource, UserCarrotsSource,
};
pub use navigator::{Navigator, TracingNavigator};
pub use interactions::share_link;
pub use notifications::{NOTIFICATION_LIMIT, NotificationCenter, UNREAD_POLL_INTERVAL};
pub use search::{DebouncedSearch, PROFILE_SEARCH_DEBOUNCE, SEARCH_DEBOUNCE, SearchState};
pub use store::{CredentialStore, Credentials, FileStore, MemoryStore, StoreError};
