//! Debounced search.
//!
//! Each keystroke calls [`DebouncedSearch::push`]. Only the last query typed
//! within the debounce window is sent, and only the results of the most
//! recent query are published.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use nijitter_core::SearchResults;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::NijitterApi;
use crate::error::ApiError;

/// Debounce window of the header search box.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Debounce window of the search box on profile pages.
pub const PROFILE_SEARCH_DEBOUNCE: Duration = Duration::from_millis(250);

/// Published search outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    /// Trimmed query the results belong to; empty when cleared.
    pub query: String,
    pub results: SearchResults,
}

/// Search box with debouncing.
#[derive(Debug, Clone)]
pub struct DebouncedSearch {
    api: NijitterApi,
    delay: Duration,
    generation: Arc<AtomicU64>,
    state: Arc<watch::Sender<SearchState>>,
}

impl DebouncedSearch {
    #[must_use]
    pub fn new(api: NijitterApi, delay: Duration) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            api,
            delay,
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
        }
    }

    /// Follow published results.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Latest published results.
    #[must_use]
    pub fn current(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Search immediately. A blank query returns empty results without a
    /// request.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn search_now(&self, query: &str) -> Result<SearchResults, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(SearchResults::default());
        }
        self.api.search(query).await
    }

    /// Record new input. After the debounce delay, if no newer input arrived,
    /// the query is sent (or the results cleared for blank input) and the
    /// outcome published. Must be called from within a Tokio runtime.
    pub fn push(&self, input: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let search = self.clone();
        let query = input.trim().to_owned();

        tokio::spawn(async move {
            tokio::time::sleep(search.delay).await;
            if !search.is_current(generation) {
                return;
            }

            let results = if query.is_empty() {
                SearchResults::default()
            } else {
                match search.api.search(&query).await {
                    Ok(results) => results,
                    Err(e) => {
                        warn!(error = %e, query = %query, "Search failed");
                        return;
                    }
                }
            };

            if search.is_current(generation) {
                debug!(query = %query, "Publishing search results");
                search.state.send_replace(SearchState { query, results });
            }
        });
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}
