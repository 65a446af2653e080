//! Cursor-paginated carrot lists.
//!
//! A [`Feed`] owns the in-memory list behind a timeline, a reply thread or
//! a profile page. [`Feed::load`] replaces the list with the first page and
//! [`Feed::load_more`] appends the next one. Subscribers are called
//! synchronously with a snapshot after every state change.
//!
//! # Invariants
//!
//! - At most one fetch is in flight; the loading check-and-set happens under
//!   a single lock acquisition.
//! - `load_more` does nothing once `has_more` is false or no cursor is known.
//! - A carrot id appears at most once in the list.
//! - A response that arrives after [`Feed::set_source`] reset the feed is
//!   discarded.

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use nijitter_core::{Carrot, CarrotId, Cursor, Handle, TimelinePage};
use tracing::{debug, error};

use crate::api::NijitterApi;
use crate::error::ApiError;

// =============================================================================
// Page sources
// =============================================================================

/// Something that can fetch a page of carrots by cursor.
pub trait PageSource: Clone + Send + Sync + 'static {
    /// Fetch the page after `cursor` (the first page for `None`).
    fn fetch(
        &self,
        cursor: Option<Cursor>,
    ) -> impl Future<Output = Result<TimelinePage, ApiError>> + Send;
}

/// Which global timeline to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimelineKind {
    /// Everyone's carrots, newest first.
    #[default]
    Latest,
    /// Carrots from followed users.
    Following,
}

/// The latest or following timeline.
#[derive(Debug, Clone)]
pub struct TimelineSource {
    api: NijitterApi,
    kind: TimelineKind,
}

impl TimelineSource {
    #[must_use]
    pub const fn new(api: NijitterApi, kind: TimelineKind) -> Self {
        Self { api, kind }
    }

    #[must_use]
    pub const fn kind(&self) -> TimelineKind {
        self.kind
    }
}

impl PageSource for TimelineSource {
    async fn fetch(&self, cursor: Option<Cursor>) -> Result<TimelinePage, ApiError> {
        match self.kind {
            TimelineKind::Latest => self.api.get_timeline(cursor).await,
            TimelineKind::Following => self.api.get_following_timeline(cursor).await,
        }
    }
}

/// Replies to one carrot.
#[derive(Debug, Clone)]
pub struct RepliesSource {
    api: NijitterApi,
    parent: CarrotId,
}

impl RepliesSource {
    #[must_use]
    pub const fn new(api: NijitterApi, parent: CarrotId) -> Self {
        Self { api, parent }
    }

    #[must_use]
    pub const fn parent(&self) -> CarrotId {
        self.parent
    }
}

impl PageSource for RepliesSource {
    async fn fetch(&self, cursor: Option<Cursor>) -> Result<TimelinePage, ApiError> {
        self.api.get_replies(self.parent, cursor).await
    }
}

/// Carrots on a user's profile page.
#[derive(Debug, Clone)]
pub struct UserCarrotsSource {
    api: NijitterApi,
    handle: Handle,
}

impl UserCarrotsSource {
    #[must_use]
    pub const fn new(api: NijitterApi, handle: Handle) -> Self {
        Self { api, handle }
    }
}

impl PageSource for UserCarrotsSource {
    async fn fetch(&self, cursor: Option<Cursor>) -> Result<TimelinePage, ApiError> {
        let page = self.api.get_user(&self.handle, cursor).await?;
        Ok(TimelinePage {
            carrots: page.carrots,
            next_cursor: page.next_cursor,
        })
    }
}

// =============================================================================
// Feed state
// =============================================================================

/// Snapshot of a feed handed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedState {
    pub carrots: Vec<Carrot>,
    pub next_cursor: Option<Cursor>,
    pub is_loading: bool,
    pub has_more: bool,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            carrots: Vec::new(),
            next_cursor: None,
            is_loading: false,
            has_more: true,
        }
    }
}

impl FeedState {
    /// Whether a carrot with `id` is already in the list.
    #[must_use]
    pub fn contains(&self, id: CarrotId) -> bool {
        self.carrots.iter().any(|c| c.id == id)
    }

    /// Append the carrots of `page` that are not in the list yet.
    fn append_unseen(&mut self, carrots: Vec<Carrot>) -> usize {
        let mut seen: HashSet<CarrotId> = self.carrots.iter().map(|c| c.id).collect();
        let before = self.carrots.len();
        self.carrots
            .extend(carrots.into_iter().filter(|c| seen.insert(c.id)));
        self.carrots.len() - before
    }
}

/// Handle returned by [`Feed::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Listener = Arc<dyn Fn(&FeedState) + Send + Sync>;

struct Guarded<S> {
    source: S,
    state: FeedState,
    /// Bumped by `set_source`; responses from an older generation are dropped.
    generation: u64,
}

// =============================================================================
// Feed
// =============================================================================

/// Paginated list of carrots backed by a [`PageSource`].
pub struct Feed<S> {
    guarded: Mutex<Guarded<S>>,
    listeners: Mutex<Vec<(Subscription, Listener)>>,
    next_subscription: AtomicU64,
}

impl<S> Feed<S> {
    fn lock(&self) -> MutexGuard<'_, Guarded<S>> {
        self.guarded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for Feed<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guarded = self.lock();
        f.debug_struct("Feed")
            .field("source", &guarded.source)
            .field("state", &guarded.state)
            .finish_non_exhaustive()
    }
}

impl<S: PageSource> Feed<S> {
    /// Create an empty feed. Nothing is fetched until [`Feed::load`].
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            guarded: Mutex::new(Guarded {
                source,
                state: FeedState::default(),
                generation: 0,
            }),
            listeners: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> FeedState {
        self.lock().state.clone()
    }

    /// Current source.
    #[must_use]
    pub fn source(&self) -> S {
        self.lock().source.clone()
    }

    // =========================================================================
    // Subscribers
    // =========================================================================

    /// Register a listener called after every state change.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&FeedState) + Send + Sync + 'static,
    {
        let subscription = Subscription(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((subscription, Arc::new(listener)));
        subscription
    }

    /// Remove a listener. Returns `false` if it was already removed.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(s, _)| *s != subscription);
        listeners.len() != before
    }

    /// Call every listener with a snapshot. No lock is held during the calls,
    /// so listeners may read or mutate the feed.
    fn notify(&self) {
        let snapshot = self.state();
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Mark the feed as loading and return what the fetch needs, or `None`
    /// if the guard refuses.
    fn begin(&self, more: bool) -> Option<(S, Option<Cursor>, u64)> {
        let mut guarded = self.lock();
        let state = &guarded.state;
        if state.is_loading {
            return None;
        }
        let cursor = if more {
            if !state.has_more {
                return None;
            }
            Some(state.next_cursor?)
        } else {
            None
        };
        guarded.state.is_loading = true;
        Some((guarded.source.clone(), cursor, guarded.generation))
    }

    /// Apply a fetched page. Returns `false` if the feed was reset meanwhile.
    fn finish(&self, generation: u64, result: &Result<TimelinePage, ApiError>, more: bool) -> bool {
        let mut guarded = self.lock();
        if guarded.generation != generation {
            return false;
        }

        let state = &mut guarded.state;
        state.is_loading = false;
        if let Ok(page) = result {
            if !more {
                state.carrots.clear();
            }
            let added = state.append_unseen(page.carrots.clone());
            state.next_cursor = page.next_cursor;
            state.has_more = page.next_cursor.is_some();
            debug!(added, has_more = state.has_more, "Applied page");
        }
        true
    }

    async fn run(&self, more: bool) -> Result<bool, ApiError> {
        let Some((source, cursor, generation)) = self.begin(more) else {
            return Ok(false);
        };
        self.notify();

        let result = source.fetch(cursor).await;
        if !self.finish(generation, &result, more) {
            debug!("Discarded page for a reset feed");
            return Ok(false);
        }
        self.notify();

        if let Err(e) = &result {
            error!(error = %e, more, "Failed to load carrots");
        }
        result.map(|_| true)
    }

    /// Replace the list with the first page.
    ///
    /// Returns `Ok(false)` without fetching while another load is in flight.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the list is left unchanged.
    pub async fn load(&self) -> Result<bool, ApiError> {
        self.run(false).await
    }

    /// Append the next page.
    ///
    /// Returns `Ok(false)` without fetching while a load is in flight, when
    /// the last page has been reached, or before the first page is loaded.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the list and cursor are left unchanged.
    pub async fn load_more(&self) -> Result<bool, ApiError> {
        self.run(true).await
    }

    // =========================================================================
    // Local edits
    // =========================================================================

    fn mutate<R>(&self, f: impl FnOnce(&mut FeedState) -> R) -> R {
        let result = f(&mut self.lock().state);
        self.notify();
        result
    }

    /// Put a carrot at the top of the list (after posting it). An existing
    /// entry with the same id is moved rather than duplicated.
    pub fn prepend(&self, carrot: Carrot) {
        self.mutate(|state| {
            state.carrots.retain(|c| c.id != carrot.id);
            state.carrots.insert(0, carrot);
        });
    }

    /// Remove a carrot (after deleting it). Returns whether it was present.
    pub fn remove(&self, id: CarrotId) -> bool {
        self.mutate(|state| {
            let before = state.carrots.len();
            state.carrots.retain(|c| c.id != id);
            state.carrots.len() != before
        })
    }

    /// Edit a carrot in place (e.g. toggle its like state). Returns whether
    /// it was present.
    pub fn update(&self, id: CarrotId, edit: impl FnOnce(&mut Carrot)) -> bool {
        self.mutate(|state| {
            state.carrots.iter_mut().find(|c| c.id == id).map(edit).is_some()
        })
    }

    /// Switch to another source and reset the list, cursor and flags.
    pub fn set_source(&self, source: S) {
        {
            let mut guarded = self.lock();
            guarded.source = source;
            guarded.state = FeedState::default();
            guarded.generation += 1;
        }
        self.notify();
    }
}

// =============================================================================
// Timeline
// =============================================================================

/// The home timeline.
pub type TimelineFeed = Feed<TimelineSource>;

impl Feed<TimelineSource> {
    /// An empty timeline of the given kind.
    #[must_use]
    pub fn timeline(api: NijitterApi, kind: TimelineKind) -> Self {
        Self::new(TimelineSource::new(api, kind))
    }

    /// Which timeline is shown.
    #[must_use]
    pub fn kind(&self) -> TimelineKind {
        self.lock().source.kind
    }

    /// Switch between latest and following. Resets the list; call
    /// [`Feed::load`] afterwards.
    pub fn set_kind(&self, kind: TimelineKind) {
        let api = self.lock().source.api.clone();
        self.set_source(TimelineSource::new(api, kind));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::VecDeque;

    use chrono::Utc;
    use nijitter_core::AccountId;
    use tokio::sync::Notify;

    use super::*;

    fn carrot(id: i64) -> Carrot {
        Carrot {
            id: CarrotId::new(id),
            author_id: AccountId::new(1),
            handle: Handle::parse("usagi").unwrap(),
            username: "Usagi".to_owned(),
            icon_path: None,
            content: format!("carrot {id}"),
            reply_to: None,
            created_at: Utc::now(),
            images: Vec::new(),
            is_liked: false,
        }
    }

    fn page(ids: &[i64], next: Option<i64>) -> TimelinePage {
        TimelinePage {
            carrots: ids.iter().copied().map(carrot).collect(),
            next_cursor: next.map(Cursor::new),
        }
    }

    /// Serves queued pages and records requested cursors. With a gate, every
    /// fetch waits until the gate is notified.
    #[derive(Clone, Default)]
    struct FakeSource {
        pages: Arc<Mutex<VecDeque<Result<TimelinePage, u16>>>>,
        cursors: Arc<Mutex<Vec<Option<Cursor>>>>,
        gate: Option<Arc<Notify>>,
    }

    impl FakeSource {
        fn with_pages(pages: Vec<Result<TimelinePage, u16>>) -> Self {
            Self {
                pages: Arc::new(Mutex::new(pages.into())),
                ..Self::default()
            }
        }

        fn requested(&self) -> Vec<Option<Cursor>> {
            self.cursors.lock().unwrap().clone()
        }
    }

    impl PageSource for FakeSource {
        async fn fetch(&self, cursor: Option<Cursor>) -> Result<TimelinePage, ApiError> {
            self.cursors.lock().unwrap().push(cursor);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            let next = self.pages.lock().unwrap().pop_front();
            match next {
                Some(Ok(page)) => Ok(page),
                Some(Err(status)) => Err(ApiError::Status {
                    status,
                    message: format!("API Error: {status}"),
                }),
                None => Ok(TimelinePage::default()),
            }
        }
    }

    fn ids(state: &FeedState) -> Vec<i64> {
        state.carrots.iter().map(|c| c.id.as_i64()).collect()
    }

    #[tokio::test]
    async fn test_load_replaces_and_load_more_appends() {
        let source = FakeSource::with_pages(vec![
            Ok(page(&[3, 2], Some(2))),
            Ok(page(&[1], None)),
            Ok(page(&[9], None)),
        ]);
        let feed = Feed::new(source.clone());

        assert!(feed.load().await.unwrap());
        assert_eq!(ids(&feed.state()), vec![3, 2]);
        assert!(feed.state().has_more);

        assert!(feed.load_more().await.unwrap());
        assert_eq!(ids(&feed.state()), vec![3, 2, 1]);
        assert!(!feed.state().has_more);

        // Reload replaces the list
        assert!(feed.load().await.unwrap());
        assert_eq!(ids(&feed.state()), vec![9]);

        assert_eq!(source.requested(), vec![None, Some(Cursor::new(2)), None]);
    }

    #[tokio::test]
    async fn test_load_more_is_noop_without_more_pages() {
        let source = FakeSource::with_pages(vec![Ok(page(&[1], None))]);
        let feed = Feed::new(source.clone());

        // Before the first page there is no cursor
        assert!(!feed.load_more().await.unwrap());
        assert!(source.requested().is_empty());

        feed.load().await.unwrap();
        assert!(!feed.state().has_more);
        assert!(!feed.load_more().await.unwrap());
        assert_eq!(source.requested().len(), 1);
    }

    #[tokio::test]
    async fn test_load_more_is_noop_while_loading() {
        let gate = Arc::new(Notify::new());
        let source = FakeSource {
            gate: Some(Arc::clone(&gate)),
            ..FakeSource::with_pages(vec![Ok(page(&[2], Some(2))), Ok(page(&[1], None))])
        };
        let feed = Arc::new(Feed::new(source.clone()));

        let loading = {
            let feed = Arc::clone(&feed);
            tokio::spawn(async move { feed.load().await })
        };
        while !feed.state().is_loading {
            tokio::task::yield_now().await;
        }

        assert!(!feed.load_more().await.unwrap());
        assert!(!feed.load().await.unwrap());

        gate.notify_one();
        assert!(loading.await.unwrap().unwrap());
        assert_eq!(source.requested(), vec![None]);
        assert!(!feed.state().is_loading);
    }

    #[tokio::test]
    async fn test_pages_never_duplicate_ids() {
        let source = FakeSource::with_pages(vec![
            Ok(page(&[5, 4, 3], Some(3))),
            Ok(page(&[3, 2, 2, 1], None)),
        ]);
        let feed = Feed::new(source);

        feed.load().await.unwrap();
        feed.load_more().await.unwrap();
        assert_eq!(ids(&feed.state()), vec![5, 4, 3, 2, 1]);

        feed.prepend(carrot(3));
        assert_eq!(ids(&feed.state()), vec![3, 5, 4, 2, 1]);
    }

    #[tokio::test]
    async fn test_failed_load_more_keeps_state() {
        let source = FakeSource::with_pages(vec![Ok(page(&[2], Some(2))), Err(500)]);
        let feed = Feed::new(source);

        feed.load().await.unwrap();
        let err = feed.load_more().await.unwrap_err();
        assert_eq!(err.status(), Some(500));

        let state = feed.state();
        assert_eq!(ids(&state), vec![2]);
        assert_eq!(state.next_cursor, Some(Cursor::new(2)));
        assert!(state.has_more);
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_subscribers_see_every_mutation() {
        let source = FakeSource::with_pages(vec![Ok(page(&[1], None))]);
        let feed = Feed::new(source);
        let seen: Arc<Mutex<Vec<(bool, usize)>>> = Arc::default();

        let subscription = {
            let seen = Arc::clone(&seen);
            feed.subscribe(move |state| {
                seen.lock()
                    .unwrap()
                    .push((state.is_loading, state.carrots.len()));
            })
        };

        feed.load().await.unwrap();
        feed.prepend(carrot(7));
        assert!(feed.update(CarrotId::new(7), |c| c.is_liked = true));
        assert!(feed.remove(CarrotId::new(1)));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![(true, 0), (false, 1), (false, 2), (false, 2), (false, 1)]
        );
        assert!(feed.state().carrots[0].is_liked);

        assert!(feed.unsubscribe(subscription));
        assert!(!feed.unsubscribe(subscription));
        feed.remove(CarrotId::new(7));
        assert_eq!(seen.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_set_source_resets_and_discards_stale_page() {
        let gate = Arc::new(Notify::new());
        let stale = FakeSource {
            gate: Some(Arc::clone(&gate)),
            ..FakeSource::with_pages(vec![Ok(page(&[1], None))])
        };
        let feed = Arc::new(Feed::new(stale));

        let loading = {
            let feed = Arc::clone(&feed);
            tokio::spawn(async move { feed.load().await })
        };
        while !feed.state().is_loading {
            tokio::task::yield_now().await;
        }

        feed.set_source(FakeSource::with_pages(vec![Ok(page(&[8], None))]));
        assert_eq!(feed.state(), FeedState::default());

        gate.notify_one();
        assert!(!loading.await.unwrap().unwrap());
        assert!(feed.state().carrots.is_empty());

        feed.load().await.unwrap();
        assert_eq!(ids(&feed.state()), vec![8]);
    }
}
