//! Debounced search against a mock `/search`.

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use nijitter_client::{DebouncedSearch, SearchState};
use nijitter_integration_tests::{MockBackend, TestClient, carrot_json};
use serde_json::{Value, json};
use tokio::sync::watch;

const DELAY: Duration = Duration::from_millis(50);

/// Answers every query with one carrot; `slow` takes a while.
async fn search(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let q = query.get("q").cloned().unwrap_or_default();
    if q == "slow" {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    Json(json!({"users": [], "carrots": [carrot_json(i64::try_from(q.len()).unwrap_or_default())]}))
}

async fn backend() -> MockBackend {
    MockBackend::start(Router::new().route("/search", get(search))).await
}

async fn next_state(rx: &mut watch::Receiver<SearchState>) -> SearchState {
    tokio::time::timeout(Duration::from_secs(2), rx.changed())
        .await
        .expect("results published in time")
        .expect("search still alive");
    rx.borrow_and_update().clone()
}

// =============================================================================
// Debounce
// =============================================================================

#[tokio::test]
async fn test_rapid_input_sends_one_request() {
    let backend = backend().await;
    let client = TestClient::signed_in(&backend, "token");
    let search = DebouncedSearch::new(client.api.clone(), DELAY);
    let mut rx = search.subscribe();

    search.push("a");
    search.push("ab");
    search.push(" abc ");

    let state = next_state(&mut rx).await;
    assert_eq!(state.query, "abc");
    assert_eq!(state.results.carrots.len(), 1);

    tokio::time::sleep(DELAY * 4).await;
    let requests = backend.requests_to("/search");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query.as_deref(), Some("q=abc"));
}

#[tokio::test]
async fn test_blank_input_clears_without_request() {
    let backend = backend().await;
    let client = TestClient::signed_in(&backend, "token");
    let search = DebouncedSearch::new(client.api.clone(), DELAY);
    let mut rx = search.subscribe();

    search.push("usagi");
    assert!(!next_state(&mut rx).await.results.is_empty());

    search.push("   ");
    let cleared = next_state(&mut rx).await;
    assert_eq!(cleared, SearchState::default());
    assert_eq!(backend.requests_to("/search").len(), 1);
}

#[tokio::test]
async fn test_stale_response_is_not_published() {
    let backend = backend().await;
    let client = TestClient::signed_in(&backend, "token");
    let search = DebouncedSearch::new(client.api.clone(), DELAY);
    let mut rx = search.subscribe();

    search.push("slow");
    // Let the first query leave the debounce window before typing again.
    tokio::time::sleep(DELAY * 2).await;
    search.push("fast");

    assert_eq!(next_state(&mut rx).await.query, "fast");

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(search.current().query, "fast");
    assert_eq!(backend.requests_to("/search").len(), 2);
}

// =============================================================================
// Immediate search
// =============================================================================

#[tokio::test]
async fn test_search_now_encodes_query() {
    let backend = backend().await;
    let client = TestClient::new(&backend);
    let search = DebouncedSearch::new(client.api.clone(), DELAY);

    search.search_now("  carrot cake&more ").await.expect("search");

    let requests = backend.requests_to("/search");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query.as_deref(), Some("q=carrot+cake%26more"));
}

#[tokio::test]
async fn test_search_now_blank_is_offline() {
    let backend = backend().await;
    let client = TestClient::new(&backend);
    let search = DebouncedSearch::new(client.api.clone(), DELAY);

    let results = search.search_now(" \t ").await.expect("search");

    assert!(results.is_empty());
    assert!(backend.requests().is_empty());
}
