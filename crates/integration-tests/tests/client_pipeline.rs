//! Request pipeline behaviour: bearer auth, error mapping, redirects and
//! alerts.

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, response::IntoResponse};
use nijitter_client::{ApiError, NotificationCenter};
use nijitter_core::{Location, NotificationId};
use nijitter_integration_tests::{MockBackend, TestClient, page_json};
use serde_json::json;

fn failing(status: StatusCode, body: serde_json::Value) -> Router {
    Router::new().route(
        "/carrot/timeline",
        get(move || {
            let body = body.clone();
            async move { (status, Json(body)).into_response() }
        }),
    )
}

// =============================================================================
// Authorization
// =============================================================================

#[tokio::test]
async fn test_bearer_token_is_attached() {
    let backend = MockBackend::start(
        Router::new().route("/carrot/timeline", get(|| async { Json(page_json(&[1], None)) })),
    )
    .await;
    let client = TestClient::signed_in(&backend, "token-abc");

    client.api.get_timeline(None).await.expect("timeline");

    let requests = backend.requests_to("/carrot/timeline");
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some("Bearer token-abc")
    );
}

#[tokio::test]
async fn test_no_header_without_token() {
    let backend = MockBackend::start(
        Router::new().route("/carrot/timeline", get(|| async { Json(page_json(&[], None)) })),
    )
    .await;
    let client = TestClient::new(&backend);

    client.api.get_timeline(None).await.expect("timeline");

    assert!(backend.requests()[0].authorization.is_none());
}

#[tokio::test]
async fn test_unauthorized_clears_token_and_redirects_to_login() {
    let backend = MockBackend::start(failing(
        StatusCode::UNAUTHORIZED,
        json!({"error": "token expired"}),
    ))
    .await;
    let client = TestClient::signed_in(&backend, "stale");

    let err = client.api.get_timeline(None).await.expect_err("should fail");

    assert!(matches!(err, ApiError::Unauthorized));
    assert!(client.token().is_none());
    assert_eq!(client.navigator.navigations(), vec![Location::Login]);
}

// =============================================================================
// Forbidden
// =============================================================================

#[tokio::test]
async fn test_night_time_restriction_alerts_with_retry_after() {
    let backend = MockBackend::start(failing(
        StatusCode::FORBIDDEN,
        json!({"error": "night_time_restricted", "retry_after": "07:00"}),
    ))
    .await;
    let client = TestClient::signed_in(&backend, "token");

    let err = client.api.get_timeline(None).await.expect_err("should fail");

    match err {
        ApiError::TimeRestricted { retry_after } => assert_eq!(retry_after, "07:00"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        client.navigator.alerts(),
        vec!["Usage hours are over. Available again after 07:00.".to_string()]
    );
    assert!(client.token().is_some());
    assert!(client.navigator.navigations().is_empty());
}

#[tokio::test]
async fn test_night_time_restriction_without_retry_after() {
    let backend = MockBackend::start(failing(
        StatusCode::FORBIDDEN,
        json!({"error": "night_time_restricted"}),
    ))
    .await;
    let client = TestClient::new(&backend);

    let _ = client.api.get_timeline(None).await;

    assert_eq!(
        client.navigator.alerts(),
        vec!["Usage hours are over. Available again after the next available window.".to_string()]
    );
}

#[tokio::test]
async fn test_night_time_restriction_with_numeric_retry_after() {
    let backend = MockBackend::start(failing(
        StatusCode::FORBIDDEN,
        json!({"error": "night_time_restricted", "retry_after": 21600}),
    ))
    .await;
    let client = TestClient::signed_in(&backend, "token");

    let err = client.api.get_timeline(None).await.expect_err("should fail");

    match err {
        ApiError::TimeRestricted { retry_after } => assert_eq!(retry_after, "21600"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        client.navigator.alerts(),
        vec!["Usage hours are over. Available again after 21600.".to_string()]
    );
}

#[tokio::test]
async fn test_night_time_restriction_with_structured_details() {
    let backend = MockBackend::start(failing(
        StatusCode::FORBIDDEN,
        json!({
            "error": "night_time_restricted",
            "retry_after": "06:00",
            "details": {"opens": "06:00", "closes": "22:00"}
        }),
    ))
    .await;
    let client = TestClient::signed_in(&backend, "token");

    let err = client.api.get_timeline(None).await.expect_err("should fail");

    assert!(matches!(err, ApiError::TimeRestricted { .. }));
    assert_eq!(client.navigator.alerts().len(), 1);
}

#[tokio::test]
async fn test_other_forbidden_is_not_an_alert() {
    let backend = MockBackend::start(failing(
        StatusCode::FORBIDDEN,
        json!({"error": "not your carrot"}),
    ))
    .await;
    let client = TestClient::signed_in(&backend, "token");

    let err = client.api.get_timeline(None).await.expect_err("should fail");

    match err {
        ApiError::Forbidden { message } => assert_eq!(message.as_deref(), Some("not your carrot")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(client.navigator.alerts().is_empty());
}

// =============================================================================
// Other statuses
// =============================================================================

#[tokio::test]
async fn test_server_error_uses_body_message() {
    let backend = MockBackend::start(failing(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"error": "database unavailable"}),
    ))
    .await;
    let client = TestClient::new(&backend);

    let err = client.api.get_timeline(None).await.expect_err("should fail");

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "database unavailable");
}

#[tokio::test]
async fn test_server_error_message_survives_structured_details() {
    let backend = MockBackend::start(failing(
        StatusCode::BAD_REQUEST,
        json!({"error": "content too long", "details": {"max": 280}}),
    ))
    .await;
    let client = TestClient::new(&backend);

    let err = client.api.get_timeline(None).await.expect_err("should fail");

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.to_string(), "content too long");
}

#[tokio::test]
async fn test_server_error_without_body_message() {
    let backend = MockBackend::start(Router::new().route(
        "/carrot/timeline",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    ))
    .await;
    let client = TestClient::new(&backend);

    let err = client.api.get_timeline(None).await.expect_err("should fail");

    assert_eq!(err.to_string(), "API Error: 500");
}

#[tokio::test]
async fn test_no_content_succeeds() {
    let backend = MockBackend::start(Router::new().route(
        "/carrot/carrot/{id}",
        axum::routing::delete(|| async { StatusCode::NO_CONTENT }),
    ))
    .await;
    let client = TestClient::signed_in(&backend, "token");

    client
        .api
        .delete_carrot(nijitter_core::CarrotId::new(9))
        .await
        .expect("delete");

    let requests = backend.requests();
    assert_eq!(requests[0].method, "DELETE");
    assert_eq!(requests[0].path, "/carrot/carrot/9");
}

// =============================================================================
// Notifications
// =============================================================================

#[tokio::test]
async fn test_notifications_go_through_pipeline() {
    let backend = MockBackend::start(
        Router::new()
            .route(
                "/carrot/notifications",
                get(|| async {
                    Json(json!({"notifications": [{
                        "id": 5,
                        "actor_id": 2,
                        "actor_name": "Kame",
                        "type": "like",
                        "carrot_id": 11,
                        "is_read": false,
                        "created_at": "2024-01-01T00:00:00Z"
                    }]}))
                }),
            )
            .route(
                "/carrot/notifications/unread-count",
                get(|| async { Json(json!({"unread_count": 0})) }),
            )
            .route(
                "/carrot/notifications/{id}/read",
                put(|| async { Json(json!({"status": "ok"})) }),
            ),
    )
    .await;
    let client = TestClient::signed_in(&backend, "token");
    let center = NotificationCenter::new(client.api.clone());

    let notifications = center.list().await.expect("list");
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].id, NotificationId::new(5));

    let target = center.open(&notifications[0]).await.expect("open");
    assert_eq!(target, Some(Location::Carrot(nijitter_core::CarrotId::new(11))));

    let list = &backend.requests_to("/carrot/notifications")[0];
    assert_eq!(list.query.as_deref(), Some("limit=20"));
    assert_eq!(list.authorization.as_deref(), Some("Bearer token"));

    let read = backend.requests_to("/carrot/notifications/5/read");
    assert_eq!(read.len(), 1);
    assert_eq!(read[0].method, "PUT");
    assert_eq!(read[0].authorization.as_deref(), Some("Bearer token"));
    assert_eq!(center.unread(), 0);
}

#[tokio::test]
async fn test_mark_read_accepts_no_content() {
    let backend = MockBackend::start(
        Router::new()
            .route(
                "/carrot/notifications/{id}/read",
                put(|| async { StatusCode::NO_CONTENT }),
            )
            .route(
                "/carrot/notifications/unread-count",
                get(|| async { Json(json!({"unread_count": 2})) }),
            ),
    )
    .await;
    let client = TestClient::signed_in(&backend, "token");

    client
        .api
        .mark_notification_as_read(NotificationId::new(5))
        .await
        .expect("204 is a success");

    let center = NotificationCenter::new(client.api.clone());
    let notification: nijitter_core::Notification = serde_json::from_value(json!({
        "id": 5,
        "actor_id": 2,
        "actor_name": "Kame",
        "type": "follow",
        "carrot_id": null,
        "is_read": false,
        "created_at": "2024-01-01T00:00:00Z"
    }))
    .expect("notification fixture");

    let target = center.open(&notification).await.expect("open");

    assert_eq!(target, None);
    assert_eq!(center.unread(), 2);
    assert_eq!(backend.requests_to("/carrot/notifications/5/read").len(), 2);
}

#[tokio::test]
async fn test_unread_count_unauthorized_redirects() {
    let backend = MockBackend::start(Router::new().route(
        "/carrot/notifications/unread-count",
        get(|| async { StatusCode::UNAUTHORIZED }),
    ))
    .await;
    let client = TestClient::signed_in(&backend, "stale");
    let center = NotificationCenter::new(client.api.clone());

    let err = center.refresh_unread().await.expect_err("should fail");

    assert!(matches!(err, ApiError::Unauthorized));
    assert_eq!(client.navigator.navigations(), vec![Location::Login]);
}
