//! Posting carrots and the like, follow and profile interactions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use nijitter_client::{ApiError, Composer, Upload};
use nijitter_core::{CarrotId, DraftError, Handle, ProfileUpdate, UserProfile};
use nijitter_integration_tests::{MockBackend, TestClient, carrot_json, user_json};
use serde_json::json;

fn posting_backend() -> Router {
    Router::new()
        .route(
            "/carrot/image",
            post(|| async { Json(json!({"image_ids": ["img-a", "img-b"]})) }),
        )
        .route("/carrot/carrot", post(|| async { Json(carrot_json(100)) }))
}

fn png(name: &str) -> Upload {
    Upload::new(name, "image/png", vec![0x89, b'P', b'N', b'G'])
}

// =============================================================================
// Composer
// =============================================================================

#[tokio::test]
async fn test_post_without_images() {
    let backend = MockBackend::start(posting_backend()).await;
    let client = TestClient::signed_in(&backend, "token");

    let carrot = Composer::new(client.api.clone())
        .submit("hello carrots", Vec::new())
        .await
        .expect("post");

    assert_eq!(carrot.id, CarrotId::new(100));
    assert!(backend.requests_to("/carrot/image").is_empty());
    assert_eq!(
        backend.requests_to("/carrot/carrot")[0].json(),
        json!({"content": "hello carrots"})
    );
}

#[tokio::test]
async fn test_images_are_uploaded_before_the_post() {
    let backend = MockBackend::start(posting_backend()).await;
    let client = TestClient::signed_in(&backend, "token");

    Composer::reply(client.api.clone(), CarrotId::new(7))
        .submit("with pictures", vec![png("a.png"), png("b.png")])
        .await
        .expect("post");

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].path, "/carrot/image");
    assert!(
        requests[0]
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("multipart/form-data"))
    );
    let upload = requests[0].text();
    assert_eq!(upload.matches("name=\"images\"").count(), 2);

    assert_eq!(requests[1].path, "/carrot/carrot");
    assert_eq!(
        requests[1].json(),
        json!({
            "content": "with pictures",
            "reply_to": 7,
            "image_ids": ["img-a", "img-b"]
        })
    );
}

#[tokio::test]
async fn test_invalid_draft_sends_nothing() {
    let backend = MockBackend::start(posting_backend()).await;
    let client = TestClient::signed_in(&backend, "token");
    let composer = Composer::new(client.api.clone());

    let err = composer
        .submit("   ", Vec::new())
        .await
        .expect_err("blank draft");
    assert!(matches!(err, ApiError::Draft(DraftError::Empty)));

    let images = (0..5).map(|i| png(&format!("{i}.png"))).collect();
    let err = composer
        .submit("too many", images)
        .await
        .expect_err("too many images");
    assert!(matches!(
        err,
        ApiError::Draft(DraftError::TooManyImages { count: 5, .. })
    ));

    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_failed_upload_skips_the_post() {
    let backend = MockBackend::start(Router::new().route(
        "/carrot/image",
        post(|| async {
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "storage full"})),
            )
        }),
    ))
    .await;
    let client = TestClient::signed_in(&backend, "token");

    let err = Composer::new(client.api.clone())
        .submit("hello", vec![png("a.png")])
        .await
        .expect_err("upload fails");

    assert_eq!(err.to_string(), "storage full");
    assert!(backend.requests_to("/carrot/carrot").is_empty());
}

// =============================================================================
// Interactions
// =============================================================================

#[tokio::test]
async fn test_toggle_like_picks_request_from_state() {
    let backend = MockBackend::start(
        Router::new()
            .route("/carrot/like", post(|| async { Json(json!({"status": "ok"})) }))
            .route(
                "/carrot/like/{id}",
                delete(|| async { Json(json!({"status": "ok"})) }),
            ),
    )
    .await;
    let client = TestClient::signed_in(&backend, "token");

    let mut carrot: nijitter_core::Carrot =
        serde_json::from_value(carrot_json(5)).expect("carrot fixture");
    assert!(client.api.toggle_like(&carrot).await.expect("like"));

    carrot.is_liked = true;
    assert!(!client.api.toggle_like(&carrot).await.expect("unlike"));

    let requests = backend.requests();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].json(), json!({"carrot_id": 5}));
    assert_eq!(requests[1].method, "DELETE");
    assert_eq!(requests[1].path, "/carrot/like/5");
}

#[tokio::test]
async fn test_toggle_follow_reloads_profile() {
    let following = Arc::new(AtomicBool::new(false));
    let on_follow = following.clone();
    let on_get = following.clone();

    let backend = MockBackend::start(
        Router::new()
            .route(
                "/carrot/follow/{handle}",
                post(move || {
                    on_follow.store(true, Ordering::SeqCst);
                    async { Json(json!({"status": "ok"})) }
                }),
            )
            .route(
                "/carrot/user/{handle}",
                get(move || {
                    let is_following = on_get.load(Ordering::SeqCst);
                    async move {
                        Json(json!({
                            "user": user_json("kame", is_following),
                            "carrots": [],
                            "next_cursor": null
                        }))
                    }
                }),
            ),
    )
    .await;
    let client = TestClient::signed_in(&backend, "token");
    let kame: UserProfile = serde_json::from_value(user_json("kame", false)).expect("profile");

    let page = client.api.toggle_follow(&kame).await.expect("follow");

    assert!(page.user.followed_by_viewer());
    assert!(following.load(Ordering::SeqCst));
    assert_eq!(backend.requests_to("/carrot/follow/kame").len(), 1);
}

#[tokio::test]
async fn test_save_profile_uploads_icon_then_fields() {
    let backend = MockBackend::start(
        Router::new()
            .route(
                "/carrot/user/{handle}/icon",
                put(|| async { Json(user_json("usagi", false)) }),
            )
            .route(
                "/carrot/user/{handle}",
                put(|| async { Json(user_json("usagi", false)) }),
            ),
    )
    .await;
    let client = TestClient::signed_in(&backend, "token");
    let handle = Handle::parse("usagi").expect("handle");
    let update = ProfileUpdate {
        bio: Some("carrots".to_owned()),
        ..ProfileUpdate::default()
    };

    client
        .api
        .save_profile(&handle, &update, Some(png("icon.png")))
        .await
        .expect("save");

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].path, "/carrot/user/usagi/icon");
    assert!(requests[0].text().contains("name=\"icon\""));
    assert_eq!(requests[1].path, "/carrot/user/usagi");
    assert_eq!(requests[1].json(), json!({"bio": "carrots"}));
}

#[tokio::test]
async fn test_own_profile_detection() {
    let backend = MockBackend::start(Router::new().route(
        "/carrot/me",
        get(|| async { Json(json!({"me": user_json("usagi", false)})) }),
    ))
    .await;
    let client = TestClient::signed_in(&backend, "token");

    let usagi = Handle::parse("usagi").expect("handle");
    let kame = Handle::parse("kame").expect("handle");
    assert!(client.api.is_own_profile(&usagi).await.expect("check"));
    assert!(!client.api.is_own_profile(&kame).await.expect("check"));
}

#[tokio::test]
async fn test_own_profile_check_keeps_session_on_stale_token() {
    let backend = MockBackend::start(Router::new().route(
        "/carrot/me",
        get(|| async { axum::http::StatusCode::UNAUTHORIZED }),
    ))
    .await;
    let client = TestClient::signed_in(&backend, "stale");
    let handle = Handle::parse("usagi").expect("handle");

    let own = client.api.is_own_profile(&handle).await.expect("check");

    assert!(!own);
    assert_eq!(client.token().as_deref(), Some("stale"));
    assert!(client.navigator.navigations().is_empty());
}

#[tokio::test]
async fn test_own_profile_check_without_token_is_offline() {
    let backend = MockBackend::start(Router::new()).await;
    let client = TestClient::new(&backend);
    let handle = Handle::parse("usagi").expect("handle");

    assert!(!client.api.is_own_profile(&handle).await.expect("check"));
    assert!(backend.requests().is_empty());
}
