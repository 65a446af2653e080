//! Repository tests against a real MySQL database.
//!
//! These tests require:
//! - A MySQL database with the `users` and `slack_verifications` tables
//! - `DATABASE_URL` pointing at it
//!
//! Run with: cargo test -p nijitter-integration-tests -- --ignored

use nijitter_core::Handle;
use nijitter_web::db::{RepositoryError, SlackVerificationRepository, StateCheck, UserRepository};
use secrecy::SecretString;
use sqlx::MySqlPool;

async fn pool() -> MySqlPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    nijitter_web::db::create_pool(&SecretString::from(url))
        .await
        .expect("connect to database")
}

// =============================================================================
// Slack state tokens
// =============================================================================

#[tokio::test]
#[ignore = "requires MySQL (DATABASE_URL)"]
async fn test_state_lifecycle() {
    let pool = pool().await;
    let repo = SlackVerificationRepository::new(&pool);

    let state = repo.create().await.expect("create state");
    assert_eq!(repo.check(&state).await.expect("check"), StateCheck::Valid);

    repo.delete(&state).await.expect("delete state");
    assert_eq!(repo.check(&state).await.expect("check"), StateCheck::Unknown);
}

#[tokio::test]
#[ignore = "requires MySQL (DATABASE_URL)"]
async fn test_unknown_state() {
    let pool = pool().await;
    let repo = SlackVerificationRepository::new(&pool);

    assert_eq!(
        repo.check("never-issued").await.expect("check"),
        StateCheck::Unknown
    );
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
#[ignore = "requires MySQL (DATABASE_URL)"]
async fn test_missing_profile_is_not_found() {
    let pool = pool().await;
    let handle = Handle::parse("no_such_user_0000").expect("handle");

    let result = UserRepository::new(&pool).get_profile(&handle).await;

    assert!(matches!(result, Err(RepositoryError::NotFound)));
}
