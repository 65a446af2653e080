//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                 - Timeline shell
//! GET  /user/{id}        - Profile shell (rendered from the users table)
//! GET  /carrot/{id}      - Carrot detail shell
//! GET  /postcarrot       - Standalone composer shell
//! GET  /night            - Usage hours are over
//! GET  /login            - Login form
//! GET  /error            - Generic error page
//! GET  /success          - Generic success page
//!
//! # Sign-up (Slack gate)
//! GET  /slack            - "Continue with Slack" page
//! GET  /state            - Create an OAuth state token, 303 to Slack
//! GET  /signup           - Slack redirect target; verifies state and team
//! GET  /verify           - Email verification link target
//!
//! # Assets
//! GET  /static/{*path}   - Static files (JS/CSS never cached)
//! ```
//!
//! Every page shell carries `data-api-url` and `data-image-url` on `<body>`;
//! the browser code talks to the REST backend directly.

pub mod assets;
pub mod pages;
pub mod signup;
pub mod user;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Values every page shell exposes to the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
    pub api_url: String,
    pub image_url: String,
}

impl Shell {
    /// Shell values from the server configuration.
    #[must_use]
    pub fn from_state(state: &AppState) -> Self {
        let config = state.config();
        Self {
            api_url: config.api_url.clone(),
            image_url: config.image_url.clone(),
        }
    }
}

/// Create the application router (without global layers).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::timeline))
        .route("/user/{id}", get(user::show))
        .route("/carrot/{id}", get(pages::carrot))
        .route("/postcarrot", get(pages::post_carrot))
        .route("/night", get(pages::night))
        .route("/login", get(pages::login))
        .route("/error", get(pages::error))
        .route("/success", get(pages::success))
        .route("/slack", get(pages::slack))
        .route("/state", get(signup::state))
        .route("/signup", get(signup::signup))
        .route("/verify", get(signup::verify))
        .route("/static/{*path}", get(assets::serve))
}
