//! Slack-gated sign-up.
//!
//! ```text
//! /slack  -> /state (store state, 303) -> Slack authorize
//!         -> /signup?state&code (check + consume state, exchange code,
//!                                 require TEAM_ID) -> sign-up form
//! mail    -> /verify?token -> verification form
//! ```
//!
//! Both forms receive their proof in a short-lived HTTP-only cookie that the
//! REST backend checks.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::Shell;
use super::pages::ErrorTemplate;
use crate::db::{SlackVerificationRepository, StateCheck};
use crate::error::Result;
use crate::state::AppState;

/// Lifetime of the proof cookies, in seconds.
pub const PROOF_COOKIE_MAX_AGE: u32 = 300;

/// Cookie set once the Slack workspace has been verified.
pub const SLACK_VERIFIED_COOKIE: &str = "slack_verified";

/// Cookie carrying the token from the verification mail.
pub const EMAIL_TOKEN_COOKIE: &str = "email_verification_token";

/// Sign-up form.
#[derive(Template, WebTemplate)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub shell: Shell,
}

/// Verification form (handle, display name, password).
#[derive(Template, WebTemplate)]
#[template(path = "verify.html")]
pub struct VerifyTemplate {
    pub shell: Shell,
}

#[derive(Debug, Deserialize)]
pub struct SignupQuery {
    pub state: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    #[serde(default)]
    pub token: String,
}

/// `Set-Cookie` value for a proof cookie. The value is form-encoded.
#[must_use]
pub fn proof_cookie(name: &str, value: &str) -> String {
    let value: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
    format!("{name}={value}; Max-Age={PROOF_COOKIE_MAX_AGE}; Path=/; Secure; HttpOnly")
}

fn with_cookie(mut response: Response, name: &str, value: &str) -> Response {
    match HeaderValue::from_str(&proof_cookie(name, value)) {
        Ok(cookie) => {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }
        Err(e) => warn!(error = %e, cookie = name, "Cookie value is not a valid header"),
    }
    response
}

fn refused(state: &AppState) -> Response {
    (
        StatusCode::FORBIDDEN,
        ErrorTemplate {
            shell: Shell::from_state(state),
        },
    )
        .into_response()
}

/// Store a fresh state token and send the user to Slack.
///
/// # Errors
///
/// Returns 500 JSON if the token cannot be stored.
#[instrument(skip(state))]
pub async fn state(State(state): State<AppState>) -> Result<Redirect> {
    let token = SlackVerificationRepository::new(state.pool()).create().await?;
    Ok(Redirect::to(&state.slack().authorize_url(&token)))
}

/// Slack redirect target.
///
/// Renders the sign-up form only for a known, unexpired state and a code
/// that belongs to the allowed workspace. The state is consumed whatever
/// the outcome. Every refusal is a 403 error page.
#[instrument(skip(state, query))]
pub async fn signup(State(state): State<AppState>, Query(query): Query<SignupQuery>) -> Response {
    let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
    let (Some(token), Some(code)) = (non_empty(query.state), non_empty(query.code)) else {
        return refused(&state);
    };

    let repo = SlackVerificationRepository::new(state.pool());
    let check = repo.check(&token).await;
    if let Err(e) = repo.delete(&token).await {
        warn!(error = %e, "Failed to delete Slack state");
    }

    match check {
        Ok(StateCheck::Valid) => {}
        Ok(other) => {
            info!(check = ?other, "Rejected Slack state");
            return refused(&state);
        }
        Err(e) => {
            warn!(error = %e, "Failed to check Slack state");
            return refused(&state);
        }
    }

    if let Err(e) = state.slack().verify_member(&code).await {
        warn!(error = %e, "Slack verification failed");
        return refused(&state);
    }

    let page = SignupTemplate {
        shell: Shell::from_state(&state),
    };
    with_cookie(page.into_response(), SLACK_VERIFIED_COOKIE, "1")
}

/// Verification link target: hand the mail token to the form as a cookie.
#[instrument(skip(state, query))]
pub async fn verify(State(state): State<AppState>, Query(query): Query<VerifyQuery>) -> Response {
    let page = VerifyTemplate {
        shell: Shell::from_state(&state),
    };
    with_cookie(page.into_response(), EMAIL_TOKEN_COOKIE, &query.token)
}
