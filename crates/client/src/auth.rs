//! Login, signup, verification and logout.
//!
//! These endpoints bypass the 401/403 handling of the request pipeline: a
//! refused login is reported to the form, not answered with a redirect to
//! the login page the user is already on.
//!
//! # Flows
//!
//! ```text
//! login   POST /auth/login (form) -> POST /auth/refresh -> store token -> /
//! signup  POST /auth/signup       -> store signup_email -> /verify
//! verify  POST /auth/verify       -> drop signup_email -> refresh -> GET /carrot/me -> /
//! logout  POST /auth/logout       -> clear token -> /login
//! ```

use nijitter_core::{
    AccessTokenResponse, ApiErrorBody, Email, Location, Registration, SignupRequest,
};
use reqwest::{Method, Response};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};

use crate::api::NijitterApi;
use crate::error::ApiError;

/// Read the `error` field of a refused auth request, or use `fallback`.
async fn refusal(response: Response, fallback: &str) -> ApiError {
    let body: ApiErrorBody = response.json().await.unwrap_or_default();
    ApiError::Auth(
        body.error
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| fallback.to_owned()),
    )
}

impl NijitterApi {
    /// Sign in with an email address or handle.
    ///
    /// On success the refresh cookie set by the server is exchanged for an
    /// access token and the user is sent to the timeline.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Auth` with the server's message if the credentials
    /// are refused, or a transport error.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email_or_id: &str, password: &SecretString) -> Result<(), ApiError> {
        let response = self
            .http()
            .post(self.url("/auth/login"))
            .form(&[
                ("emailorid", email_or_id),
                ("password", password.expose_secret()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(refusal(response, "Login failed").await);
        }

        self.refresh_access_token().await?;
        self.navigator().navigate(&Location::Home);
        Ok(())
    }

    /// Exchange the refresh cookie for a new access token.
    ///
    /// Returns `false` when the server refused or sent no token; the stored
    /// token is left untouched in that case.
    ///
    /// # Errors
    ///
    /// Returns a transport error, or `ApiError::Store` if the token cannot be
    /// persisted.
    #[instrument(skip(self))]
    pub async fn refresh_access_token(&self) -> Result<bool, ApiError> {
        let response = self.http().post(self.url("/auth/refresh")).send().await?;
        if !response.status().is_success() {
            warn!(status = %response.status(), "Token refresh refused");
            return Ok(false);
        }

        let body: AccessTokenResponse = response.json().await.unwrap_or_default();
        match body.access_token.filter(|t| !t.is_empty()) {
            Some(token) => {
                self.set_access_token(SecretString::from(token))?;
                debug!("Stored refreshed access token");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Request a verification mail for `email`.
    ///
    /// The address is remembered as the pending signup and the user is sent
    /// to the verification page.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Email` for a malformed address (no request is
    /// made), `ApiError::Auth` if the server refuses it, or a transport error.
    #[instrument(skip(self))]
    pub async fn signup(&self, email: &str) -> Result<Email, ApiError> {
        let email = Email::parse(email)?;

        let response = self
            .http()
            .post(self.url("/auth/signup"))
            .json(&SignupRequest {
                email: email.as_str().to_owned(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(refusal(response, "Failed to send confirmation email").await);
        }

        self.store().set_signup_email(email.as_str())?;
        self.navigator().navigate(&Location::Verify);
        Ok(email)
    }

    /// Email of the signup awaiting verification, if any.
    #[must_use]
    pub fn pending_signup_email(&self) -> Option<String> {
        self.store().signup_email()
    }

    /// Complete a signup with the token from the verification mail.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Auth` if the server refuses the registration, or a
    /// transport or storage error.
    #[instrument(skip(self, registration), fields(handle = %registration.handle()))]
    pub async fn verify(&self, registration: Registration) -> Result<(), ApiError> {
        let response = self
            .http()
            .post(self.url("/auth/verify"))
            .json(&registration.into_request())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(refusal(response, "Verification failed").await);
        }

        self.store().clear_signup_email()?;
        self.refresh_access_token().await?;

        // Warm the session; the result is not needed.
        let mut warm = self.http().request(Method::GET, self.url("/carrot/me"));
        if let Some(token) = self.access_token() {
            warm = warm.bearer_auth(token.expose_secret());
        }
        if let Err(e) = warm.send().await {
            debug!(error = %e, "Session warm-up failed");
        }

        self.navigator().navigate(&Location::Home);
        Ok(())
    }

    /// Sign out and forget the access token.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the logout request could not be sent;
    /// the token is kept in that case.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let mut request = self.http().post(self.url("/auth/logout"));
        if let Some(token) = self.access_token() {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            warn!(status = %response.status(), "Logout request refused");
        }

        self.clear_tokens();
        self.navigator().navigate(&Location::Login);
        Ok(())
    }
}
