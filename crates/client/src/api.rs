//! REST API client.
//!
//! Every endpoint goes through one request pipeline, which attaches the
//! bearer token and turns error statuses into [`ApiError`]s:
//!
//! | status | effect |
//! |--------|--------|
//! | 403 `night_time_restricted` | alert with the retry time, `TimeRestricted` |
//! | 403 | `Forbidden` |
//! | 401 | clear the token, navigate to `/login`, `Unauthorized` |
//! | other non-2xx | `Status` with the body's `error` or `API Error: <status>` |
//! | 204 | empty success |
//!
//! There are no retries, no backoff and no idempotency keys.

use std::path::Path;
use std::sync::Arc;

use nijitter_core::{
    ApiErrorBody, Carrot, CarrotDraft, CarrotId, CarrotResponse, Cursor, Handle,
    ImageUploadResponse, LikeRequest, MarkReadResponse, MeResponse, NotificationId,
    NotificationsResponse, PostCarrotRequest, ProfileUpdate, SearchResults, TimelinePage,
    UnreadCount, UserProfile, UserProfilePage,
};
use nijitter_core::Location;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::navigator::Navigator;
use crate::store::CredentialStore;

/// Shown when a 403 `night_time_restricted` carries no `retry_after`.
const DEFAULT_RETRY_AFTER: &str = "the next available window";

// =============================================================================
// Upload
// =============================================================================

/// A file to send as multipart form data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    #[must_use]
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Io` if the file cannot be read.
    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(file_name, mime_for(path), bytes))
    }

    fn into_part(self) -> Result<Part, ApiError> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.mime)?)
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

// =============================================================================
// NijitterApi
// =============================================================================

/// Client for the Nijitter REST backend.
///
/// Cheap to clone; clones share the HTTP connection pool, cookie jar,
/// credential store and navigator.
#[derive(Clone)]
pub struct NijitterApi {
    inner: Arc<NijitterApiInner>,
}

struct NijitterApiInner {
    client: reqwest::Client,
    base_url: String,
    image_url: Option<String>,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for NijitterApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NijitterApi")
            .field("base_url", &self.inner.base_url)
            .field("image_url", &self.inner.image_url)
            .finish_non_exhaustive()
    }
}

impl NijitterApi {
    /// Create a new API client.
    ///
    /// The underlying HTTP client keeps cookies so the `refresh_token` set
    /// at login is sent back to `/auth/refresh`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(
        config: &ClientConfig,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(NijitterApiInner {
                client,
                base_url: config.api_url.as_str().trim_end_matches('/').to_owned(),
                image_url: config.image_url.clone(),
                store,
                navigator,
            }),
        })
    }

    /// Base URL requests are sent to, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Image host used to resolve relative image paths.
    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.inner.image_url.as_deref()
    }

    #[must_use]
    pub fn navigator(&self) -> &dyn Navigator {
        self.inner.navigator.as_ref()
    }

    #[must_use]
    pub fn store(&self) -> &dyn CredentialStore {
        self.inner.store.as_ref()
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    /// Stored access token, if any.
    #[must_use]
    pub fn access_token(&self) -> Option<SecretString> {
        self.inner.store.access_token()
    }

    /// Store a new access token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Store` if the token cannot be persisted.
    pub fn set_access_token(&self, token: SecretString) -> Result<(), ApiError> {
        Ok(self.inner.store.set_access_token(token)?)
    }

    /// Forget the access token. The refresh cookie is cleared by logout.
    pub fn clear_tokens(&self) {
        if let Err(e) = self.inner.store.clear_access_token() {
            tracing::error!(error = %e, "Failed to clear stored access token");
        }
    }

    // =========================================================================
    // Request pipeline
    // =========================================================================

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.client
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Start a request with the bearer token attached.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.inner.client.request(method, self.url(path));
        match self.inner.store.access_token() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and map error statuses.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let body: ApiErrorBody = serde_json::from_str(&text).unwrap_or_default();

        if status == StatusCode::FORBIDDEN {
            if body.is_night_time_restricted() {
                let retry_after = body
                    .retry_after
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| DEFAULT_RETRY_AFTER.to_owned());
                self.inner.navigator.alert(&format!(
                    "Usage hours are over. Available again after {retry_after}."
                ));
                return Err(ApiError::TimeRestricted { retry_after });
            }
            return Err(ApiError::Forbidden {
                message: body.error,
            });
        }

        if status == StatusCode::UNAUTHORIZED {
            self.clear_tokens();
            self.inner.navigator.navigate(&Location::Login);
            return Err(ApiError::Unauthorized);
        }

        tracing::warn!(
            status = %status,
            body = %text.chars().take(200).collect::<String>(),
            "API returned non-success status"
        );
        Err(ApiError::Status {
            status: status.as_u16(),
            message: body
                .error
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| format!("API Error: {}", status.as_u16())),
        })
    }

    /// Send a request and decode the JSON body. A 204 decodes as `{}`.
    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        let text = if response.status() == StatusCode::NO_CONTENT {
            String::new()
        } else {
            response.text().await?
        };
        let text = if text.trim().is_empty() { "{}" } else { &text };

        serde_json::from_str(text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request whose body is irrelevant.
    async fn execute(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send(request).await?;
        Ok(())
    }

    fn with_cursor(request: RequestBuilder, cursor: Option<Cursor>) -> RequestBuilder {
        match cursor {
            Some(cursor) => request.query(&[("cursor", cursor.as_i64())]),
            None => request,
        }
    }

    // =========================================================================
    // Carrots
    // =========================================================================

    /// Latest carrots from everyone.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn get_timeline(&self, cursor: Option<Cursor>) -> Result<TimelinePage, ApiError> {
        let request = Self::with_cursor(self.request(Method::GET, "/carrot/timeline"), cursor);
        self.json(request).await
    }

    /// Carrots from followed users.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn get_following_timeline(
        &self,
        cursor: Option<Cursor>,
    ) -> Result<TimelinePage, ApiError> {
        let request = Self::with_cursor(self.request(Method::GET, "/carrot/following"), cursor);
        self.json(request).await
    }

    /// A single carrot.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn get_carrot(&self, id: CarrotId) -> Result<Carrot, ApiError> {
        let response: CarrotResponse = self
            .json(self.request(Method::GET, &format!("/carrot/carrot/{id}")))
            .await?;
        Ok(response.carrot)
    }

    /// Replies to a carrot.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn get_replies(
        &self,
        id: CarrotId,
        cursor: Option<Cursor>,
    ) -> Result<TimelinePage, ApiError> {
        let request = Self::with_cursor(
            self.request(Method::GET, &format!("/carrot/carrot/{id}/replies")),
            cursor,
        );
        self.json(request).await
    }

    /// Post a validated draft with already uploaded images.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, draft), fields(reply_to = ?draft.reply_to()))]
    pub async fn post_carrot(
        &self,
        draft: &CarrotDraft,
        image_ids: Vec<String>,
    ) -> Result<Carrot, ApiError> {
        let body = PostCarrotRequest {
            content: draft.content().to_owned(),
            reply_to: draft.reply_to(),
            image_ids: (!image_ids.is_empty()).then_some(image_ids),
        };
        let carrot: Carrot = self
            .json(self.request(Method::POST, "/carrot/carrot").json(&body))
            .await?;
        debug!(carrot_id = %carrot.id, "Posted carrot");
        Ok(carrot)
    }

    /// Delete one of the viewer's carrots.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_carrot(&self, id: CarrotId) -> Result<(), ApiError> {
        self.execute(self.request(Method::DELETE, &format!("/carrot/carrot/{id}")))
            .await
    }

    /// Like a carrot.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn post_like(&self, id: CarrotId) -> Result<(), ApiError> {
        self.execute(
            self.request(Method::POST, "/carrot/like")
                .json(&LikeRequest { carrot_id: id }),
        )
        .await
    }

    /// Remove a like.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_like(&self, id: CarrotId) -> Result<(), ApiError> {
        self.execute(self.request(Method::DELETE, &format!("/carrot/like/{id}")))
            .await
    }

    /// Upload up to four images; returns their ids in upload order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if a file has an invalid MIME type or the request
    /// fails.
    #[instrument(skip(self, files), fields(count = files.len()))]
    pub async fn upload_images(&self, files: Vec<Upload>) -> Result<Vec<String>, ApiError> {
        let mut form = Form::new();
        for file in files {
            form = form.part("images", file.into_part()?);
        }
        let response: ImageUploadResponse = self
            .json(self.request(Method::POST, "/carrot/image").multipart(form))
            .await?;
        Ok(response.image_ids)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Follow a user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, handle), fields(handle = %handle))]
    pub async fn post_follow(&self, handle: &Handle) -> Result<(), ApiError> {
        self.execute(self.request(Method::POST, &format!("/carrot/follow/{handle}")))
            .await
    }

    /// Unfollow a user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, handle), fields(handle = %handle))]
    pub async fn delete_follow(&self, handle: &Handle) -> Result<(), ApiError> {
        self.execute(self.request(Method::DELETE, &format!("/carrot/follow/{handle}")))
            .await
    }

    /// A user's profile and a page of their carrots.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, handle), fields(handle = %handle))]
    pub async fn get_user(
        &self,
        handle: &Handle,
        cursor: Option<Cursor>,
    ) -> Result<UserProfilePage, ApiError> {
        let request = Self::with_cursor(
            self.request(Method::GET, &format!("/carrot/user/{handle}")),
            cursor,
        );
        self.json(request).await
    }

    /// The signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn get_me(&self) -> Result<UserProfile, ApiError> {
        let response: MeResponse = self.json(self.request(Method::GET, "/carrot/me")).await?;
        Ok(response.me)
    }

    /// Update profile fields.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, handle, update), fields(handle = %handle))]
    pub async fn update_user(
        &self,
        handle: &Handle,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, ApiError> {
        self.json(
            self.request(Method::PUT, &format!("/carrot/user/{handle}"))
                .json(update),
        )
        .await
    }

    /// Replace the profile icon.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the file has an invalid MIME type or the request
    /// fails.
    #[instrument(skip(self, handle, icon), fields(handle = %handle))]
    pub async fn upload_user_icon(
        &self,
        handle: &Handle,
        icon: Upload,
    ) -> Result<UserProfile, ApiError> {
        let form = Form::new().part("icon", icon.into_part()?);
        self.json(
            self.request(Method::PUT, &format!("/carrot/user/{handle}/icon"))
                .multipart(form),
        )
        .await
    }

    /// Delete the account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, handle), fields(handle = %handle))]
    pub async fn delete_user(&self, handle: &Handle) -> Result<(), ApiError> {
        self.execute(self.request(Method::DELETE, &format!("/carrot/user/{handle}")))
            .await
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Most recent notifications.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn get_notifications(
        &self,
        limit: Option<u32>,
    ) -> Result<NotificationsResponse, ApiError> {
        let mut request = self.request(Method::GET, "/carrot/notifications");
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        self.json(request).await
    }

    /// Mark a notification as read.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn mark_notification_as_read(
        &self,
        id: NotificationId,
    ) -> Result<MarkReadResponse, ApiError> {
        self.json(self.request(Method::PUT, &format!("/carrot/notifications/{id}/read")))
            .await
    }

    /// Number of unread notifications.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn get_unread_notification_count(&self) -> Result<u32, ApiError> {
        let response: UnreadCount = self
            .json(self.request(Method::GET, "/carrot/notifications/unread-count"))
            .await?;
        Ok(response.unread_count)
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Search users and carrots. The query is sent as-is; see
    /// [`DebouncedSearch`](crate::DebouncedSearch) for input handling.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<SearchResults, ApiError> {
        self.json(self.request(Method::GET, "/search").query(&[("q", query)]))
            .await
    }
}
