//! Likes, follows, profile editing and share links.

use nijitter_core::{
    Carrot, Handle, Location, MeResponse, ProfileUpdate, UserProfile, UserProfilePage,
};
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use tracing::{debug, instrument};
use url::Url;

use crate::api::{NijitterApi, Upload};
use crate::error::ApiError;

impl NijitterApi {
    /// Like or unlike `carrot` depending on its current state.
    ///
    /// Returns the new liked state. The carrot itself is not modified; feeds
    /// apply the change through `Feed::update`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, carrot), fields(carrot_id = %carrot.id, liked = carrot.is_liked))]
    pub async fn toggle_like(&self, carrot: &Carrot) -> Result<bool, ApiError> {
        if carrot.is_liked {
            self.delete_like(carrot.id).await?;
            Ok(false)
        } else {
            self.post_like(carrot.id).await?;
            Ok(true)
        }
    }

    /// Follow or unfollow `user`, then reload their profile so the counts
    /// reflect the change.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if either request fails.
    #[instrument(skip(self, user), fields(handle = %user.handle))]
    pub async fn toggle_follow(&self, user: &UserProfile) -> Result<UserProfilePage, ApiError> {
        if user.followed_by_viewer() {
            self.delete_follow(&user.handle).await?;
        } else {
            self.post_follow(&user.handle).await?;
        }
        self.get_user(&user.handle, None).await
    }

    /// Save the profile form. A new icon is uploaded first; the text fields
    /// are only sent when there is something to send.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if a request fails. If the icon upload fails the
    /// text fields are not sent.
    #[instrument(skip(self, handle, update, icon), fields(handle = %handle, icon = icon.is_some()))]
    pub async fn save_profile(
        &self,
        handle: &Handle,
        update: &ProfileUpdate,
        icon: Option<Upload>,
    ) -> Result<UserProfile, ApiError> {
        let mut profile = None;
        if let Some(icon) = icon {
            profile = Some(self.upload_user_icon(handle, icon).await?);
        }
        if !update.is_empty() {
            profile = Some(self.update_user(handle, update).await?);
        }
        match profile {
            Some(profile) => Ok(profile),
            None => self.get_user(handle, None).await.map(|page| page.user),
        }
    }

    /// Whether `handle` is the signed-in user.
    ///
    /// This only decorates a profile page, so it never ends the session:
    /// without a token, or when the server no longer accepts it, the answer
    /// is `false` and the stored token is left alone.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails for another reason.
    #[instrument(skip(self, handle), fields(handle = %handle))]
    pub async fn is_own_profile(&self, handle: &Handle) -> Result<bool, ApiError> {
        let Some(token) = self.access_token() else {
            return Ok(false);
        };

        let response = self
            .http()
            .get(self.url("/carrot/me"))
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            debug!("Stored token not accepted; treating profile as foreign");
            return Ok(false);
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: format!("API Error: {}", status.as_u16()),
            });
        }

        let me: MeResponse = response.json().await?;
        Ok(me.me.handle == *handle)
    }
}

/// Absolute link to a carrot on `site`, for sharing.
///
/// # Errors
///
/// Returns `url::ParseError` if `site` cannot be a base URL.
pub fn share_link(site: &Url, carrot: &Carrot) -> Result<Url, url::ParseError> {
    Location::Carrot(carrot.id).url(site)
}
