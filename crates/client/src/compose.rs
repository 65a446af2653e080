//! Posting carrots and replies.

use nijitter_core::{Carrot, CarrotDraft, CarrotId};
use tracing::{info, instrument};

use crate::api::{NijitterApi, Upload};
use crate::error::ApiError;

/// Compose box for new carrots or replies to one parent.
#[derive(Debug, Clone)]
pub struct Composer {
    api: NijitterApi,
    reply_to: Option<CarrotId>,
}

impl Composer {
    /// Compose box for top-level carrots.
    #[must_use]
    pub const fn new(api: NijitterApi) -> Self {
        Self {
            api,
            reply_to: None,
        }
    }

    /// Compose box for replies to `parent`.
    #[must_use]
    pub const fn reply(api: NijitterApi, parent: CarrotId) -> Self {
        Self {
            api,
            reply_to: Some(parent),
        }
    }

    #[must_use]
    pub const fn reply_to(&self) -> Option<CarrotId> {
        self.reply_to
    }

    /// Validate, upload the images, then post.
    ///
    /// Nothing is sent if the draft is invalid. Images are uploaded in one
    /// request before the post and their ids attached to it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Draft` for an invalid draft, or the error of the
    /// failing request.
    #[instrument(skip(self, content, images), fields(reply_to = ?self.reply_to, images = images.len()))]
    pub async fn submit(&self, content: &str, images: Vec<Upload>) -> Result<Carrot, ApiError> {
        let draft = CarrotDraft::new(content, self.reply_to, images.len())?;

        let image_ids = if images.is_empty() {
            Vec::new()
        } else {
            self.api.upload_images(images).await?
        };

        let carrot = self.api.post_carrot(&draft, image_ids).await?;
        info!(carrot_id = %carrot.id, "Carrot posted");
        Ok(carrot)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use nijitter_core::DraftError;
    use url::Url;

    use super::*;
    use crate::config::ClientConfig;
    use crate::navigator::TracingNavigator;
    use crate::store::MemoryStore;

    fn offline_api() -> NijitterApi {
        // Nothing listens on the discard port; a request would fail with Http.
        let config = ClientConfig::new(Url::parse("http://127.0.0.1:9/api").unwrap());
        NijitterApi::new(&config, Arc::new(MemoryStore::new()), Arc::new(TracingNavigator)).unwrap()
    }

    #[tokio::test]
    async fn test_blank_content_is_refused_before_sending() {
        let composer = Composer::new(offline_api());
        let err = composer.submit("   \n", Vec::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::Draft(DraftError::Empty)));
    }

    #[tokio::test]
    async fn test_too_many_images_is_refused_before_sending() {
        let composer = Composer::reply(offline_api(), CarrotId::new(3));
        let images = (0..5)
            .map(|i| Upload::new(format!("{i}.png"), "image/png", vec![0]))
            .collect();
        let err = composer.submit("hello", images).await.unwrap_err();
        assert!(matches!(err, ApiError::Draft(DraftError::TooManyImages { count: 5, .. })));
    }
}
