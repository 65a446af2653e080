//! Carrot composition rules.
//!
//! Drafts are validated before any network call: an empty post never leaves
//! the client, and neither does one the server would reject for length or
//! image count.

use crate::types::CarrotId;

/// Maximum number of characters in a carrot.
pub const MAX_CONTENT_CHARS: usize = 280;

/// Character count above which the counter turns to a warning.
pub const WARN_CONTENT_CHARS: usize = 250;

/// Maximum number of images attached to one carrot.
pub const MAX_IMAGES: usize = 4;

/// Reasons a draft is refused locally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("please enter some content")]
    Empty,
    #[error("carrots are limited to {max} characters (got {len})")]
    TooLong { len: usize, max: usize },
    #[error("at most {max} images can be attached (got {count})")]
    TooManyImages { count: usize, max: usize },
}

/// Visual state of the character counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterLevel {
    Normal,
    Warning,
    Error,
}

impl CounterLevel {
    /// Counter level for `content`, counted in characters.
    #[must_use]
    pub fn for_content(content: &str) -> Self {
        match content.chars().count() {
            n if n > MAX_CONTENT_CHARS => Self::Error,
            n if n > WARN_CONTENT_CHARS => Self::Warning,
            _ => Self::Normal,
        }
    }
}

/// A validated carrot ready to be posted.
///
/// `image_count` is the number of files that will be uploaded before the
/// post; the resulting image ids are attached by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrotDraft {
    content: String,
    reply_to: Option<CarrotId>,
    image_count: usize,
}

impl CarrotDraft {
    /// Validate a new draft.
    ///
    /// The content is stored as typed; only the emptiness check trims it.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::Empty`] for whitespace-only content,
    /// [`DraftError::TooLong`] above 280 characters and
    /// [`DraftError::TooManyImages`] above 4 images.
    pub fn new(
        content: &str,
        reply_to: Option<CarrotId>,
        image_count: usize,
    ) -> Result<Self, DraftError> {
        if content.trim().is_empty() {
            return Err(DraftError::Empty);
        }

        let len = content.chars().count();
        if len > MAX_CONTENT_CHARS {
            return Err(DraftError::TooLong {
                len,
                max: MAX_CONTENT_CHARS,
            });
        }

        if image_count > MAX_IMAGES {
            return Err(DraftError::TooManyImages {
                count: image_count,
                max: MAX_IMAGES,
            });
        }

        Ok(Self {
            content: content.to_owned(),
            reply_to,
            image_count,
        })
    }

    /// Validate a reply to `parent`.
    ///
    /// # Errors
    ///
    /// Same rules as [`CarrotDraft::new`].
    pub fn reply(content: &str, parent: CarrotId) -> Result<Self, DraftError> {
        Self::new(content, Some(parent), 0)
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub const fn reply_to(&self) -> Option<CarrotId> {
        self.reply_to
    }

    #[must_use]
    pub const fn image_count(&self) -> usize {
        self.image_count
    }
}
