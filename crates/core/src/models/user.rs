//! User profile records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Handle;

/// Public profile of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    #[serde(rename = "user_id")]
    pub handle: Handle,
    pub icon_path: Option<String>,
    pub bio: Option<String>,
    pub status_message: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub follower_count: Option<u64>,
    #[serde(default)]
    pub following_count: Option<u64>,
    #[serde(default)]
    pub is_following: Option<bool>,
}

impl UserProfile {
    /// Whether the viewer follows this user. Unknown counts as not following.
    #[must_use]
    pub fn followed_by_viewer(&self) -> bool {
        self.is_following.unwrap_or(false)
    }

    /// Bio text, or `None` when absent or blank.
    #[must_use]
    pub fn bio_text(&self) -> Option<&str> {
        self.bio.as_deref().map(str::trim).filter(|b| !b.is_empty())
    }
}

/// Partial profile update (`PUT /carrot/user/{id}`).
///
/// Only fields that are `Some` are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

impl ProfileUpdate {
    /// Build an update from form input, trimming every field.
    #[must_use]
    pub fn from_form(username: &str, bio: &str, status_message: &str) -> Self {
        Self {
            username: Some(username.trim().to_owned()),
            icon_path: None,
            bio: Some(bio.trim().to_owned()),
            status_message: Some(status_message.trim().to_owned()),
        }
    }

    /// True when no field would be sent.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.icon_path.is_none()
            && self.bio.is_none()
            && self.status_message.is_none()
    }
}
