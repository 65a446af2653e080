//! Carrot (post) record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AccountId, CarrotId, Handle};

/// A single post as returned by the timeline, detail and search endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carrot {
    pub id: CarrotId,
    /// Numeric author id.
    #[serde(rename = "user_id_int")]
    pub author_id: AccountId,
    /// Author handle.
    #[serde(rename = "user_id")]
    pub handle: Handle,
    /// Author display name.
    pub username: String,
    pub icon_path: Option<String>,
    pub content: String,
    pub reply_to: Option<CarrotId>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_liked: bool,
}

impl Carrot {
    /// Whether this carrot answers another one.
    #[must_use]
    pub const fn is_reply(&self) -> bool {
        self.reply_to.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_carrot() {
        let json = r#"{
            "id": 10,
            "user_id_int": 3,
            "user_id": "usagi",
            "username": "Usagi",
            "icon_path": null,
            "content": "ninjin!",
            "reply_to": null,
            "created_at": "2025-01-02T03:04:05+09:00"
        }"#;

        let carrot: Carrot = serde_json::from_str(json).unwrap();
        assert_eq!(carrot.id, CarrotId::new(10));
        assert_eq!(carrot.handle.as_str(), "usagi");
        assert!(carrot.images.is_empty());
        assert!(!carrot.is_liked);
        assert!(!carrot.is_reply());
        assert_eq!(carrot.created_at.to_rfc3339(), "2025-01-01T18:04:05+00:00");
    }

    #[test]
    fn test_deserialize_reply_with_images() {
        let json = r#"{
            "id": 11, "user_id_int": 3, "user_id": "usagi", "username": "Usagi",
            "icon_path": "/icons/u.webp", "content": "re", "reply_to": 10,
            "created_at": "2025-01-02T00:00:00Z",
            "images": ["a.webp", "b.webp"], "is_liked": true
        }"#;

        let carrot: Carrot = serde_json::from_str(json).unwrap();
        assert_eq!(carrot.reply_to, Some(CarrotId::new(10)));
        assert_eq!(carrot.images.len(), 2);
        assert!(carrot.is_liked);
    }
}
