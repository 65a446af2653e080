//! Response envelopes and request bodies of the REST API.

use core::fmt;

use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use super::{Carrot, Notification, UserProfile};
use crate::types::{CarrotId, Cursor};

/// Error code sent with a 403 outside of the service's usage hours.
pub const NIGHT_TIME_RESTRICTED: &str = "night_time_restricted";

/// One page of carrots (`GET /carrot/timeline`, `/following`, `/replies`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePage {
    pub carrots: Vec<Carrot>,
    #[serde(default, deserialize_with = "Cursor::deserialize_next")]
    pub next_cursor: Option<Cursor>,
}

/// `GET /carrot/carrot/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrotResponse {
    pub carrot: Carrot,
}

/// `GET /carrot/user/{id}`: the profile plus the first page of their carrots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfilePage {
    pub user: UserProfile,
    #[serde(default)]
    pub carrots: Vec<Carrot>,
    #[serde(default, deserialize_with = "Cursor::deserialize_next")]
    pub next_cursor: Option<Cursor>,
}

/// `GET /carrot/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeResponse {
    pub me: UserProfile,
}

/// `GET /carrot/notifications`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsResponse {
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

/// `GET /carrot/notifications/unread-count`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCount {
    pub unread_count: u32,
}

/// `PUT /carrot/notifications/{id}/read`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkReadResponse {
    #[serde(default)]
    pub status: String,
}

/// `GET /search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub users: Vec<UserProfile>,
    #[serde(default)]
    pub carrots: Vec<Carrot>,
}

impl SearchResults {
    /// True when neither users nor carrots matched.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.users.is_empty() && self.carrots.is_empty()
    }
}

/// `POST /carrot/image`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUploadResponse {
    #[serde(default)]
    pub image_ids: Vec<String>,
}

/// `POST /auth/refresh`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: Option<String>,
}

/// Body of `POST /carrot/carrot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCarrotRequest {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<CarrotId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_ids: Option<Vec<String>>,
}

/// Body of `POST /carrot/like`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeRequest {
    pub carrot_id: CarrotId,
}

/// Body of `POST /auth/signup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
}

/// Body of `POST /auth/verify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
    pub user_id: String,
    pub username: String,
    pub password: String,
}

/// Error body shared by all endpoints.
///
/// Servers are loose about the types here: `retry_after` may be a clock
/// time or a number of seconds, and extra fields such as `details` may be
/// objects. Text fields accept any scalar and ignore structured values, so
/// the `error` code survives whatever else the body carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, deserialize_with = "loose_text")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub retry_after: Option<String>,
}

impl ApiErrorBody {
    /// Whether the server refused the request because of usage hours.
    #[must_use]
    pub fn is_night_time_restricted(&self) -> bool {
        self.error.as_deref() == Some(NIGHT_TIME_RESTRICTED)
    }
}

/// Read a scalar of any type as text; `null`, arrays and objects are `None`.
fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LooseText)
}

struct LooseText;

impl<'de> Visitor<'de> for LooseText {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Some(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(None)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_last_page_has_no_cursor() {
        let page: TimelinePage =
            serde_json::from_str(r#"{"carrots":[],"next_cursor":null}"#).unwrap();
        assert!(page.carrots.is_empty());
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn test_post_request_omits_empty_fields() {
        let body = PostCarrotRequest {
            content: "hi".to_owned(),
            reply_to: None,
            image_ids: None,
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"content":"hi"}"#);
    }

    #[test]
    fn test_error_body_detects_night_restriction() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"error":"night_time_restricted","retry_after":"06:00"}"#,
        )
        .unwrap();
        assert!(body.is_night_time_restricted());
        assert_eq!(body.retry_after.as_deref(), Some("06:00"));

        assert!(!ApiErrorBody::default().is_night_time_restricted());
    }

    #[test]
    fn test_error_body_accepts_numeric_retry_after() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"error":"night_time_restricted","retry_after":21600}"#,
        )
        .unwrap();
        assert!(body.is_night_time_restricted());
        assert_eq!(body.retry_after.as_deref(), Some("21600"));
    }

    #[test]
    fn test_error_body_ignores_structured_fields() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"error":"night_time_restricted","retry_after":null,"details":{"window":[22,6]}}"#,
        )
        .unwrap();
        assert!(body.is_night_time_restricted());
        assert_eq!(body.retry_after, None);

        let nested: ApiErrorBody =
            serde_json::from_str(r#"{"error":{"code":"x"},"retry_after":["a"]}"#).unwrap();
        assert_eq!(nested, ApiErrorBody::default());
    }
}
