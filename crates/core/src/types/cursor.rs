//! Pagination cursor.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque position marker returned by the server for the next page.
///
/// The backend encodes cursors as numbers and signals "no further page" with
/// `null`. A zero cursor is never sent back, so it deserializes as absent
/// through [`Cursor::deserialize_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(i64);

impl Cursor {
    /// Create a cursor from its raw value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw cursor value.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Deserialize a `next_cursor` field, mapping `null` and `0` to `None`.
    ///
    /// # Errors
    ///
    /// Returns the deserializer's error if the value is neither null nor an
    /// integer.
    pub fn deserialize_next<'de, D>(deserializer: D) -> Result<Option<Self>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<i64>::deserialize(deserializer)?;
        Ok(raw.filter(|v| *v != 0).map(Self))
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    struct Envelope {
        #[serde(default, deserialize_with = "Cursor::deserialize_next")]
        next_cursor: Option<Cursor>,
    }

    #[test]
    fn test_null_and_zero_mean_no_next_page() {
        let null: Envelope = serde_json::from_str(r#"{"next_cursor":null}"#).unwrap();
        assert_eq!(null.next_cursor, None);

        let zero: Envelope = serde_json::from_str(r#"{"next_cursor":0}"#).unwrap();
        assert_eq!(zero.next_cursor, None);

        let missing: Envelope = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.next_cursor, None);
    }

    #[test]
    fn test_numeric_cursor_is_kept() {
        let env: Envelope = serde_json::from_str(r#"{"next_cursor":118}"#).unwrap();
        assert_eq!(env.next_cursor, Some(Cursor::new(118)));
    }
}
