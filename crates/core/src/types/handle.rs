//! User handle type (`@handle`).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Handle`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    /// The input string is empty.
    #[error("user id cannot be empty")]
    Empty,
    /// The input contains a character outside `[A-Za-z0-9_-]`.
    #[error("user id may only contain letters, digits, '_' and '-' (found {0:?})")]
    InvalidCharacter(char),
}

/// A user-chosen textual id, shown as `@handle` and used in profile URLs.
///
/// Handles are restricted to ASCII letters, digits, underscore and hyphen so
/// they can be embedded in paths without escaping. Values received from the
/// REST backend are trusted and deserialized without re-validation.
///
/// ```
/// use nijitter_core::Handle;
///
/// assert!(Handle::parse("carrot_lover-01").is_ok());
/// assert!(Handle::parse("にんじん").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    /// Parse a `Handle` from user input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or contains characters outside
    /// `[A-Za-z0-9_-]`.
    pub fn parse(s: &str) -> Result<Self, HandleError> {
        if s.is_empty() {
            return Err(HandleError::Empty);
        }

        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(HandleError::InvalidCharacter(bad));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the handle without the leading `@`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Handle {
    type Err = HandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.trim_start_matches('@'))
    }
}

impl AsRef<str> for Handle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "mysql")]
impl sqlx::Type<sqlx::MySql> for Handle {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

#[cfg(feature = "mysql")]
impl<'r> sqlx::Decode<'r, sqlx::MySql> for Handle {
    fn decode(value: sqlx::mysql::MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::MySql>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "mysql")]
impl sqlx::Encode<'_, sqlx::MySql> for Handle {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<u8>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::MySql>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_allowed_charset() {
        for ok in ["a", "A_b-9", "___", "user-123"] {
            assert!(Handle::parse(ok).is_ok(), "{ok} should be accepted");
        }
    }

    #[test]
    fn test_parse_rejects_other_characters() {
        assert_eq!(Handle::parse(""), Err(HandleError::Empty));
        assert_eq!(
            Handle::parse("has space"),
            Err(HandleError::InvalidCharacter(' '))
        );
        assert_eq!(
            Handle::parse("dot.ted"),
            Err(HandleError::InvalidCharacter('.'))
        );
    }

    #[test]
    fn test_from_str_strips_at_sign() {
        let handle: Handle = "@carrot".parse().unwrap();
        assert_eq!(handle.as_str(), "carrot");
    }
}
