//! Account verification rules.
//!
//! After signing up with an email address the user receives a token and
//! completes registration by choosing a handle, a display name and a
//! password. These checks run before `POST /auth/verify`.

use core::fmt;

use crate::models::VerifyRequest;
use crate::types::{Handle, HandleError};

/// Minimum password length, in characters.
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Reasons a registration form is refused locally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("invalid user id: {0}")]
    InvalidHandle(#[from] HandleError),
    #[error("verification token is missing")]
    MissingToken,
}

/// A registration that passed local validation.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    token: String,
    handle: Handle,
    username: String,
    password: String,
}

impl Registration {
    /// Validate the verification form.
    ///
    /// Checks run in the order the form reports them: password confirmation,
    /// password length, handle charset, then token presence.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`RegistrationError`].
    pub fn new(
        token: &str,
        handle: &str,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Self, RegistrationError> {
        if password != confirm_password {
            return Err(RegistrationError::PasswordMismatch);
        }

        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(RegistrationError::PasswordTooShort {
                min: MIN_PASSWORD_CHARS,
            });
        }

        let handle = Handle::parse(handle)?;

        let token = token.trim();
        if token.is_empty() {
            return Err(RegistrationError::MissingToken);
        }

        Ok(Self {
            token: token.to_owned(),
            handle,
            username: username.to_owned(),
            password: password.to_owned(),
        })
    }

    #[must_use]
    pub const fn handle(&self) -> &Handle {
        &self.handle
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Consume the registration into the request body.
    #[must_use]
    pub fn into_request(self) -> VerifyRequest {
        VerifyRequest {
            token: self.token,
            user_id: self.handle.as_str().to_owned(),
            username: self.username,
            password: self.password,
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("token", &"[REDACTED]")
            .field("handle", &self.handle)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_registration() {
        let reg = Registration::new("tok", "usagi_01", "Usagi", "carrots!", "carrots!").unwrap();
        assert_eq!(reg.handle().as_str(), "usagi_01");

        let body = reg.into_request();
        assert_eq!(body.user_id, "usagi_01");
        assert_eq!(body.password, "carrots!");
    }

    #[test]
    fn test_mismatch_reported_before_length() {
        assert_eq!(
            Registration::new("tok", "usagi", "Usagi", "short", "other"),
            Err(RegistrationError::PasswordMismatch)
        );
    }

    #[test]
    fn test_short_password() {
        assert_eq!(
            Registration::new("tok", "usagi", "Usagi", "1234567", "1234567"),
            Err(RegistrationError::PasswordTooShort { min: 8 })
        );
    }

    #[test]
    fn test_bad_handle() {
        assert!(matches!(
            Registration::new("tok", "うさぎ", "Usagi", "12345678", "12345678"),
            Err(RegistrationError::InvalidHandle(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let reg = Registration::new("tok", "usagi", "Usagi", "supersecret", "supersecret")
            .unwrap();
        let debug = format!("{reg:?}");
        assert!(!debug.contains("supersecret"));
        assert!(!debug.contains("tok\""));
    }
}
