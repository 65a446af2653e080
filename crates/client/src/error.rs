//! Client error type.

use nijitter_core::{DraftError, EmailError, RegistrationError};
use thiserror::Error;

use crate::store::StoreError;

/// Errors returned by [`NijitterApi`](crate::NijitterApi) and the helpers
/// built on it.
///
/// Every failure is terminal for the action that triggered it; nothing is
/// retried.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401: the stored token was cleared and the user sent to `/login`.
    #[error("Unauthorized: login required")]
    Unauthorized,

    /// 403 for any reason other than usage hours.
    #[error("Forbidden: {}", .message.as_deref().unwrap_or("access denied"))]
    Forbidden { message: Option<String> },

    /// 403 `night_time_restricted`: the service is outside its usage hours.
    #[error("Outside usage hours, available again after {retry_after}")]
    TimeRestricted { retry_after: String },

    /// Any other non-2xx response.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// A login, signup or verification request was refused.
    #[error("{0}")]
    Auth(String),

    /// The request could not be sent or the response not read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A carrot draft was refused before any network call.
    #[error(transparent)]
    Draft(#[from] DraftError),

    /// A registration form was refused before any network call.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Credential storage error: {0}")]
    Store(#[from] StoreError),

    /// A file to upload could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// HTTP status of the response that caused this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Forbidden { .. } | Self::TimeRestricted { .. } => Some(403),
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True for errors raised by local validation, before any request.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Draft(_) | Self::Registration(_) | Self::Email(_)
        )
    }
}
