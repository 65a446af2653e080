//! Navigation targets.
//!
//! The page-shell server routes these paths and the clients navigate to them
//! (after a 401, after login, when a notification is opened).

use core::fmt;

use url::Url;

use crate::types::{CarrotId, Handle};

/// A page of the web application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    /// Timeline (`/`).
    Home,
    Login,
    Signup,
    Verify,
    /// Shown outside of usage hours.
    Night,
    Error,
    Success,
    Carrot(CarrotId),
    User(Handle),
}

impl Location {
    /// Path of the page relative to the site root.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_owned(),
            Self::Login => "/login".to_owned(),
            Self::Signup => "/signup".to_owned(),
            Self::Verify => "/verify".to_owned(),
            Self::Night => "/night".to_owned(),
            Self::Error => "/error".to_owned(),
            Self::Success => "/success".to_owned(),
            Self::Carrot(id) => format!("/carrot/{id}"),
            Self::User(handle) => format!("/user/{handle}"),
        }
    }

    /// Absolute URL of the page under `origin`, used for share links.
    ///
    /// # Errors
    ///
    /// Returns an error if `origin` cannot be a base URL.
    pub fn url(&self, origin: &Url) -> Result<Url, url::ParseError> {
        origin.join(&self.path())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(Location::Home.path(), "/");
        assert_eq!(Location::Login.path(), "/login");
        assert_eq!(Location::Carrot(CarrotId::new(9)).path(), "/carrot/9");
        assert_eq!(
            Location::User(Handle::parse("usagi").unwrap()).path(),
            "/user/usagi"
        );
    }

    #[test]
    fn test_share_url_ignores_origin_path() {
        let origin = Url::parse("https://nijitter.example/some/page").unwrap();
        let url = Location::Carrot(CarrotId::new(3)).url(&origin).unwrap();
        assert_eq!(url.as_str(), "https://nijitter.example/carrot/3");
    }
}
