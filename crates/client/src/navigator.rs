//! Navigation and alert hooks.
//!
//! The request pipeline redirects to the login page on 401 and alerts the
//! user when the service is outside its usage hours. Front ends decide what
//! that means: a terminal prints a hint, a test records the call.

use nijitter_core::Location;

/// Receiver for redirects and alerts raised by the client.
pub trait Navigator: Send + Sync {
    /// Move the user to `location`.
    fn navigate(&self, location: &Location);

    /// Show a blocking message to the user.
    fn alert(&self, message: &str);
}

/// Navigator that only logs. Used when no front end is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, location: &Location) {
        tracing::info!(path = %location, "navigate");
    }

    fn alert(&self, message: &str) {
        tracing::warn!(message, "alert");
    }
}
