//! Notification list and unread badge.

use std::sync::Arc;
use std::time::Duration;

use nijitter_core::{Location, Notification};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{instrument, warn};

use crate::api::NijitterApi;
use crate::error::ApiError;

/// Number of notifications fetched for the list.
pub const NOTIFICATION_LIMIT: u32 = 20;

/// How often the unread badge is refreshed.
pub const UNREAD_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Notification list plus the unread counter shown on the badge.
///
/// The counter is published on a [`watch`] channel so any number of views
/// can follow it.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    api: NijitterApi,
    unread: Arc<watch::Sender<u32>>,
}

impl NotificationCenter {
    #[must_use]
    pub fn new(api: NijitterApi) -> Self {
        let (unread, _) = watch::channel(0);
        Self {
            api,
            unread: Arc::new(unread),
        }
    }

    /// Last known unread count.
    #[must_use]
    pub fn unread(&self) -> u32 {
        *self.unread.borrow()
    }

    /// Follow the unread count.
    #[must_use]
    pub fn subscribe_unread(&self) -> watch::Receiver<u32> {
        self.unread.subscribe()
    }

    /// Fetch the most recent notifications.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Notification>, ApiError> {
        let response = self.api.get_notifications(Some(NOTIFICATION_LIMIT)).await?;
        Ok(response.notifications)
    }

    /// Fetch the unread count and publish it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails; the published count is kept.
    #[instrument(skip(self))]
    pub async fn refresh_unread(&self) -> Result<u32, ApiError> {
        let count = self.api.get_unread_notification_count().await?;
        self.unread.send_replace(count);
        Ok(count)
    }

    /// Open a notification: mark it read if needed, refresh the badge, and
    /// return the carrot page it points to.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if marking it read fails.
    #[instrument(skip(self, notification), fields(notification_id = %notification.id))]
    pub async fn open(&self, notification: &Notification) -> Result<Option<Location>, ApiError> {
        if !notification.is_read {
            self.api.mark_notification_as_read(notification.id).await?;
            if let Err(e) = self.refresh_unread().await {
                warn!(error = %e, "Failed to refresh unread count");
            }
        }
        Ok(notification.target())
    }

    /// Refresh the unread count now and then every `every`.
    ///
    /// Failed refreshes are logged and retried on the next tick. Polling
    /// stops once the session is gone (401), since the user has been sent
    /// to the login page.
    pub fn spawn_polling(&self, every: Duration) -> JoinHandle<()> {
        let center = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                match center.refresh_unread().await {
                    Ok(_) => {}
                    Err(ApiError::Unauthorized) => break,
                    Err(e) => warn!(error = %e, "Failed to update notification badge"),
                }
            }
        })
    }
}
