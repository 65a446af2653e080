//! Notification list and unread badge.

use nijitter_client::{NotificationCenter, UNREAD_POLL_INTERVAL};
use nijitter_core::NotificationId;

use super::Context;
use crate::render::{format_notification, line, status};

/// List recent notifications.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn list(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let center = NotificationCenter::new(ctx.api.clone());
    let notifications = center.list().await?;
    if notifications.is_empty() {
        line("No notifications");
    }
    for notification in &notifications {
        line(&format_notification(notification));
    }
    Ok(())
}

/// Open a notification: mark it read and show what it points to.
///
/// # Errors
///
/// Returns an error if the notification is not among the recent ones or a
/// request fails.
pub async fn open(ctx: &Context, id: NotificationId) -> Result<(), Box<dyn std::error::Error>> {
    let center = NotificationCenter::new(ctx.api.clone());
    let notification = center
        .list()
        .await?
        .into_iter()
        .find(|n| n.id == id)
        .ok_or_else(|| format!("notification {id} not found among recent notifications"))?;

    line(&notification.message());
    if let Some(location) = center.open(&notification).await? {
        match location.url(&ctx.config.api_url) {
            Ok(url) => line(&format!("→ {url}")),
            Err(_) => line(&format!("→ {location}")),
        }
    }
    status(&format!("{} unread", center.unread()));
    Ok(())
}

/// Print the unread count.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn unread(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let center = NotificationCenter::new(ctx.api.clone());
    let count = center.refresh_unread().await?;
    line(&count.to_string());
    Ok(())
}

/// Poll the unread count and print it whenever it changes, until Ctrl+C.
///
/// # Errors
///
/// Returns an error if Ctrl+C handling cannot be installed.
pub async fn watch(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let center = NotificationCenter::new(ctx.api.clone());
    let mut unread = center.subscribe_unread();
    let poller = center.spawn_polling(UNREAD_POLL_INTERVAL);
    status("Watching notifications (Ctrl+C to stop)");

    let mut last = None;
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                break;
            }
            changed = unread.changed() => {
                if changed.is_err() {
                    break;
                }
                let count = *unread.borrow_and_update();
                if last != Some(count) {
                    line(&format!("{count} unread"));
                    last = Some(count);
                }
            }
        }
        if poller.is_finished() {
            break;
        }
    }

    poller.abort();
    Ok(())
}
