//! Notification records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::location::Location;
use crate::types::{AccountId, CarrotId, NotificationId};

/// What triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Like,
    Reply,
    Follow,
    /// A kind this client does not know about yet.
    #[serde(other)]
    Unknown,
}

/// A single entry of the notification list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub actor_id: AccountId,
    pub actor_name: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub carrot_id: Option<CarrotId>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Human readable message for the notification list.
    #[must_use]
    pub fn message(&self) -> String {
        let actor = &self.actor_name;
        match self.kind {
            NotificationKind::Like => format!("{actor} liked your carrot"),
            NotificationKind::Reply => format!("{actor} replied to your carrot"),
            NotificationKind::Follow => format!("{actor} followed you"),
            NotificationKind::Unknown => "You have a new notification".to_owned(),
        }
    }

    /// Where opening this notification should lead, if anywhere.
    #[must_use]
    pub const fn target(&self) -> Option<Location> {
        match self.carrot_id {
            Some(id) => Some(Location::Carrot(id)),
            None => None,
        }
    }
}
