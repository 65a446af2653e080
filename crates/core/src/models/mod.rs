//! JSON records mirrored from the REST API.
//!
//! Entities are created from server responses, held in transient in-memory
//! lists and discarded on reload. Field names follow the wire format.

pub mod carrot;
pub mod envelope;
pub mod notification;
pub mod user;

pub use carrot::Carrot;
pub use envelope::*;
pub use notification::{Notification, NotificationKind};
pub use user::{ProfileUpdate, UserProfile};
