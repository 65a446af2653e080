//! Nijitter Core - Shared domain types.
//!
//! This crate provides the types and rules used across all Nijitter components:
//! - `client` - REST API client, pagination state and credential storage
//! - `web` - Page-shell server (HTML shells, static assets, Slack signup gate)
//! - `cli` - Terminal front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Anything that validates user input before it hits
//! the network lives here so every front end enforces the same rules.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, handles, cursors and emails
//! - [`models`] - JSON records mirrored from the REST API
//! - [`compose`] - Carrot draft validation
//! - [`registration`] - Signup verification rules
//! - [`media`] - Image URL resolution
//! - [`location`] - Navigation targets shared by the page shells and clients

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod compose;
pub mod location;
pub mod media;
pub mod models;
pub mod registration;
pub mod types;

pub use compose::{CarrotDraft, CounterLevel, DraftError};
pub use location::Location;
pub use models::*;
pub use registration::{Registration, RegistrationError};
pub use types::*;
