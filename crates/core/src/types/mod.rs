//! Core types for Nijitter.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cursor;
pub mod email;
pub mod handle;
pub mod id;

pub use cursor::Cursor;
pub use email::{Email, EmailError};
pub use handle::{Handle, HandleError};
pub use id::*;
