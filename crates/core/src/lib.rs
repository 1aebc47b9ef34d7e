//! Campus Market Core - Shared types library.
//!
//! This crate provides common types used across all Campus Market components:
//! - `storefront` - Stores, order lifecycle, messaging and notifications
//! - `cli` - Command-line driver over a file-backed marketplace
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no persistence,
//! no timers. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

// Used by `define_id!` so callers do not need their own `uuid` dependency.
#[doc(hidden)]
pub use uuid as __uuid;
