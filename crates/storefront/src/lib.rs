//! Campus Market storefront library.
//!
//! Client-side state for the campus marketplace: persisted stores for
//! orders, messages, shops, the cart and payouts, the order state machine,
//! and delayed notifications. [`state::Marketplace`] wires everything
//! together over a [`persistence::KeyValuePersistence`] backend.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod latency;
pub mod models;
pub mod notify;
pub mod persistence;
pub mod seed;
pub mod services;
pub mod state;
pub mod store;

pub use error::{MarketError, Result};
pub use state::Marketplace;
