//! Business logic services for the marketplace.
//!
//! # Services
//!
//! - `auth` - Mock sign-in, registration and the persisted session
//! - `cart` - Session cart with stock checks
//! - `catalog` - Read-only product listing, search and filtering
//! - `checkout` - Cart to per-shop orders
//! - `messaging` - Threads, messages and unread counts
//! - `orders` - Order lifecycle and payment steps
//! - `payouts` - Seller balance, payout requests and dashboard figures
//! - `shops` - Shop directory

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod messaging;
pub mod orders;
pub mod payouts;
pub mod shops;
