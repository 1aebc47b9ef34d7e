//! Domain models for the marketplace.
//!
//! Field names serialise in camelCase so persisted collections keep the
//! layout the storefront has always written (`shopId`, `unreadCount`, ...).

pub mod cart;
pub mod message;
pub mod order;
pub mod payout;
pub mod product;
pub mod shop;
pub mod user;

pub use cart::CartItem;
pub use message::{ChatThread, Message};
pub use order::Order;
pub use payout::Payout;
pub use product::Product;
pub use shop::{BankDetails, Shop};
pub use user::User;
