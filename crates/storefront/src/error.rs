//! Unified error handling for marketplace operations.
//!
//! Every store mutator returns `Result<T, MarketError>`. Lookups that simply
//! find nothing return `Option`; mutators aimed at a missing entity return
//! [`MarketError::NotFound`] instead of silently doing nothing.

use thiserror::Error;

use campus_market_core::{Naira, OrderStatus, ProductId};

use crate::persistence::StorageError;
use crate::services::auth::AuthError;

/// Kind of entity a [`MarketError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Order,
    Thread,
    Shop,
    Product,
    CartItem,
    Payout,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Order => write!(f, "order"),
            Self::Thread => write!(f, "thread"),
            Self::Shop => write!(f, "shop"),
            Self::Product => write!(f, "product"),
            Self::CartItem => write!(f, "cart item"),
            Self::Payout => write!(f, "payout"),
        }
    }
}

/// Application-level error type for the marketplace.
#[derive(Debug, Error)]
pub enum MarketError {
    /// Persistence backend failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Entity does not exist.
    #[error("Not found: {entity} {id}")]
    NotFound { entity: Entity, id: String },

    /// Requested order status change is not in the transition table.
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// No user is signed in.
    #[error("Unauthenticated: sign in first")]
    Unauthenticated,

    /// The signed-in user may not act on this entity.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Input violates an entity invariant.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not enough stock for the requested quantity.
    #[error("Out of stock: product {product_id} has {available}, requested {requested}")]
    OutOfStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// Payout larger than the seller's available balance.
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Naira, available: Naira },

    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A simulated request was cancelled before it completed.
    #[error("Request cancelled")]
    Cancelled,
}

impl MarketError {
    /// Shorthand for [`MarketError::NotFound`].
    pub fn not_found(entity: Entity, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Whether the error was caused by the caller's input or state, as
    /// opposed to an infrastructure failure.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        match self {
            Self::Storage(_) => false,
            Self::Auth(err) => !matches!(err, AuthError::Storage(_)),
            Self::NotFound { .. }
            | Self::InvalidTransition { .. }
            | Self::Unauthenticated
            | Self::Forbidden(_)
            | Self::Validation(_)
            | Self::OutOfStock { .. }
            | Self::InsufficientBalance { .. }
            | Self::EmptyCart
            | Self::Cancelled => true,
        }
    }
}

/// Result type alias for `MarketError`.
pub type Result<T> = std::result::Result<T, MarketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_error_display() {
        let err = MarketError::not_found(Entity::Order, "ord_missing");
        assert_eq!(err.to_string(), "Not found: order ord_missing");

        let err = MarketError::InvalidTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::Pending,
        };
        assert_eq!(err.to_string(), "Invalid transition: delivered -> pending");

        let err = MarketError::InsufficientBalance {
            requested: Naira::new(50_000),
            available: Naira::new(35_000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance: requested ₦50,000, available ₦35,000"
        );
    }

    #[test]
    fn test_user_error_classification() {
        assert!(MarketError::Unauthenticated.is_user_error());
        assert!(MarketError::EmptyCart.is_user_error());
        assert!(MarketError::Auth(AuthError::InvalidCredentials).is_user_error());
        assert!(!MarketError::Storage(StorageError::Poisoned).is_user_error());
        assert!(!MarketError::Auth(AuthError::Storage(StorageError::Poisoned)).is_user_error());
    }
}
