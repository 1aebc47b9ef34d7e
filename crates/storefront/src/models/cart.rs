//! Cart line item.

use serde::{Deserialize, Serialize};

use campus_market_core::Naira;

use super::product::Product;
use crate::store::Validate;

/// A product plus the quantity in the cart (always at least 1).
///
/// Orders keep a snapshot of these lines as they were at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// Create a line for `quantity` units of `product`.
    #[must_use]
    pub const fn new(product: Product, quantity: u32) -> Self {
        Self { product, quantity }
    }

    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Naira {
        self.product.price * self.quantity
    }
}

impl Validate for CartItem {
    fn validate(&self) -> Result<(), String> {
        if self.quantity == 0 {
            return Err(format!("cart line {} has zero quantity", self.product.id));
        }
        self.product.validate()
    }
}
