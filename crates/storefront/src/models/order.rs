//! Order placed at checkout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_market_core::{Naira, OrderId, OrderStatus, ShopId, UserId};

use super::cart::CartItem;
use crate::store::Validate;

/// An order from one buyer to one shop.
///
/// `total_amount` is fixed at creation; it is not recomputed if the item
/// snapshot is edited later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub shop_id: ShopId,
    pub items: Vec<CartItem>,
    pub total_amount: Naira,
    pub status: OrderStatus,
    /// Proof of bank transfer as a data URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_screenshot: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Sum of price times quantity over the item snapshot.
    #[must_use]
    pub fn items_total(&self) -> Naira {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Whether the buyer has uploaded proof of payment.
    #[must_use]
    pub const fn has_payment_proof(&self) -> bool {
        self.payment_screenshot.is_some()
    }

    /// Whether `user` is the buyer or the seller.
    #[must_use]
    pub fn involves(&self, user: &UserId) -> bool {
        &self.buyer_id == user || &self.seller_id == user
    }
}

impl Validate for Order {
    fn validate(&self) -> Result<(), String> {
        if self.updated_at < self.created_at {
            return Err(format!("order {} updated before it was created", self.id));
        }
        if self.buyer_id == self.seller_id {
            return Err(format!("order {} buyer and seller are the same user", self.id));
        }
        if !self.total_amount.is_within_limit() {
            return Err(format!("order {} total is out of range", self.id));
        }
        self.items
            .iter()
            .try_for_each(Validate::validate)
            .map_err(|e| format!("order {}: {e}", self.id))
    }
}
