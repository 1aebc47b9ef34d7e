//! Session shopping cart.

use std::sync::Arc;

use tracing::{debug, instrument};

use campus_market_core::{Naira, ProductId};

use crate::error::{Entity, MarketError, Result};
use crate::models::{CartItem, Product};
use crate::persistence::{CART_KEY, KeyValuePersistence, StorageError};
use crate::store::PersistentStore;

/// Price breakdown shown before checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    pub subtotal: Naira,
    pub shipping: Naira,
    pub tax: Naira,
    pub total: Naira,
}

/// Cart lines, one per product.
pub struct CartStore {
    store: PersistentStore<CartItem>,
}

impl CartStore {
    /// Load the persisted cart (empty when absent).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub fn load(persistence: Arc<dyn KeyValuePersistence>) -> std::result::Result<Self, StorageError> {
        Ok(Self {
            store: PersistentStore::load(persistence, CART_KEY, Vec::new())?,
        })
    }

    /// Current lines, in the order they were added.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        self.store.items()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.items().is_empty()
    }

    /// Add `quantity` units, merging with an existing line for the product.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Validation` for zero quantity,
    /// `MarketError::OutOfStock` if the resulting quantity exceeds stock, or
    /// `MarketError::Storage` if persisting fails.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_to_cart(&mut self, product: &Product, quantity: u32) -> Result<CartItem> {
        if quantity == 0 {
            return Err(MarketError::Validation(
                "quantity must be at least 1".to_string(),
            ));
        }
        let in_cart = self.quantity_of(&product.id);
        let requested = in_cart.saturating_add(quantity);
        check_stock(product, requested)?;

        let line = self.store.mutate(|items| {
            if let Some(line) = items.iter_mut().find(|i| i.product.id == product.id) {
                line.quantity = requested;
                line.product = product.clone();
                line.clone()
            } else {
                let line = CartItem::new(product.clone(), requested);
                items.push(line.clone());
                line
            }
        })?;

        debug!(quantity = line.quantity, "Cart line updated");
        Ok(line)
    }

    /// Set a line's quantity; zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` if the product is not in the cart,
    /// `MarketError::OutOfStock` if `quantity` exceeds stock, or
    /// `MarketError::Storage` if persisting fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return self.remove_from_cart(product_id);
        }
        let line = self
            .line(product_id)
            .ok_or_else(|| MarketError::not_found(Entity::CartItem, product_id))?;
        check_stock(&line.product, quantity)?;

        self.store.mutate(|items| {
            if let Some(line) = items.iter_mut().find(|i| &i.product.id == product_id) {
                line.quantity = quantity;
            }
        })?;
        Ok(())
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` if the product is not in the cart or
    /// `MarketError::Storage` if persisting fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn remove_from_cart(&mut self, product_id: &ProductId) -> Result<()> {
        if self.line(product_id).is_none() {
            return Err(MarketError::not_found(Entity::CartItem, product_id));
        }
        self.store
            .mutate(|items| items.retain(|i| &i.product.id != product_id))?;
        Ok(())
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Storage` if persisting fails.
    pub fn clear_cart(&mut self) -> Result<()> {
        self.store.mutate(Vec::clear)?;
        Ok(())
    }

    /// Sum of line totals.
    #[must_use]
    pub fn total_price(&self) -> Naira {
        self.items().iter().map(CartItem::line_total).sum()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items()
            .iter()
            .fold(0, |total, i| total.saturating_add(i.quantity))
    }

    /// Subtotal plus flat `shipping`; no tax is charged. Shipping is waived
    /// for an empty cart.
    #[must_use]
    pub fn summary(&self, shipping: Naira) -> CartSummary {
        let subtotal = self.total_price();
        let shipping = if self.is_empty() { Naira::ZERO } else { shipping };
        let tax = Naira::ZERO;
        CartSummary {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }

    fn line(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.store.find(|i| &i.product.id == product_id)
    }

    fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.line(product_id).map_or(0, |i| i.quantity)
    }
}

fn check_stock(product: &Product, requested: u32) -> Result<()> {
    let available = product.available();
    if requested > available {
        return Err(MarketError::OutOfStock {
            product_id: product.id.clone(),
            requested,
            available,
        });
    }
    Ok(())
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("store", &self.store)
            .finish()
    }
}
