//! Seller payouts and the seller dashboard figures.
//!
//! A seller earns the totals of their confirmed and delivered orders. Every
//! payout request, pending or completed, is drawn against that revenue.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, instrument};

use campus_market_core::{Naira, OrderStatus, PayoutId, PayoutStatus, UserId};

use crate::error::{Entity, MarketError, Result};
use crate::models::{Order, Payout};
use crate::persistence::{KeyValuePersistence, PAYOUTS_KEY, StorageError};
use crate::store::PersistentStore;

/// Revenue the seller has earned from paid orders.
fn earned(seller: &UserId, orders: &[Order]) -> Naira {
    orders
        .iter()
        .filter(|o| &o.seller_id == seller && o.status.is_paid())
        .map(|o| o.total_amount)
        .sum()
}

/// Headline numbers for a seller's dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SellerDashboard {
    /// Orders still waiting for payment (`pending` or `awaiting_payment`).
    pub pending_orders: usize,
    pub confirmed_orders: usize,
    pub total_orders: usize,
    /// Sum of confirmed order totals.
    pub total_revenue: Naira,
    /// Confirmed revenue from orders placed on the given day.
    pub today_revenue: Naira,
    pub shop_count: usize,
    pub available_balance: Naira,
}

/// Payout requests.
pub struct PayoutLedger {
    store: PersistentStore<Payout>,
}

impl PayoutLedger {
    /// Load persisted payouts (empty when absent).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub fn load(persistence: Arc<dyn KeyValuePersistence>) -> std::result::Result<Self, StorageError> {
        Ok(Self {
            store: PersistentStore::load(persistence, PAYOUTS_KEY, Vec::new())?,
        })
    }

    /// Revenue from paid orders minus everything already requested.
    #[must_use]
    pub fn available_balance(&self, seller: &UserId, orders: &[Order]) -> Naira {
        let withdrawn: Naira = self
            .store
            .items()
            .iter()
            .filter(|p| &p.seller_id == seller)
            .map(|p| p.amount)
            .sum();
        earned(seller, orders) - withdrawn
    }

    /// Sum of the seller's payouts that have not been completed yet.
    #[must_use]
    pub fn pending_total(&self, seller: &UserId) -> Naira {
        self.store
            .items()
            .iter()
            .filter(|p| &p.seller_id == seller && p.status == PayoutStatus::Pending)
            .map(|p| p.amount)
            .sum()
    }

    /// Request a withdrawal of `amount`.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Validation` for a non-positive amount,
    /// `MarketError::InsufficientBalance` if it exceeds the available balance,
    /// or `MarketError::Storage` if persisting fails.
    #[instrument(skip(self, orders), fields(seller_id = %seller, amount = %amount))]
    pub fn request_payout(&mut self, seller: &UserId, amount: Naira, orders: &[Order]) -> Result<Payout> {
        if !amount.is_positive() {
            return Err(MarketError::Validation(
                "payout amount must be positive".to_string(),
            ));
        }
        let available = self.available_balance(seller, orders);
        if amount > available {
            return Err(MarketError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        let payout = Payout {
            id: PayoutId::generate(),
            seller_id: seller.clone(),
            amount,
            status: PayoutStatus::Pending,
            requested_at: Utc::now(),
            completed_at: None,
        };
        self.store.mutate(|payouts| payouts.push(payout.clone()))?;

        info!(payout_id = %payout.id, "Payout requested");
        Ok(payout)
    }

    /// Mark a pending payout as paid out.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` for an unknown id,
    /// `MarketError::Validation` if it is already completed, or
    /// `MarketError::Storage` if persisting fails.
    #[instrument(skip(self), fields(payout_id = %id))]
    pub fn complete_payout(&mut self, id: &PayoutId) -> Result<Payout> {
        let mut payout = self
            .store
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| MarketError::not_found(Entity::Payout, id))?;
        if payout.status == PayoutStatus::Completed {
            return Err(MarketError::Validation(format!(
                "payout {id} is already completed"
            )));
        }

        payout.status = PayoutStatus::Completed;
        payout.completed_at = Some(Utc::now());
        self.store.mutate(|payouts| {
            if let Some(slot) = payouts.iter_mut().find(|p| p.id == payout.id) {
                *slot = payout.clone();
            }
        })?;

        info!("Payout completed");
        Ok(payout)
    }

    /// Look up a payout by id.
    #[must_use]
    pub fn get_payout_by_id(&self, id: &PayoutId) -> Option<&Payout> {
        self.store.find(|p| &p.id == id)
    }

    /// A seller's payouts, newest first.
    #[must_use]
    pub fn payouts_for(&self, seller: &UserId) -> Vec<Payout> {
        let mut payouts = self.store.filter(|p| &p.seller_id == seller);
        payouts.reverse();
        payouts
    }

    /// Dashboard figures for `seller` as of `today`.
    #[must_use]
    pub fn seller_dashboard(
        &self,
        seller: &UserId,
        orders: &[Order],
        shop_count: usize,
        today: NaiveDate,
    ) -> SellerDashboard {
        let mine: Vec<&Order> = orders.iter().filter(|o| &o.seller_id == seller).collect();
        let confirmed: Vec<&Order> = mine
            .iter()
            .copied()
            .filter(|o| o.status == OrderStatus::Confirmed)
            .collect();

        SellerDashboard {
            pending_orders: mine
                .iter()
                .filter(|o| matches!(o.status, OrderStatus::Pending | OrderStatus::AwaitingPayment))
                .count(),
            confirmed_orders: confirmed.len(),
            total_orders: mine.len(),
            total_revenue: confirmed.iter().map(|o| o.total_amount).sum(),
            today_revenue: confirmed
                .iter()
                .filter(|o| o.created_at.date_naive() == today)
                .map(|o| o.total_amount)
                .sum(),
            shop_count,
            available_balance: self.available_balance(seller, orders),
        }
    }
}

impl std::fmt::Debug for PayoutLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayoutLedger")
            .field("store", &self.store)
            .finish()
    }
}
