//! Order lifecycle.
//!
//! Orders move through a fixed transition table
//! (see [`OrderStatus::can_transition_to`]):
//!
//! ```text
//! pending -> awaiting_payment -> confirmed -> delivered
//!    \              \                \
//!     `--------------`----------------`--> cancelled
//! ```
//!
//! Payment is two explicit steps: the buyer submits proof (the order stays
//! in `awaiting_payment`) and the seller confirms it (`confirmed`).

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{info, instrument};

use campus_market_core::{Naira, NotificationKind, OrderId, OrderStatus, ShopId, UserId};

use crate::error::{Entity, MarketError, Result};
use crate::models::{CartItem, Order};
use crate::notify::{Notification, NotificationScheduler};
use crate::persistence::{KeyValuePersistence, ORDERS_KEY, StorageError};
use crate::store::PersistentStore;

/// Input for [`OrderLifecycle::create_order`].
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub shop_id: ShopId,
    pub items: Vec<CartItem>,
    pub total_amount: Naira,
    /// Defaults to `awaiting_payment`; only `pending` is accepted otherwise.
    pub status: Option<OrderStatus>,
}

/// Timestamp for the next write: now, or one millisecond past `previous`
/// if the clock has not moved on.
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + TimeDelta::milliseconds(1)
    }
}

/// Order store plus the status state machine on top of it.
pub struct OrderLifecycle {
    store: PersistentStore<Order>,
    scheduler: Arc<NotificationScheduler>,
    notify_delay: Duration,
}

impl OrderLifecycle {
    /// Load persisted orders, falling back to `seed`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub fn load(
        persistence: Arc<dyn KeyValuePersistence>,
        seed: Vec<Order>,
        scheduler: Arc<NotificationScheduler>,
        notify_delay: Duration,
    ) -> std::result::Result<Self, StorageError> {
        Ok(Self {
            store: PersistentStore::load(persistence, ORDERS_KEY, seed)?,
            scheduler,
            notify_delay,
        })
    }

    /// Every order, oldest first.
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        self.store.items()
    }

    /// Place a new order and notify the seller.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Validation` if the order has no items, a line
    /// has zero quantity, the total does not match the items, buyer and
    /// seller are the same user, or the initial status is not `pending` or
    /// `awaiting_payment`. Returns `MarketError::Storage` if persisting fails.
    #[instrument(skip(self, new), fields(buyer_id = %new.buyer_id, shop_id = %new.shop_id))]
    pub fn create_order(&mut self, new: NewOrder) -> Result<Order> {
        let status = new.status.unwrap_or_default();
        if !matches!(status, OrderStatus::Pending | OrderStatus::AwaitingPayment) {
            return Err(MarketError::Validation(format!(
                "new orders start as pending or awaiting_payment, not {status}"
            )));
        }
        if new.items.is_empty() {
            return Err(MarketError::Validation("order has no items".to_string()));
        }
        if let Some(line) = new.items.iter().find(|item| item.quantity == 0) {
            return Err(MarketError::Validation(format!(
                "product {} has zero quantity",
                line.product.id
            )));
        }
        if new.buyer_id == new.seller_id {
            return Err(MarketError::Validation(
                "buyer and seller must be different users".to_string(),
            ));
        }
        let items_total: Naira = new.items.iter().map(CartItem::line_total).sum();
        if !items_total.is_within_limit() {
            return Err(MarketError::Validation(format!(
                "order total exceeds {}",
                Naira::new(Naira::MAX_WHOLE)
            )));
        }
        if items_total != new.total_amount {
            return Err(MarketError::Validation(format!(
                "total {} does not match items {items_total}",
                new.total_amount
            )));
        }

        let now = Utc::now();
        let order = Order {
            id: OrderId::generate(),
            buyer_id: new.buyer_id,
            seller_id: new.seller_id,
            shop_id: new.shop_id,
            items: new.items,
            total_amount: new.total_amount,
            status,
            payment_screenshot: None,
            created_at: now,
            updated_at: now,
        };

        self.store.mutate(|orders| orders.push(order.clone()))?;

        info!(order_id = %order.id, total = %order.total_amount, "Order created");
        self.scheduler.schedule(
            Notification {
                recipient: order.seller_id.clone(),
                kind: NotificationKind::Order,
                title: "New Order!".to_string(),
                body: format!("You have a new order for {}", order.total_amount),
                tag: Some(order.id.to_string()),
            },
            self.notify_delay,
        );

        Ok(order)
    }

    /// Move an order to `status` if the transition table allows it.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` for an unknown id (nothing changes),
    /// `MarketError::InvalidTransition` for a disallowed move, or
    /// `MarketError::Storage` if persisting fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub fn update_order_status(&mut self, id: &OrderId, status: OrderStatus) -> Result<Order> {
        let current = self.require(id)?;
        if !current.status.can_transition_to(status) {
            return Err(MarketError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }

        let mut updated = current.clone();
        updated.status = status;
        updated.updated_at = next_timestamp(current.updated_at);
        self.replace(updated.clone())?;

        info!(from = %current.status, to = %status, "Order status updated");
        Ok(updated)
    }

    /// Record the buyer's proof of transfer and notify the seller.
    ///
    /// The order stays in `awaiting_payment` until the seller confirms it.
    /// Submitting again replaces the earlier proof.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` for an unknown id,
    /// `MarketError::Validation` if the order is not awaiting payment or the
    /// screenshot is empty, or `MarketError::Storage` if persisting fails.
    #[instrument(skip(self, screenshot), fields(order_id = %id))]
    pub fn submit_payment_proof(&mut self, id: &OrderId, screenshot: String) -> Result<Order> {
        let current = self.require(id)?;
        if current.status != OrderStatus::AwaitingPayment {
            return Err(MarketError::Validation(format!(
                "order {id} is {}, payment proof is only accepted while awaiting payment",
                current.status
            )));
        }
        if screenshot.trim().is_empty() {
            return Err(MarketError::Validation(
                "payment screenshot is empty".to_string(),
            ));
        }

        let mut updated = current.clone();
        updated.payment_screenshot = Some(screenshot);
        updated.updated_at = next_timestamp(current.updated_at);
        self.replace(updated.clone())?;

        info!("Payment proof submitted");
        self.scheduler.schedule(
            Notification {
                recipient: updated.seller_id.clone(),
                kind: NotificationKind::Payment,
                title: "Payment Submitted".to_string(),
                body: format!(
                    "A buyer sent proof of payment for {} on order {}",
                    updated.total_amount, updated.id
                ),
                tag: Some(updated.id.to_string()),
            },
            self.notify_delay,
        );

        Ok(updated)
    }

    /// Seller confirms the payment: `awaiting_payment -> confirmed`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::update_order_status`].
    pub fn confirm_payment(&mut self, id: &OrderId) -> Result<Order> {
        let order = self.update_order_status(id, OrderStatus::Confirmed)?;
        self.scheduler.schedule(
            Notification {
                recipient: order.buyer_id.clone(),
                kind: NotificationKind::Payment,
                title: "Payment Confirmed".to_string(),
                body: format!("Your payment of {} was confirmed", order.total_amount),
                tag: Some(order.id.to_string()),
            },
            self.notify_delay,
        );
        Ok(order)
    }

    /// Cancel a non-terminal order.
    ///
    /// # Errors
    ///
    /// Same as [`Self::update_order_status`].
    pub fn cancel_order(&mut self, id: &OrderId) -> Result<Order> {
        self.update_order_status(id, OrderStatus::Cancelled)
    }

    /// Mark a confirmed order as delivered.
    ///
    /// # Errors
    ///
    /// Same as [`Self::update_order_status`].
    pub fn mark_delivered(&mut self, id: &OrderId) -> Result<Order> {
        self.update_order_status(id, OrderStatus::Delivered)
    }

    /// Look up an order.
    #[must_use]
    pub fn get_order_by_id(&self, id: &OrderId) -> Option<&Order> {
        self.store.find(|o| &o.id == id)
    }

    /// Orders placed by `buyer`.
    #[must_use]
    pub fn get_buyer_orders(&self, buyer: &UserId) -> Vec<Order> {
        self.store.filter(|o| &o.buyer_id == buyer)
    }

    /// Orders received by `seller`.
    #[must_use]
    pub fn get_seller_orders(&self, seller: &UserId) -> Vec<Order> {
        self.store.filter(|o| &o.seller_id == seller)
    }

    fn require(&self, id: &OrderId) -> Result<Order> {
        self.get_order_by_id(id)
            .cloned()
            .ok_or_else(|| MarketError::not_found(Entity::Order, id))
    }

    fn replace(&mut self, updated: Order) -> Result<()> {
        self.store.mutate(|orders| {
            if let Some(slot) = orders.iter_mut().find(|o| o.id == updated.id) {
                *slot = updated;
            }
        })?;
        Ok(())
    }
}

impl std::fmt::Debug for OrderLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderLifecycle")
            .field("store", &self.store)
            .field("notify_delay", &self.notify_delay)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::product::fixtures::product;
    use crate::notify::RecordingNotifier;
    use crate::persistence::MemoryPersistence;

    struct Harness {
        orders: OrderLifecycle,
        recorder: RecordingNotifier,
        scheduler: Arc<NotificationScheduler>,
        persistence: Arc<dyn KeyValuePersistence>,
    }

    fn harness() -> Harness {
        let recorder = RecordingNotifier::new();
        let scheduler = Arc::new(NotificationScheduler::new(Arc::new(recorder.clone())));
        let persistence: Arc<dyn KeyValuePersistence> = Arc::new(MemoryPersistence::new());
        let orders = OrderLifecycle::load(
            Arc::clone(&persistence),
            Vec::new(),
            Arc::clone(&scheduler),
            Duration::from_millis(500),
        )
        .unwrap();
        Harness {
            orders,
            recorder,
            scheduler,
            persistence,
        }
    }

    fn headphones_order() -> NewOrder {
        NewOrder {
            buyer_id: UserId::new("buyer1"),
            seller_id: UserId::new("seller1"),
            shop_id: ShopId::new("s001"),
            items: vec![CartItem::new(product("1", "s001", 35_000, 15), 1)],
            total_amount: Naira::new(35_000),
            status: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_order_defaults_and_notifies_seller() {
        let mut h = harness();
        let order = h.orders.create_order(headphones_order()).unwrap();

        assert_eq!(order.total_amount, Naira::new(35_000));
        assert_eq!(order.status, OrderStatus::AwaitingPayment);
        assert_eq!(order.created_at, order.updated_at);
        assert!(order.id.as_str().starts_with("ord_"));

        h.scheduler.drain().await;
        let delivered = h.recorder.delivered();
        assert_eq!(delivered.len(), 1);
        let note = delivered.first().unwrap();
        assert_eq!(note.recipient, UserId::new("seller1"));
        assert_eq!(note.title, "New Order!");
        assert_eq!(note.body, "You have a new order for ₦35,000");
        assert_eq!(note.tag.as_deref(), Some(order.id.as_str()));
    }

    #[tokio::test]
    async fn test_rapid_creates_get_distinct_ids() {
        let mut h = harness();
        let a = h.orders.create_order(headphones_order()).unwrap();
        let b = h.orders.create_order(headphones_order()).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(h.orders.orders().len(), 2);
    }

    #[test]
    fn test_create_order_validation() {
        let mut h = harness();

        let mut wrong_total = headphones_order();
        wrong_total.total_amount = Naira::new(30_000);
        assert!(matches!(
            h.orders.create_order(wrong_total),
            Err(MarketError::Validation(_))
        ));

        let mut empty = headphones_order();
        empty.items.clear();
        empty.total_amount = Naira::ZERO;
        assert!(matches!(
            h.orders.create_order(empty),
            Err(MarketError::Validation(_))
        ));

        let mut confirmed = headphones_order();
        confirmed.status = Some(OrderStatus::Confirmed);
        assert!(matches!(
            h.orders.create_order(confirmed),
            Err(MarketError::Validation(_))
        ));

        let mut self_order = headphones_order();
        self_order.seller_id = UserId::new("buyer1");
        assert!(h.orders.create_order(self_order).is_err());

        let mut oversized = headphones_order();
        oversized.items = vec![CartItem::new(product("1", "s001", Naira::MAX_WHOLE, 15), 2)];
        oversized.total_amount = Naira::new(Naira::MAX_WHOLE) * 2;
        assert!(matches!(
            h.orders.create_order(oversized),
            Err(MarketError::Validation(_))
        ));

        assert!(h.orders.orders().is_empty());
    }

    #[tokio::test]
    async fn test_pending_initial_status_allowed() {
        let mut h = harness();
        let mut pending = headphones_order();
        pending.status = Some(OrderStatus::Pending);
        let order = h.orders.create_order(pending).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);

        let order = h
            .orders
            .update_order_status(&order.id, OrderStatus::AwaitingPayment)
            .unwrap();
        assert_eq!(order.status, OrderStatus::AwaitingPayment);
    }

    #[tokio::test]
    async fn test_update_status_strictly_bumps_updated_at() {
        let mut h = harness();
        let order = h.orders.create_order(headphones_order()).unwrap();

        let confirmed = h.orders.confirm_payment(&order.id).unwrap();
        assert!(confirmed.updated_at > order.updated_at);

        let delivered = h.orders.mark_delivered(&order.id).unwrap();
        assert!(delivered.updated_at > confirmed.updated_at);
        assert!(delivered.updated_at >= delivered.created_at);
    }

    #[tokio::test]
    async fn test_invalid_transition_rejected() {
        let mut h = harness();
        let order = h.orders.create_order(headphones_order()).unwrap();

        let err = h.orders.mark_delivered(&order.id).unwrap_err();
        assert!(matches!(
            err,
            MarketError::InvalidTransition {
                from: OrderStatus::AwaitingPayment,
                to: OrderStatus::Delivered
            }
        ));

        h.orders.cancel_order(&order.id).unwrap();
        assert!(h.orders.confirm_payment(&order.id).is_err());
        assert_eq!(
            h.orders.get_order_by_id(&order.id).unwrap().status,
            OrderStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn test_update_unknown_order_is_not_found_and_changes_nothing() {
        let mut h = harness();
        let order = h.orders.create_order(headphones_order()).unwrap();
        let before = h.orders.orders().to_vec();

        let err = h
            .orders
            .update_order_status(&OrderId::new("ord_missing"), OrderStatus::Confirmed)
            .unwrap_err();
        assert!(matches!(err, MarketError::NotFound { entity: Entity::Order, .. }));
        assert_eq!(h.orders.orders(), before.as_slice());
        assert_eq!(
            h.orders.get_order_by_id(&order.id).unwrap().status,
            OrderStatus::AwaitingPayment
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_payment_proof_then_confirmation() {
        let mut h = harness();
        let order = h.orders.create_order(headphones_order()).unwrap();

        let proof = h
            .orders
            .submit_payment_proof(&order.id, "data:image/png;base64,iVBORw0KGgo=".to_string())
            .unwrap();
        assert_eq!(proof.status, OrderStatus::AwaitingPayment);
        assert!(proof.has_payment_proof());
        assert!(proof.updated_at > order.updated_at);

        let confirmed = h.orders.confirm_payment(&order.id).unwrap();
        assert_eq!(confirmed.status, OrderStatus::Confirmed);
        assert_eq!(confirmed.payment_screenshot, proof.payment_screenshot);

        assert!(
            h.orders
                .submit_payment_proof(&order.id, "data:image/png;base64,AA==".to_string())
                .is_err()
        );

        h.scheduler.drain().await;
        let to_seller = h.recorder.delivered_to(&UserId::new("seller1"));
        let to_buyer = h.recorder.delivered_to(&UserId::new("buyer1"));
        assert_eq!(to_seller.len(), 2);
        assert_eq!(to_buyer.len(), 1);
        assert_eq!(to_buyer.first().unwrap().kind, NotificationKind::Payment);
    }

    #[tokio::test]
    async fn test_empty_screenshot_rejected() {
        let mut h = harness();
        let order = h.orders.create_order(headphones_order()).unwrap();
        assert!(matches!(
            h.orders.submit_payment_proof(&order.id, "  ".to_string()),
            Err(MarketError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_queries_filter_by_party() {
        let mut h = harness();
        h.orders.create_order(headphones_order()).unwrap();
        let mut other = headphones_order();
        other.buyer_id = UserId::new("buyer2");
        other.seller_id = UserId::new("seller2");
        h.orders.create_order(other).unwrap();

        assert_eq!(h.orders.get_buyer_orders(&UserId::new("buyer1")).len(), 1);
        assert_eq!(h.orders.get_seller_orders(&UserId::new("seller2")).len(), 1);
        assert!(h.orders.get_seller_orders(&UserId::new("buyer1")).is_empty());
    }

    #[tokio::test]
    async fn test_orders_survive_reload() {
        let mut h = harness();
        let order = h.orders.create_order(headphones_order()).unwrap();
        h.orders.confirm_payment(&order.id).unwrap();

        let reloaded = OrderLifecycle::load(
            Arc::clone(&h.persistence),
            Vec::new(),
            Arc::clone(&h.scheduler),
            Duration::ZERO,
        )
        .unwrap();
        assert_eq!(reloaded.orders(), h.orders.orders());
    }

    #[test]
    fn test_next_timestamp_never_goes_backwards() {
        let future = Utc::now() + TimeDelta::hours(1);
        assert_eq!(next_timestamp(future), future + TimeDelta::milliseconds(1));
        let past = Utc::now() - TimeDelta::hours(1);
        assert!(next_timestamp(past) > past);
    }
}
