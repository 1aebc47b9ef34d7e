//! Application context owning every store.
//!
//! A [`Marketplace`] is built once at startup over a persistence backend and
//! a notifier, passed explicitly to whoever needs it, and shut down at exit.
//! Operations that act on behalf of someone resolve the signed-in user
//! through the auth session and fail with [`MarketError::Unauthenticated`]
//! when nobody is signed in.

use std::sync::Arc;

use chrono::NaiveDate;
use secrecy::SecretString;
use tracing::info;

use campus_market_core::{Naira, OrderId, PayoutId, ProductId, ShopId, ThreadId, UserId, UserRole};

use crate::config::MarketConfig;
use crate::error::{Entity, MarketError, Result};
use crate::latency::{MockApi, SimulatedLatency};
use crate::models::{BankDetails, CartItem, ChatThread, Message, Order, Payout, Product, Shop, User};
use crate::notify::{NotificationScheduler, Notifier};
use crate::persistence::{KeyValuePersistence, StorageError};
use crate::seed::SeedData;
use crate::services::auth::{AuthSession, RegisterRequest};
use crate::services::cart::{CartStore, CartSummary};
use crate::services::catalog::Catalog;
use crate::services::checkout;
use crate::services::messaging::{Messaging, NewMessage};
use crate::services::orders::OrderLifecycle;
use crate::services::payouts::{PayoutLedger, SellerDashboard};
use crate::services::shops::{NewShop, ShopDirectory, ShopUpdate};

/// Shop details supplied by a seller; the owner is the signed-in user.
#[derive(Debug, Clone)]
pub struct ShopForm {
    pub name: String,
    pub description: String,
    pub banner: Option<String>,
    pub bank_details: BankDetails,
}

/// The marketplace: catalog, stores, session and notification scheduler.
pub struct Marketplace {
    config: MarketConfig,
    persistence: Arc<dyn KeyValuePersistence>,
    scheduler: Arc<NotificationScheduler>,
    catalog: Arc<Catalog>,
    api: MockApi,
    auth: AuthSession,
    orders: OrderLifecycle,
    messaging: Messaging,
    shops: ShopDirectory,
    cart: CartStore,
    payouts: PayoutLedger,
}

impl Marketplace {
    /// Load every store from `persistence`, using `seed` for anything not yet persisted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub fn open(
        config: MarketConfig,
        persistence: Arc<dyn KeyValuePersistence>,
        notifier: Arc<dyn Notifier>,
        seed: SeedData,
    ) -> std::result::Result<Self, StorageError> {
        let scheduler = Arc::new(NotificationScheduler::new(notifier));
        let catalog = Arc::new(Catalog::new(seed.products));
        let api = MockApi::new(Arc::clone(&catalog), SimulatedLatency::from(config.latency));

        let marketplace = Self {
            auth: AuthSession::load(Arc::clone(&persistence))?,
            orders: OrderLifecycle::load(
                Arc::clone(&persistence),
                seed.orders,
                Arc::clone(&scheduler),
                config.notifications.order_delay,
            )?,
            messaging: Messaging::load(
                Arc::clone(&persistence),
                seed.messages,
                seed.threads,
                Arc::clone(&scheduler),
                config.notifications.message_delay,
            )?,
            shops: ShopDirectory::load(Arc::clone(&persistence), seed.shops)?,
            cart: CartStore::load(Arc::clone(&persistence))?,
            payouts: PayoutLedger::load(Arc::clone(&persistence))?,
            config,
            persistence,
            scheduler,
            catalog,
            api,
        };

        info!(
            products = marketplace.catalog.list().len(),
            orders = marketplace.orders.orders().len(),
            shops = marketplace.shops.shops().len(),
            "Marketplace loaded"
        );
        Ok(marketplace)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn config(&self) -> &MarketConfig {
        &self.config
    }

    #[must_use]
    pub fn persistence(&self) -> &Arc<dyn KeyValuePersistence> {
        &self.persistence
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Catalog reads with simulated latency.
    #[must_use]
    pub const fn api(&self) -> &MockApi {
        &self.api
    }

    #[must_use]
    pub const fn auth(&self) -> &AuthSession {
        &self.auth
    }

    #[must_use]
    pub const fn orders(&self) -> &OrderLifecycle {
        &self.orders
    }

    #[must_use]
    pub const fn messaging(&self) -> &Messaging {
        &self.messaging
    }

    #[must_use]
    pub const fn shops(&self) -> &ShopDirectory {
        &self.shops
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    #[must_use]
    pub const fn payouts(&self) -> &PayoutLedger {
        &self.payouts
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Sign in (see [`AuthSession::login_as`]).
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Auth` if the credentials are rejected or the
    /// session cannot be persisted.
    pub fn login(&mut self, email: &str, password: &SecretString, role: UserRole) -> Result<User> {
        Ok(self.auth.login_as(email, password, role)?)
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Auth` if the form is invalid.
    pub fn register(&mut self, request: RegisterRequest) -> Result<User> {
        Ok(self.auth.register(request)?)
    }

    /// Sign out.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Auth` if the session key cannot be removed.
    pub fn logout(&mut self) -> Result<()> {
        Ok(self.auth.logout()?)
    }

    #[must_use]
    pub const fn current_user(&self) -> Option<&User> {
        self.auth.current_user()
    }

    fn acting_user(&self) -> Result<UserId> {
        Ok(self.auth.require_user()?.id.clone())
    }

    // =========================================================================
    // Cart & checkout
    // =========================================================================

    /// Add a catalog product to the cart.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` for an unknown product, or any error
    /// from [`CartStore::add_to_cart`].
    pub fn add_to_cart(&mut self, product_id: &ProductId, quantity: u32) -> Result<CartItem> {
        let product = self.product(product_id)?.clone();
        self.cart.add_to_cart(&product, quantity)
    }

    /// Change a cart line's quantity (zero removes it).
    ///
    /// # Errors
    ///
    /// See [`CartStore::update_quantity`].
    pub fn update_cart_quantity(&mut self, product_id: &ProductId, quantity: u32) -> Result<()> {
        self.cart.update_quantity(product_id, quantity)
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// See [`CartStore::remove_from_cart`].
    pub fn remove_from_cart(&mut self, product_id: &ProductId) -> Result<()> {
        self.cart.remove_from_cart(product_id)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Storage` if persisting fails.
    pub fn clear_cart(&mut self) -> Result<()> {
        self.cart.clear_cart()
    }

    /// Cart totals with the configured shipping estimate.
    #[must_use]
    pub fn cart_summary(&self) -> CartSummary {
        self.cart.summary(self.config.shipping_estimate)
    }

    /// Check out the cart as the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthenticated` when signed out, or any error
    /// from [`checkout::checkout`].
    pub fn checkout(&mut self) -> Result<Vec<Order>> {
        let buyer = self.acting_user()?;
        checkout::checkout(&buyer, &mut self.cart, &self.shops, &mut self.orders)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Orders the signed-in user placed.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthenticated` when signed out.
    pub fn my_orders(&self) -> Result<Vec<Order>> {
        Ok(self.orders.get_buyer_orders(&self.acting_user()?))
    }

    /// Orders the signed-in user received as a seller.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthenticated` when signed out.
    pub fn my_sales(&self) -> Result<Vec<Order>> {
        Ok(self.orders.get_seller_orders(&self.acting_user()?))
    }

    /// An order the signed-in user is party to.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthenticated`, `MarketError::NotFound`, or
    /// `MarketError::Forbidden` if the user is neither buyer nor seller.
    pub fn order(&self, id: &OrderId) -> Result<&Order> {
        let user = self.acting_user()?;
        let order = self
            .orders
            .get_order_by_id(id)
            .ok_or_else(|| MarketError::not_found(Entity::Order, id))?;
        if !order.involves(&user) {
            return Err(MarketError::Forbidden(format!("order {id} is not yours")));
        }
        Ok(order)
    }

    /// Buyer uploads proof of payment.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Forbidden` unless the signed-in user is the
    /// buyer, or any error from [`OrderLifecycle::submit_payment_proof`].
    pub fn submit_payment_proof(&mut self, id: &OrderId, screenshot: String) -> Result<Order> {
        self.require_party(id, Party::Buyer)?;
        self.orders.submit_payment_proof(id, screenshot)
    }

    /// Seller confirms payment.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Forbidden` unless the signed-in user is the
    /// seller, or any error from [`OrderLifecycle::confirm_payment`].
    pub fn confirm_payment(&mut self, id: &OrderId) -> Result<Order> {
        self.require_party(id, Party::Seller)?;
        self.orders.confirm_payment(id)
    }

    /// Seller marks the order delivered.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Forbidden` unless the signed-in user is the
    /// seller, or any error from [`OrderLifecycle::mark_delivered`].
    pub fn mark_delivered(&mut self, id: &OrderId) -> Result<Order> {
        self.require_party(id, Party::Seller)?;
        self.orders.mark_delivered(id)
    }

    /// Either party cancels the order.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Forbidden` unless the signed-in user is party to
    /// the order, or any error from [`OrderLifecycle::cancel_order`].
    pub fn cancel_order(&mut self, id: &OrderId) -> Result<Order> {
        self.require_party(id, Party::Either)?;
        self.orders.cancel_order(id)
    }

    fn require_party(&self, id: &OrderId, party: Party) -> Result<()> {
        let user = self.acting_user()?;
        let order = self
            .orders
            .get_order_by_id(id)
            .ok_or_else(|| MarketError::not_found(Entity::Order, id))?;
        let allowed = match party {
            Party::Buyer => order.buyer_id == user,
            Party::Seller => order.seller_id == user,
            Party::Either => order.involves(&user),
        };
        if allowed {
            Ok(())
        } else {
            Err(MarketError::Forbidden(format!(
                "{user} may not change order {id}"
            )))
        }
    }

    // =========================================================================
    // Messaging
    // =========================================================================

    /// Open (or reuse) the conversation with a product's seller.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthenticated`, `MarketError::NotFound` for an
    /// unknown product or shop, or any error from [`Messaging::create_thread`].
    pub fn contact_seller(&mut self, product_id: &ProductId) -> Result<ChatThread> {
        let user = self.acting_user()?;
        let shop_id = self.product(product_id)?.shop_id.clone();
        let owner = self
            .shops
            .get_shop_by_id(&shop_id)
            .ok_or_else(|| MarketError::not_found(Entity::Shop, &shop_id))?
            .owner_id
            .clone();
        self.messaging.create_thread(&user, &owner, Some(product_id))
    }

    /// Open (or reuse) a conversation with `other`.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthenticated` or any error from
    /// [`Messaging::create_thread`].
    pub fn start_thread(&mut self, other: &UserId, product: Option<&ProductId>) -> Result<ChatThread> {
        let user = self.acting_user()?;
        self.messaging.create_thread(&user, other, product)
    }

    /// Send a message as the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthenticated` or any error from
    /// [`Messaging::send_message`].
    pub fn send_message(&mut self, message: NewMessage) -> Result<Message> {
        let user = self.acting_user()?;
        self.messaging.send_message(&user, message)
    }

    /// Send a text message to the other participant of a thread.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthenticated`, `MarketError::NotFound`,
    /// `MarketError::Forbidden` if the user is not in the thread, or any error
    /// from [`Messaging::send_message`].
    pub fn reply(&mut self, thread_id: &ThreadId, content: &str) -> Result<Message> {
        let user = self.acting_user()?;
        let receiver = self.counterpart(thread_id, &user)?;
        self.messaging
            .send_message(&user, NewMessage::text(thread_id.clone(), receiver, content))
    }

    /// Threads the signed-in user takes part in.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthenticated` when signed out.
    pub fn my_threads(&self) -> Result<Vec<ChatThread>> {
        Ok(self.messaging.get_user_threads(&self.acting_user()?))
    }

    /// Mark the thread read for the signed-in user and return its messages.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthenticated`, `MarketError::NotFound`, or
    /// `MarketError::Forbidden` if the user is not in the thread.
    pub fn open_thread(&mut self, thread_id: &ThreadId) -> Result<Vec<Message>> {
        self.mark_thread_read(thread_id)?;
        Ok(self.messaging.get_thread_messages(thread_id))
    }

    /// Mark the thread read for the signed-in user.
    ///
    /// # Errors
    ///
    /// Same as [`Self::open_thread`].
    pub fn mark_thread_read(&mut self, thread_id: &ThreadId) -> Result<()> {
        let user = self.acting_user()?;
        self.counterpart(thread_id, &user)?;
        self.messaging.mark_as_read(thread_id, &user)
    }

    /// Unread messages waiting for the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthenticated` when signed out.
    pub fn my_unread_count(&self) -> Result<u32> {
        Ok(self.messaging.total_unread_for(&self.acting_user()?))
    }

    fn counterpart(&self, thread_id: &ThreadId, user: &UserId) -> Result<UserId> {
        let thread = self
            .messaging
            .get_thread_by_id(thread_id)
            .ok_or_else(|| MarketError::not_found(Entity::Thread, thread_id))?;
        thread
            .other_participant(user)
            .cloned()
            .ok_or_else(|| MarketError::Forbidden(format!("{user} is not in thread {thread_id}")))
    }

    // =========================================================================
    // Shops, payouts & dashboard
    // =========================================================================

    /// Open a shop owned by the signed-in seller.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthenticated`, `MarketError::Forbidden` for
    /// non-sellers, or any error from [`ShopDirectory::create_shop`].
    pub fn create_shop(&mut self, form: ShopForm) -> Result<Shop> {
        let seller = self.acting_seller()?;
        self.shops.create_shop(NewShop {
            name: form.name,
            owner_id: seller,
            description: form.description,
            banner: form.banner,
            bank_details: form.bank_details,
        })
    }

    /// Update a shop the signed-in user owns.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Forbidden` for someone else's shop, or any error
    /// from [`ShopDirectory::update_shop`].
    pub fn update_shop(&mut self, id: &ShopId, update: ShopUpdate) -> Result<Shop> {
        let user = self.acting_user()?;
        let shop = self
            .shops
            .get_shop_by_id(id)
            .ok_or_else(|| MarketError::not_found(Entity::Shop, id))?;
        if shop.owner_id != user {
            return Err(MarketError::Forbidden(format!("shop {id} is not yours")));
        }
        self.shops.update_shop(id, update)
    }

    /// The signed-in seller's withdrawable balance.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthenticated` when signed out.
    pub fn available_balance(&self) -> Result<Naira> {
        let seller = self.acting_user()?;
        Ok(self.payouts.available_balance(&seller, self.orders.orders()))
    }

    /// Request a payout for the signed-in seller.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthenticated`, `MarketError::Forbidden` for
    /// non-sellers, or any error from [`PayoutLedger::request_payout`].
    pub fn request_payout(&mut self, amount: Naira) -> Result<Payout> {
        let seller = self.acting_seller()?;
        self.payouts
            .request_payout(&seller, amount, self.orders.orders())
    }

    /// Mark a payout as paid out. Only the requesting seller or an admin may.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthenticated` when signed out,
    /// `MarketError::NotFound` for an unknown payout,
    /// `MarketError::Forbidden` for anyone else, or any error from
    /// [`PayoutLedger::complete_payout`].
    pub fn complete_payout(&mut self, id: &PayoutId) -> Result<Payout> {
        let user = self.auth.require_user()?;
        let payout = self
            .payouts
            .get_payout_by_id(id)
            .ok_or_else(|| MarketError::not_found(Entity::Payout, id))?;
        if payout.seller_id != user.id && user.role != UserRole::Admin {
            return Err(MarketError::Forbidden(format!(
                "{} may not complete payout {id}",
                user.id
            )));
        }
        self.payouts.complete_payout(id)
    }

    /// The signed-in seller's payouts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthenticated` when signed out.
    pub fn my_payouts(&self) -> Result<Vec<Payout>> {
        Ok(self.payouts.payouts_for(&self.acting_user()?))
    }

    /// Dashboard figures for the signed-in seller.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthenticated` when signed out.
    pub fn dashboard(&self, today: NaiveDate) -> Result<SellerDashboard> {
        let seller = self.acting_user()?;
        let shop_count = self.shops.get_shops_by_owner(&seller).len();
        Ok(self
            .payouts
            .seller_dashboard(&seller, self.orders.orders(), shop_count, today))
    }

    fn acting_seller(&self) -> Result<UserId> {
        let user = self.auth.require_user()?;
        if !user.is_seller() {
            return Err(MarketError::Forbidden(format!(
                "{} is not a seller",
                user.username
            )));
        }
        Ok(user.id.clone())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Wait for every scheduled notification to be delivered or cancelled.
    pub async fn drain_notifications(&self) {
        self.scheduler.drain().await;
    }

    /// Cancel pending notifications. Persisted state is already written.
    pub fn shutdown(&self) {
        info!(pending = self.scheduler.pending(), "Marketplace shutting down");
        self.scheduler.shutdown();
    }

    fn product(&self, id: &ProductId) -> Result<&Product> {
        self.catalog
            .get(id)
            .ok_or_else(|| MarketError::not_found(Entity::Product, id))
    }
}

#[derive(Debug, Clone, Copy)]
enum Party {
    Buyer,
    Seller,
    Either,
}

impl std::fmt::Debug for Marketplace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Marketplace")
            .field("user", &self.auth.current_user().map(|u| &u.id))
            .field("orders", &self.orders)
            .field("messaging", &self.messaging)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use campus_market_core::{OrderStatus, PayoutStatus};

    use super::*;
    use crate::config::LatencyConfig;
    use crate::notify::RecordingNotifier;
    use crate::persistence::MemoryPersistence;

    fn marketplace() -> (Marketplace, RecordingNotifier) {
        let recorder = RecordingNotifier::new();
        let config = MarketConfig {
            latency: LatencyConfig::instant(),
            ..MarketConfig::default()
        };
        let market = Marketplace::open(
            config,
            Arc::new(MemoryPersistence::new()),
            Arc::new(recorder.clone()),
            SeedData::load().unwrap(),
        )
        .unwrap();
        (market, recorder)
    }

    fn pw() -> SecretString {
        SecretString::from("password".to_string())
    }

    #[test]
    fn test_signed_out_operations_are_unauthenticated() {
        let (mut market, _) = marketplace();
        assert!(matches!(market.my_orders(), Err(MarketError::Unauthenticated)));
        assert!(matches!(market.checkout(), Err(MarketError::Unauthenticated)));
        assert!(matches!(
            market.reply(&ThreadId::new("t001"), "Hi"),
            Err(MarketError::Unauthenticated)
        ));
        assert!(matches!(
            market.mark_thread_read(&ThreadId::new("t001")),
            Err(MarketError::Unauthenticated)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_seed_thread_reply() {
        let (mut market, recorder) = marketplace();
        market.login("buyer1@campus.edu", &pw(), UserRole::Buyer).unwrap();

        let threads = market.my_threads().unwrap();
        assert_eq!(threads.len(), 1);

        let message = market.reply(&ThreadId::new("t001"), "I'll take it").unwrap();
        assert_eq!(message.receiver_id, UserId::new("seller1"));

        market.drain_notifications().await;
        assert_eq!(recorder.delivered_to(&UserId::new("seller1")).len(), 1);
    }

    #[tokio::test]
    async fn test_contact_seller_reuses_seed_thread() {
        let (mut market, _) = marketplace();
        market.login("buyer1@campus.edu", &pw(), UserRole::Buyer).unwrap();
        let thread = market.contact_seller(&ProductId::new("1")).unwrap();
        assert_eq!(thread.id, ThreadId::new("t001"));

        let other = market.contact_seller(&ProductId::new("4")).unwrap();
        assert_ne!(other.id, thread.id);
        assert!(other.involves(&UserId::new("seller2")));
    }

    #[tokio::test]
    async fn test_only_the_seller_confirms_payment() {
        let (mut market, _) = marketplace();
        let order = OrderId::new("ord001");

        market.login("buyer1@campus.edu", &pw(), UserRole::Buyer).unwrap();
        assert!(matches!(
            market.confirm_payment(&order),
            Err(MarketError::Forbidden(_))
        ));
        market
            .submit_payment_proof(&order, "data:image/png;base64,AA==".to_string())
            .unwrap();

        market.login("seller1@campus.edu", &pw(), UserRole::Seller).unwrap();
        let confirmed = market.confirm_payment(&order).unwrap();
        assert_eq!(confirmed.status, OrderStatus::Confirmed);
        assert_eq!(market.available_balance().unwrap(), Naira::new(35_000));
    }

    #[test]
    fn test_buyers_cannot_request_payouts() {
        let (mut market, _) = marketplace();
        market.login("buyer1@campus.edu", &pw(), UserRole::Buyer).unwrap();
        assert!(matches!(
            market.request_payout(Naira::new(100)),
            Err(MarketError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_complete_payout_requires_owner_or_admin() {
        let (mut market, _) = marketplace();
        let order = OrderId::new("ord001");
        market.login("seller1@campus.edu", &pw(), UserRole::Seller).unwrap();
        market.confirm_payment(&order).unwrap();
        let payout = market.request_payout(Naira::new(1_000)).unwrap();

        market.logout().unwrap();
        assert!(matches!(
            market.complete_payout(&payout.id),
            Err(MarketError::Unauthenticated)
        ));

        market.login("seller2@campus.edu", &pw(), UserRole::Seller).unwrap();
        assert!(matches!(
            market.complete_payout(&payout.id),
            Err(MarketError::Forbidden(_))
        ));
        assert!(matches!(
            market.complete_payout(&PayoutId::new("payout_missing")),
            Err(MarketError::NotFound { .. })
        ));

        market.login("admin@campus.edu", &pw(), UserRole::Admin).unwrap();
        let done = market.complete_payout(&payout.id).unwrap();
        assert_eq!(done.status, PayoutStatus::Completed);
        assert_eq!(done.seller_id, UserId::new("seller1"));

        market.login("seller1@campus.edu", &pw(), UserRole::Seller).unwrap();
        let second = market.request_payout(Naira::new(2_000)).unwrap();
        assert!(market.complete_payout(&second.id).is_ok());
    }

    #[test]
    fn test_add_unknown_product() {
        let (mut market, _) = marketplace();
        assert!(matches!(
            market.add_to_cart(&ProductId::new("404"), 1),
            Err(MarketError::NotFound { entity: Entity::Product, .. })
        ));
    }

    #[test]
    fn test_cart_summary_uses_configured_shipping() {
        let (mut market, _) = marketplace();
        market.add_to_cart(&ProductId::new("2"), 2).unwrap();
        let summary = market.cart_summary();
        assert_eq!(summary.subtotal, Naira::new(24_000));
        assert_eq!(summary.total, Naira::new(24_500));
    }
}
