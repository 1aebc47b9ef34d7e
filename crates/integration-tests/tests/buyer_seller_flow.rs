//! A buyer purchases from two shops; each seller takes their order through
//! the lifecycle and withdraws the proceeds.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use chrono::Utc;

use campus_market_core::{Naira, OrderId, OrderStatus, ProductId, UserId, UserRole};
use campus_market_integration_tests::TestContext;
use campus_market_storefront::MarketError;

const PROOF: &str = "data:image/png;base64,iVBORw0KGgo=";

#[tokio::test]
async fn test_checkout_confirm_deliver_and_withdraw() {
    let mut ctx = TestContext::new();
    ctx.login("buyer2@campus.edu", UserRole::Buyer);

    ctx.market.add_to_cart(&ProductId::new("2"), 2).unwrap();
    ctx.market.add_to_cart(&ProductId::new("4"), 1).unwrap();
    assert_eq!(ctx.market.cart_summary().subtotal, Naira::new(42_000));

    let placed = ctx.market.checkout().unwrap();
    assert_eq!(placed.len(), 2);
    assert!(ctx.market.cart().is_empty());

    let lamp_order = placed.first().unwrap().clone();
    let book_order = placed.get(1).unwrap().clone();
    assert_eq!(lamp_order.seller_id, UserId::new("seller1"));
    assert_eq!(lamp_order.total_amount, Naira::new(24_000));
    assert_eq!(book_order.seller_id, UserId::new("seller2"));
    assert_eq!(book_order.total_amount, Naira::new(18_000));

    ctx.market
        .submit_payment_proof(&lamp_order.id, PROOF.to_string())
        .unwrap();

    ctx.login("seller1@campus.edu", UserRole::Seller);
    let confirmed = ctx.market.confirm_payment(&lamp_order.id).unwrap();
    assert_eq!(confirmed.status, OrderStatus::Confirmed);
    assert!(confirmed.updated_at > lamp_order.updated_at);

    let delivered = ctx.market.mark_delivered(&lamp_order.id).unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);

    // Seed order ord001 is still awaiting payment, so only the lamp counts
    assert_eq!(ctx.market.available_balance().unwrap(), Naira::new(24_000));
    ctx.market.request_payout(Naira::new(20_000)).unwrap();
    assert_eq!(ctx.market.available_balance().unwrap(), Naira::new(4_000));
    assert!(matches!(
        ctx.market.request_payout(Naira::new(5_000)),
        Err(MarketError::InsufficientBalance { .. })
    ));

    let dashboard = ctx.market.dashboard(Utc::now().date_naive()).unwrap();
    assert_eq!(dashboard.total_orders, 2);
    assert_eq!(dashboard.pending_orders, 1);
    assert_eq!(dashboard.confirmed_orders, 0);
    assert_eq!(dashboard.available_balance, Naira::new(4_000));
    assert_eq!(dashboard.shop_count, 2);

    ctx.market.drain_notifications().await;
    let mut seller_titles: Vec<String> = ctx
        .notifications
        .delivered_to(&UserId::new("seller1"))
        .into_iter()
        .map(|n| n.title)
        .collect();
    seller_titles.sort();
    assert_eq!(seller_titles, vec!["New Order!", "Payment Submitted"]);
    assert_eq!(
        ctx.notifications.delivered_to(&UserId::new("buyer2")).len(),
        1
    );
}

#[tokio::test]
async fn test_cancelled_order_cannot_be_confirmed() {
    let mut ctx = TestContext::new();
    ctx.login("buyer2@campus.edu", UserRole::Buyer);
    ctx.market.add_to_cart(&ProductId::new("4"), 1).unwrap();
    let order = ctx.market.checkout().unwrap().pop().unwrap();

    let cancelled = ctx.market.cancel_order(&order.id).unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    ctx.login("seller2@campus.edu", UserRole::Seller);
    let err = ctx.market.confirm_payment(&order.id).unwrap_err();
    assert!(matches!(
        err,
        MarketError::InvalidTransition {
            from: OrderStatus::Cancelled,
            to: OrderStatus::Confirmed
        }
    ));
    assert_eq!(ctx.market.available_balance().unwrap(), Naira::ZERO);
}

#[test]
fn test_strangers_cannot_touch_an_order() {
    let mut ctx = TestContext::new();
    let seed_order = OrderId::new("ord001");

    ctx.login("buyer9@campus.edu", UserRole::Buyer);
    assert!(matches!(
        ctx.market.order(&seed_order),
        Err(MarketError::Forbidden(_))
    ));
    assert!(matches!(
        ctx.market.cancel_order(&seed_order),
        Err(MarketError::Forbidden(_))
    ));

    ctx.login("seller1@campus.edu", UserRole::Seller);
    assert!(matches!(
        ctx.market.submit_payment_proof(&seed_order, PROOF.to_string()),
        Err(MarketError::Forbidden(_))
    ));
}

#[test]
fn test_seller_cannot_buy_own_products() {
    let mut ctx = TestContext::new();
    ctx.login("seller1@campus.edu", UserRole::Seller);
    ctx.market.add_to_cart(&ProductId::new("1"), 1).unwrap();

    assert!(matches!(
        ctx.market.checkout(),
        Err(MarketError::Validation(_))
    ));
    assert_eq!(ctx.market.cart().items().len(), 1);
}

#[test]
fn test_generated_ids_are_unique() {
    let ids: HashSet<OrderId> = (0..1_000).map(|_| OrderId::generate()).collect();
    assert_eq!(ids.len(), 1_000);
    assert!(ids.iter().all(|id| id.as_str().starts_with("ord_")));
}
