//! Buyer and seller conversations through the marketplace.

#![allow(clippy::unwrap_used)]

use campus_market_core::{ProductId, ThreadId, UserId, UserRole};
use campus_market_integration_tests::TestContext;
use campus_market_storefront::MarketError;

#[tokio::test]
async fn test_contact_seller_and_reply() {
    let mut ctx = TestContext::new();
    ctx.login("buyer2@campus.edu", UserRole::Buyer);

    let thread = ctx.market.contact_seller(&ProductId::new("4")).unwrap();
    assert!(thread.involves(&UserId::new("seller2")));
    assert_eq!(thread.product_id, Some(ProductId::new("4")));

    let again = ctx.market.contact_seller(&ProductId::new("4")).unwrap();
    assert_eq!(again.id, thread.id);

    ctx.market.reply(&thread.id, "Is the book still available?").unwrap();
    ctx.market.reply(&thread.id, "I can pick it up today").unwrap();

    ctx.login("seller2@campus.edu", UserRole::Seller);
    assert_eq!(ctx.market.my_unread_count().unwrap(), 2);

    let messages = ctx.market.open_thread(&thread.id).unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(ctx.market.my_unread_count().unwrap(), 0);

    let reply = ctx.market.reply(&thread.id, "Yes, come by at 4").unwrap();
    assert_eq!(reply.receiver_id, UserId::new("buyer2"));

    let stored = ctx.market.messaging().get_thread_by_id(&thread.id).unwrap();
    assert_eq!(stored.last_message.as_ref().map(|m| &m.id), Some(&reply.id));

    ctx.market.drain_notifications().await;
    assert_eq!(
        ctx.notifications.delivered_to(&UserId::new("seller2")).len(),
        2
    );
    assert_eq!(
        ctx.notifications.delivered_to(&UserId::new("buyer2")).len(),
        1
    );
}

#[test]
fn test_outsider_cannot_post_in_thread() {
    let mut ctx = TestContext::new();
    ctx.login("buyer9@campus.edu", UserRole::Buyer);

    let thread = ThreadId::new("t001");
    assert!(ctx.market.messaging().get_thread_by_id(&thread).is_some());
    assert!(matches!(
        ctx.market.reply(&thread, "hello"),
        Err(MarketError::Forbidden(_))
    ));
    assert!(ctx.market.my_threads().unwrap().is_empty());
}

#[test]
fn test_seller_cannot_contact_themselves() {
    let mut ctx = TestContext::new();
    ctx.login("seller1@campus.edu", UserRole::Seller);
    assert!(matches!(
        ctx.market.contact_seller(&ProductId::new("1")),
        Err(MarketError::Validation(_))
    ));
}
