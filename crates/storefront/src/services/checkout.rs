//! Checkout: turn the cart into one order per shop.

use tracing::{info, instrument};

use campus_market_core::{Naira, OrderStatus, ShopId, UserId};

use crate::error::{Entity, MarketError, Result};
use crate::models::{CartItem, Order, Shop};
use crate::services::cart::CartStore;
use crate::services::orders::{NewOrder, OrderLifecycle};
use crate::services::shops::ShopDirectory;

/// Cart lines for one shop.
#[derive(Debug, Clone)]
struct ShopGroup<'a> {
    shop: &'a Shop,
    items: Vec<CartItem>,
}

/// Group cart lines by shop, keeping first-seen order.
fn group_by_shop<'a>(items: &[CartItem], shops: &'a ShopDirectory) -> Result<Vec<ShopGroup<'a>>> {
    let mut groups: Vec<ShopGroup<'a>> = Vec::new();
    for item in items {
        let shop_id: &ShopId = &item.product.shop_id;
        if let Some(group) = groups.iter_mut().find(|g| &g.shop.id == shop_id) {
            group.items.push(item.clone());
            continue;
        }
        let shop = shops
            .get_shop_by_id(shop_id)
            .ok_or_else(|| MarketError::not_found(Entity::Shop, shop_id))?;
        groups.push(ShopGroup {
            shop,
            items: vec![item.clone()],
        });
    }
    Ok(groups)
}

/// Place one `awaiting_payment` order per shop in the cart, then empty it.
///
/// Every shop is resolved before any order is written. Order writes and the
/// final cart clear are separate, sequential writes.
///
/// # Errors
///
/// Returns `MarketError::EmptyCart` for an empty cart,
/// `MarketError::NotFound` if a line's shop is unknown,
/// `MarketError::Validation` if the buyer owns one of the shops, or any
/// error from [`OrderLifecycle::create_order`].
#[instrument(skip(cart, shops, orders), fields(buyer_id = %buyer))]
pub fn checkout(
    buyer: &UserId,
    cart: &mut CartStore,
    shops: &ShopDirectory,
    orders: &mut OrderLifecycle,
) -> Result<Vec<Order>> {
    if cart.is_empty() {
        return Err(MarketError::EmptyCart);
    }

    let groups = group_by_shop(cart.items(), shops)?;
    if let Some(own) = groups.iter().find(|g| &g.shop.owner_id == buyer) {
        return Err(MarketError::Validation(format!(
            "cannot buy from your own shop '{}'",
            own.shop.name
        )));
    }

    let mut placed = Vec::with_capacity(groups.len());
    for group in groups {
        let total_amount: Naira = group.items.iter().map(CartItem::line_total).sum();
        let order = orders.create_order(NewOrder {
            buyer_id: buyer.clone(),
            seller_id: group.shop.owner_id.clone(),
            shop_id: group.shop.id.clone(),
            items: group.items,
            total_amount,
            status: Some(OrderStatus::AwaitingPayment),
        })?;
        placed.push(order);
    }

    cart.clear_cart()?;
    info!(orders = placed.len(), "Checkout complete");
    Ok(placed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Utc;

    use super::*;
    use crate::models::BankDetails;
    use crate::models::product::fixtures::product;
    use crate::notify::{NotificationScheduler, RecordingNotifier};
    use crate::persistence::{KeyValuePersistence, MemoryPersistence};

    fn shop(id: &str, owner: &str) -> Shop {
        Shop {
            id: ShopId::new(id),
            name: format!("Shop {id}"),
            slug: format!("shop-{id}"),
            owner_id: UserId::new(owner),
            banner: None,
            description: String::new(),
            rating: 4.5,
            product_count: 1,
            bank_details: BankDetails {
                bank_name: "GTBank".to_string(),
                account_name: format!("Shop {id}"),
                account_number: "0123456789".to_string(),
            },
            created_at: Utc::now(),
        }
    }

    struct Fixture {
        cart: CartStore,
        shops: ShopDirectory,
        orders: OrderLifecycle,
    }

    fn fixture() -> Fixture {
        let backend: Arc<dyn KeyValuePersistence> = Arc::new(MemoryPersistence::new());
        let scheduler = Arc::new(NotificationScheduler::new(Arc::new(RecordingNotifier::new())));
        Fixture {
            cart: CartStore::load(Arc::clone(&backend)).unwrap(),
            shops: ShopDirectory::load(
                Arc::clone(&backend),
                vec![shop("s001", "seller1"), shop("s002", "seller2")],
            )
            .unwrap(),
            orders: OrderLifecycle::load(backend, Vec::new(), scheduler, Duration::from_millis(500))
                .unwrap(),
        }
    }

    #[tokio::test]
    async fn test_one_order_per_shop() {
        let mut f = fixture();
        f.cart.add_to_cart(&product("1", "s001", 35_000, 15), 1).unwrap();
        f.cart.add_to_cart(&product("4", "s002", 18_000, 12), 2).unwrap();
        f.cart.add_to_cart(&product("2", "s001", 12_000, 25), 1).unwrap();

        let buyer = UserId::new("buyer1");
        let placed = checkout(&buyer, &mut f.cart, &f.shops, &mut f.orders).unwrap();

        assert_eq!(placed.len(), 2);
        let first = placed.first().unwrap();
        assert_eq!(first.seller_id, UserId::new("seller1"));
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.total_amount, Naira::new(47_000));
        let second = placed.get(1).unwrap();
        assert_eq!(second.total_amount, Naira::new(36_000));
        assert!(placed.iter().all(|o| o.status == OrderStatus::AwaitingPayment));

        assert!(f.cart.is_empty());
        assert_eq!(f.orders.get_buyer_orders(&buyer).len(), 2);
    }

    #[test]
    fn test_empty_cart() {
        let mut f = fixture();
        let err = checkout(&UserId::new("buyer1"), &mut f.cart, &f.shops, &mut f.orders).unwrap_err();
        assert!(matches!(err, MarketError::EmptyCart));
    }

    #[test]
    fn test_unknown_shop_places_nothing() {
        let mut f = fixture();
        f.cart.add_to_cart(&product("1", "s001", 35_000, 15), 1).unwrap();
        f.cart.add_to_cart(&product("9", "s999", 5_000, 3), 1).unwrap();

        let err = checkout(&UserId::new("buyer1"), &mut f.cart, &f.shops, &mut f.orders).unwrap_err();
        assert!(matches!(err, MarketError::NotFound { entity: Entity::Shop, .. }));
        assert!(f.orders.orders().is_empty());
        assert_eq!(f.cart.items().len(), 2);
    }

    #[test]
    fn test_cannot_buy_from_own_shop() {
        let mut f = fixture();
        f.cart.add_to_cart(&product("1", "s001", 35_000, 15), 1).unwrap();
        let err = checkout(&UserId::new("seller1"), &mut f.cart, &f.shops, &mut f.orders).unwrap_err();
        assert!(matches!(err, MarketError::Validation(_)));
        assert!(f.orders.orders().is_empty());
    }
}
