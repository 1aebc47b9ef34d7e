//! Order commands.

use tracing::info;

use campus_market_core::OrderId;
use campus_market_storefront::Marketplace;
use campus_market_storefront::models::Order;

use super::CommandResult;

fn log_order(order: &Order) {
    info!(
        "{} {} | {} | buyer {} seller {} | {} item(s)",
        order.id,
        order.status,
        order.total_amount,
        order.buyer_id,
        order.seller_id,
        order.items.len()
    );
}

/// List the signed-in user's purchases, or sales with `sales`.
///
/// # Errors
///
/// Returns an error if signed out.
pub fn list(market: &Marketplace, sales: bool) -> CommandResult {
    let orders = if sales {
        market.my_sales()?
    } else {
        market.my_orders()?
    };
    if orders.is_empty() {
        info!("No orders");
    }
    for order in &orders {
        log_order(order);
    }
    Ok(())
}

/// Show one order with its items.
///
/// # Errors
///
/// Returns an error if the order is unknown or not the user's.
pub fn show(market: &Marketplace, order_id: &str) -> CommandResult {
    let order = market.order(&OrderId::new(order_id))?;
    log_order(order);
    for line in &order.items {
        info!("  {} x{} = {}", line.product.name, line.quantity, line.line_total());
    }
    if order.has_payment_proof() {
        info!("  Payment proof attached");
    }
    Ok(())
}

/// Attach payment proof as the buyer.
///
/// # Errors
///
/// Returns an error if the user is not the buyer or the order is not awaiting payment.
pub fn submit_proof(market: &mut Marketplace, order_id: &str, screenshot: String) -> CommandResult {
    let order = market.submit_payment_proof(&OrderId::new(order_id), screenshot)?;
    log_order(&order);
    Ok(())
}

/// Confirm payment as the seller.
///
/// # Errors
///
/// Returns an error if the user is not the seller or the transition is invalid.
pub fn confirm(market: &mut Marketplace, order_id: &str) -> CommandResult {
    let order = market.confirm_payment(&OrderId::new(order_id))?;
    log_order(&order);
    Ok(())
}

/// Mark delivered as the seller.
///
/// # Errors
///
/// Returns an error if the user is not the seller or the transition is invalid.
pub fn deliver(market: &mut Marketplace, order_id: &str) -> CommandResult {
    let order = market.mark_delivered(&OrderId::new(order_id))?;
    log_order(&order);
    Ok(())
}

/// Cancel as either party.
///
/// # Errors
///
/// Returns an error if the user is not party to the order or it is already final.
pub fn cancel(market: &mut Marketplace, order_id: &str) -> CommandResult {
    let order = market.cancel_order(&OrderId::new(order_id))?;
    log_order(&order);
    Ok(())
}
