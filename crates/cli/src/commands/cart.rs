//! Cart and checkout commands.

use tracing::info;

use campus_market_core::ProductId;
use campus_market_storefront::Marketplace;

use super::CommandResult;

/// Add a product to the cart.
///
/// # Errors
///
/// Returns an error for an unknown product or insufficient stock.
pub fn add(market: &mut Marketplace, product_id: &str, quantity: u32) -> CommandResult {
    let line = market.add_to_cart(&ProductId::new(product_id), quantity)?;
    info!(
        "{} x{} in cart ({})",
        line.product.name,
        line.quantity,
        line.line_total()
    );
    Ok(())
}

/// Remove a product from the cart.
///
/// # Errors
///
/// Returns an error if the product is not in the cart.
pub fn remove(market: &mut Marketplace, product_id: &str) -> CommandResult {
    market.remove_from_cart(&ProductId::new(product_id))?;
    info!("Removed {product_id} from cart");
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be persisted.
pub fn clear(market: &mut Marketplace) -> CommandResult {
    market.clear_cart()?;
    info!("Cart cleared");
    Ok(())
}

/// Show cart lines and totals.
///
/// # Errors
///
/// Never fails; kept fallible for uniform dispatch.
#[allow(clippy::unnecessary_wraps)]
pub fn show(market: &Marketplace) -> CommandResult {
    if market.cart().is_empty() {
        info!("Cart is empty");
        return Ok(());
    }
    for line in market.cart().items() {
        info!(
            "[{}] {} x{} = {}",
            line.product.id,
            line.product.name,
            line.quantity,
            line.line_total()
        );
    }
    let summary = market.cart_summary();
    info!(
        "Subtotal {} | Shipping {} | Tax {} | Total {}",
        summary.subtotal, summary.shipping, summary.tax, summary.total
    );
    Ok(())
}

/// Check out as the signed-in user.
///
/// # Errors
///
/// Returns an error if signed out, the cart is empty, or a shop is unknown.
pub fn checkout(market: &mut Marketplace) -> CommandResult {
    let orders = market.checkout()?;
    for order in &orders {
        info!(
            "Placed {} with shop {} for {} ({})",
            order.id, order.shop_id, order.total_amount, order.status
        );
    }
    Ok(())
}
