//! Seller payout and dashboard commands.

use chrono::Utc;
use tracing::info;

use campus_market_core::Naira;
use campus_market_storefront::Marketplace;

use super::CommandResult;

/// Show the withdrawable balance.
///
/// # Errors
///
/// Returns an error if signed out.
pub fn balance(market: &Marketplace) -> CommandResult {
    info!("Available balance: {}", market.available_balance()?);
    Ok(())
}

/// Request a withdrawal.
///
/// # Errors
///
/// Returns an error for non-sellers or if `amount` exceeds the balance.
pub fn request(market: &mut Marketplace, amount: Naira) -> CommandResult {
    let payout = market.request_payout(amount)?;
    info!("Requested {} ({})", payout.amount, payout.id);
    Ok(())
}

/// Show payout history, newest first.
///
/// # Errors
///
/// Returns an error if signed out.
pub fn list(market: &Marketplace) -> CommandResult {
    let payouts = market.my_payouts()?;
    if payouts.is_empty() {
        info!("No payouts");
    }
    for payout in &payouts {
        info!(
            "{} {} {:?} requested {}",
            payout.id,
            payout.amount,
            payout.status,
            payout.requested_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}

/// Show today's seller dashboard.
///
/// # Errors
///
/// Returns an error if signed out.
pub fn dashboard(market: &Marketplace) -> CommandResult {
    let d = market.dashboard(Utc::now().date_naive())?;
    info!(
        "Orders: {} total, {} pending, {} confirmed",
        d.total_orders, d.pending_orders, d.confirmed_orders
    );
    info!("Revenue: {} total, {} today", d.total_revenue, d.today_revenue);
    info!("Shops: {} | Available: {}", d.shop_count, d.available_balance);
    Ok(())
}
