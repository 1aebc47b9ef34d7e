//! CLI command implementations.

pub mod cart;
pub mod messages;
pub mod orders;
pub mod payouts;
pub mod products;
pub mod session;

use std::sync::Arc;

use campus_market_storefront::Marketplace;
use campus_market_storefront::config::MarketConfig;
use campus_market_storefront::notify::TracingNotifier;
use campus_market_storefront::persistence::FilePersistence;
use campus_market_storefront::seed::SeedData;

/// Result type shared by every command.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Open the marketplace over the configured data directory.
///
/// # Errors
///
/// Returns an error if the seed fixture is invalid or the data directory
/// cannot be created or read.
pub fn open(config: MarketConfig) -> Result<Marketplace, Box<dyn std::error::Error>> {
    let persistence = FilePersistence::open(config.data_dir.clone())?;
    let seed = SeedData::load()?;
    let market = Marketplace::open(
        config,
        Arc::new(persistence),
        Arc::new(TracingNotifier),
        seed,
    )?;
    Ok(market)
}
