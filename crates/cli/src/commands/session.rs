//! Session commands: `reset`, `login`, `logout`, `whoami`.

use secrecy::SecretString;
use tracing::info;

use campus_market_core::UserRole;
use campus_market_storefront::Marketplace;
use campus_market_storefront::config::MarketConfig;
use campus_market_storefront::persistence::{ALL_KEYS, FilePersistence, KeyValuePersistence};

use super::CommandResult;

/// Remove every persisted key so the next run starts from the seed data.
///
/// # Errors
///
/// Returns an error if the data directory cannot be written.
pub fn reset(config: &MarketConfig) -> CommandResult {
    let persistence = FilePersistence::open(config.data_dir.clone())?;
    for key in ALL_KEYS {
        persistence.remove(key)?;
    }
    info!(data_dir = %config.data_dir.display(), "Marketplace state reset");
    Ok(())
}

/// Sign in.
///
/// # Errors
///
/// Returns an error if the credentials are rejected.
pub fn login(market: &mut Marketplace, email: &str, password: String, role: UserRole) -> CommandResult {
    let password = SecretString::from(password);
    let user = market.login(email, &password, role)?;
    info!("Signed in as {} ({})", user.username, user.role);
    Ok(())
}

/// Sign out.
///
/// # Errors
///
/// Returns an error if the session cannot be removed.
pub fn logout(market: &mut Marketplace) -> CommandResult {
    market.logout()?;
    info!("Signed out");
    Ok(())
}

/// Show the signed-in user.
///
/// # Errors
///
/// Never fails; kept fallible for uniform dispatch.
#[allow(clippy::unnecessary_wraps)]
pub fn whoami(market: &Marketplace) -> CommandResult {
    match market.current_user() {
        Some(user) => info!(
            "{} <{}> id={} role={}",
            user.name,
            user.email.as_str(),
            user.id,
            user.role
        ),
        None => info!("Not signed in"),
    }
    Ok(())
}
