//! End-to-end tests for Campus Market.
//!
//! Every test opens a [`Marketplace`] over file persistence in a fresh
//! temporary directory, with the embedded seed data and a recording
//! notifier, so flows can be checked across "restarts".
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p campus-market-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use campus_market_core::UserRole;
use campus_market_storefront::Marketplace;
use campus_market_storefront::config::{LatencyConfig, MarketConfig, NotificationConfig};
use campus_market_storefront::notify::RecordingNotifier;
use campus_market_storefront::persistence::FilePersistence;
use campus_market_storefront::seed::SeedData;
use secrecy::SecretString;
use tempfile::TempDir;

/// A marketplace backed by a temporary data directory.
pub struct TestContext {
    pub market: Marketplace,
    pub notifications: RecordingNotifier,
    dir: TempDir,
}

impl TestContext {
    /// Open a fresh marketplace with no simulated delays.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or seed data cannot be set up.
    #[must_use]
    pub fn new() -> Self {
        Self::with_delays(Duration::ZERO, Duration::ZERO)
    }

    /// Open a fresh marketplace with the given notification delays.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or seed data cannot be set up.
    #[must_use]
    pub fn with_delays(order_delay: Duration, message_delay: Duration) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let notifications = RecordingNotifier::new();
        let market = open_at(
            dir.path(),
            NotificationConfig {
                order_delay,
                message_delay,
            },
            &notifications,
        );
        Self {
            market,
            notifications,
            dir,
        }
    }

    /// Drop the current marketplace and reopen the same data directory.
    ///
    /// # Panics
    ///
    /// Panics if the data directory cannot be reopened.
    pub fn reopen(&mut self) {
        let notifications = self.market.config().notifications;
        self.market.shutdown();
        self.market = open_at(self.dir.path(), notifications, &self.notifications);
    }

    /// The data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Sign in with a throwaway password.
    ///
    /// # Panics
    ///
    /// Panics if the email is rejected.
    pub fn login(&mut self, email: &str, role: UserRole) {
        self.market
            .login(email, &SecretString::from("password".to_string()), role)
            .expect("Failed to sign in");
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

fn open_at(dir: &Path, notifications: NotificationConfig, recorder: &RecordingNotifier) -> Marketplace {
    let config = MarketConfig {
        data_dir: dir.to_path_buf(),
        latency: LatencyConfig::instant(),
        notifications,
        ..MarketConfig::default()
    };
    let persistence = FilePersistence::open(dir).expect("Failed to open data dir");
    let seed = SeedData::load().expect("Seed data is invalid");
    Marketplace::open(config, Arc::new(persistence), Arc::new(recorder.clone()), seed)
        .expect("Failed to open marketplace")
}
