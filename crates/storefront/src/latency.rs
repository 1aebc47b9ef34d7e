//! Simulated network latency for catalog reads.
//!
//! There is no backend: "API calls" are local lookups that wait a random
//! delay first. Every wait takes a [`CancellationToken`] so a caller that
//! goes away before the delay elapses gets [`MarketError::Cancelled`] and the
//! lookup never runs.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use campus_market_core::ProductId;

use crate::config::LatencyConfig;
use crate::error::{MarketError, Result};
use crate::models::Product;
use crate::services::catalog::Catalog;

/// Uniformly random delay within a fixed range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedLatency {
    min: Duration,
    max: Duration,
}

impl SimulatedLatency {
    /// Delays between `min` and `max` inclusive. The bounds are swapped if inverted.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Pick the next delay.
    #[must_use]
    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let min = u64::try_from(self.min.as_millis()).unwrap_or(u64::MAX);
        let max = u64::try_from(self.max.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rand::rng().random_range(min..=max))
    }

    /// Wait one sampled delay.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Cancelled`] if `cancel` fires first.
    pub async fn delay(&self, cancel: &CancellationToken) -> Result<()> {
        let wait = self.sample();
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("Simulated request cancelled");
                Err(MarketError::Cancelled)
            }
            () = tokio::time::sleep(wait) => Ok(()),
        }
    }
}

impl From<LatencyConfig> for SimulatedLatency {
    fn from(config: LatencyConfig) -> Self {
        Self::new(config.min, config.max)
    }
}

/// Catalog reads behind simulated latency.
#[derive(Debug, Clone)]
pub struct MockApi {
    catalog: Arc<Catalog>,
    latency: SimulatedLatency,
}

impl MockApi {
    /// Wrap `catalog` with `latency`.
    #[must_use]
    pub const fn new(catalog: Arc<Catalog>, latency: SimulatedLatency) -> Self {
        Self { catalog, latency }
    }

    /// Every product.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Cancelled`] if `cancel` fires during the delay.
    #[instrument(skip(self, cancel))]
    pub async fn get_products(&self, cancel: &CancellationToken) -> Result<Vec<Product>> {
        self.latency.delay(cancel).await?;
        Ok(self.catalog.list().to_vec())
    }

    /// One product, or `None` if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Cancelled`] if `cancel` fires during the delay.
    #[instrument(skip(self, cancel), fields(product_id = %id))]
    pub async fn get_product_by_id(
        &self,
        id: &ProductId,
        cancel: &CancellationToken,
    ) -> Result<Option<Product>> {
        self.latency.delay(cancel).await?;
        Ok(self.catalog.get(id).cloned())
    }

    /// Products in `category` (`"all"` for everything).
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Cancelled`] if `cancel` fires during the delay.
    #[instrument(skip(self, cancel))]
    pub async fn get_products_by_category(
        &self,
        category: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Product>> {
        self.latency.delay(cancel).await?;
        Ok(self.catalog.by_category(category))
    }

    /// Case-insensitive search on name or category.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Cancelled`] if `cancel` fires during the delay.
    #[instrument(skip(self, cancel))]
    pub async fn search_products(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Product>> {
        self.latency.delay(cancel).await?;
        Ok(self.catalog.search(query))
    }

    /// Products to suggest alongside `current`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Cancelled`] if `cancel` fires during the delay.
    #[instrument(skip(self, cancel))]
    pub async fn get_recommendations(
        &self,
        current: Option<&ProductId>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Product>> {
        self.latency.delay(cancel).await?;
        Ok(self.catalog.recommendations(current))
    }
}
