//! Seed dataset used when nothing has been persisted yet.

use serde::Deserialize;
use thiserror::Error;

use crate::models::{ChatThread, Message, Order, Product, Shop};
use crate::store::Validate;

const SEED_JSON: &str = include_str!("../fixtures/seed.json");

/// Errors raised while loading a seed dataset.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to parse seed data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid seed data: {0}")]
    Invalid(String),
}

/// The initial marketplace contents.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedData {
    pub shops: Vec<Shop>,
    pub products: Vec<Product>,
    pub messages: Vec<Message>,
    pub threads: Vec<ChatThread>,
    pub orders: Vec<Order>,
}

impl SeedData {
    /// Parse and validate the embedded fixture.
    ///
    /// # Errors
    ///
    /// Returns `SeedError` if the fixture is malformed.
    pub fn load() -> Result<Self, SeedError> {
        Self::from_json(SEED_JSON)
    }

    /// Parse and validate a dataset in the fixture's JSON layout.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Parse` for undecodable JSON and
    /// `SeedError::Invalid` if a record fails validation.
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        let seed: Self = serde_json::from_str(json)?;
        seed.validate().map_err(SeedError::Invalid)?;
        Ok(seed)
    }

    /// A dataset with nothing in it.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            shops: Vec::new(),
            products: Vec::new(),
            messages: Vec::new(),
            threads: Vec::new(),
            orders: Vec::new(),
        }
    }
}

impl Validate for SeedData {
    fn validate(&self) -> Result<(), String> {
        self.shops.validate()?;
        self.products.validate()?;
        self.messages.validate()?;
        self.threads.validate()?;
        self.orders.validate()
    }
}
