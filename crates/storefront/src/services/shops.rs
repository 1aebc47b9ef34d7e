//! Shop directory.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use campus_market_core::{ShopId, UserId};

use crate::error::{Entity, MarketError, Result};
use crate::models::shop::slugify;
use crate::models::{BankDetails, Shop};
use crate::persistence::{KeyValuePersistence, SHOPS_KEY, StorageError};
use crate::store::{PersistentStore, Validate};

/// Input for [`ShopDirectory::create_shop`].
#[derive(Debug, Clone)]
pub struct NewShop {
    pub name: String,
    pub owner_id: UserId,
    pub description: String,
    pub banner: Option<String>,
    pub bank_details: BankDetails,
}

/// Partial update for [`ShopDirectory::update_shop`]. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct ShopUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub banner: Option<String>,
    pub bank_details: Option<BankDetails>,
}

/// Shops, keyed by id and slug.
pub struct ShopDirectory {
    store: PersistentStore<Shop>,
}

impl ShopDirectory {
    /// Load persisted shops, falling back to `seed`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub fn load(
        persistence: Arc<dyn KeyValuePersistence>,
        seed: Vec<Shop>,
    ) -> std::result::Result<Self, StorageError> {
        Ok(Self {
            store: PersistentStore::load(persistence, SHOPS_KEY, seed)?,
        })
    }

    /// Every shop.
    #[must_use]
    pub fn shops(&self) -> &[Shop] {
        self.store.items()
    }

    #[must_use]
    pub fn get_shop_by_id(&self, id: &ShopId) -> Option<&Shop> {
        self.store.find(|s| &s.id == id)
    }

    #[must_use]
    pub fn get_shop_by_slug(&self, slug: &str) -> Option<&Shop> {
        self.store.find(|s| s.slug == slug)
    }

    #[must_use]
    pub fn get_shops_by_owner(&self, owner: &UserId) -> Vec<Shop> {
        self.store.filter(|s| &s.owner_id == owner)
    }

    /// Open a new shop. The slug is derived from the name and must be unique.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Validation` for an empty name, a taken slug or
    /// invalid bank details, or `MarketError::Storage` if persisting fails.
    #[instrument(skip(self, new), fields(owner_id = %new.owner_id, name = %new.name))]
    pub fn create_shop(&mut self, new: NewShop) -> Result<Shop> {
        let slug = slugify(&new.name);
        if slug.is_empty() {
            return Err(MarketError::Validation("shop name is required".to_string()));
        }
        if self.get_shop_by_slug(&slug).is_some() {
            return Err(MarketError::Validation(format!(
                "a shop called '{slug}' already exists"
            )));
        }

        let shop = Shop {
            id: ShopId::generate(),
            name: new.name.trim().to_string(),
            slug,
            owner_id: new.owner_id,
            banner: new.banner,
            description: new.description,
            rating: 0.0,
            product_count: 0,
            bank_details: new.bank_details,
            created_at: Utc::now(),
        };
        shop.validate().map_err(MarketError::Validation)?;

        self.store.mutate(|shops| shops.push(shop.clone()))?;
        info!(shop_id = %shop.id, "Shop created");
        Ok(shop)
    }

    /// Apply a partial update. Renaming does not change the slug.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` for an unknown id,
    /// `MarketError::Validation` if the result is invalid, or
    /// `MarketError::Storage` if persisting fails.
    #[instrument(skip(self, update), fields(shop_id = %id))]
    pub fn update_shop(&mut self, id: &ShopId, update: ShopUpdate) -> Result<Shop> {
        let mut shop = self
            .get_shop_by_id(id)
            .cloned()
            .ok_or_else(|| MarketError::not_found(Entity::Shop, id))?;

        if let Some(name) = update.name {
            shop.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            shop.description = description;
        }
        if let Some(banner) = update.banner {
            shop.banner = Some(banner);
        }
        if let Some(bank_details) = update.bank_details {
            shop.bank_details = bank_details;
        }
        shop.validate().map_err(MarketError::Validation)?;

        self.store.mutate(|shops| {
            if let Some(slot) = shops.iter_mut().find(|s| s.id == shop.id) {
                *slot = shop.clone();
            }
        })?;
        info!("Shop updated");
        Ok(shop)
    }
}

impl std::fmt::Debug for ShopDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopDirectory")
            .field("store", &self.store)
            .finish()
    }
}
