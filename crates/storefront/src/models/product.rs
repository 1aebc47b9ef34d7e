//! Catalog product.

use serde::{Deserialize, Serialize};

use campus_market_core::{Naira, ProductId, ShopId};

use crate::store::Validate;

/// A product listed by a shop. Reference data; never mutated by the stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Naira,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Naira>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub category: String,
    pub rating: f64,
    pub reviews: u32,
    pub in_stock: bool,
    pub stock: u32,
    pub shop_id: ShopId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_new: bool,
    /// Percentage off `original_price`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<u8>,
}

impl Product {
    /// Whether the product is on sale.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.discount.is_some_and(|d| d > 0)
    }

    /// Units that can currently be bought.
    #[must_use]
    pub const fn available(&self) -> u32 {
        if self.in_stock { self.stock } else { 0 }
    }
}

impl Validate for Product {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err(format!("product {} has an empty name", self.id));
        }
        if self.price < Naira::ZERO {
            return Err(format!("product {} has a negative price", self.id));
        }
        let original_in_range = self.original_price.is_none_or(|p| p.is_within_limit());
        if !self.price.is_within_limit() || !original_in_range {
            return Err(format!("product {} price is out of range", self.id));
        }
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(format!("product {} rating {} out of range", self.id, self.rating));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A product for unit tests.
    pub fn product(id: &str, shop: &str, price: i64, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Naira::new(price),
            original_price: None,
            image: None,
            category: "electronics".to_string(),
            rating: 4.5,
            reviews: 10,
            in_stock: stock > 0,
            stock,
            shop_id: ShopId::new(shop),
            tags: Vec::new(),
            description: None,
            is_new: false,
            discount: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::fixtures::product;
    use super::*;

    #[test]
    fn test_product_json_uses_camel_case() {
        let json = serde_json::to_value(product("1", "s001", 35_000, 15)).unwrap();
        assert_eq!(json["shopId"], "s001");
        assert_eq!(json["inStock"], true);
        assert!(json.get("originalPrice").is_none());
    }

    #[test]
    fn test_available_respects_in_stock_flag() {
        let mut p = product("1", "s001", 35_000, 15);
        assert_eq!(p.available(), 15);
        p.in_stock = false;
        assert_eq!(p.available(), 0);
    }

    #[test]
    fn test_validate_rejects_bad_rating() {
        let mut p = product("1", "s001", 35_000, 15);
        assert!(p.validate().is_ok());
        p.rating = 7.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_huge_price() {
        let mut p = product("1", "s001", Naira::MAX_WHOLE, 15);
        assert!(p.validate().is_ok());

        p.price = serde_json::from_str("\"79228162514264337593543950335\"").unwrap();
        assert!(p.validate().is_err());

        let mut p = product("1", "s001", 35_000, 15);
        p.original_price = Some(Naira::new(Naira::MAX_WHOLE + 1));
        assert!(p.validate().is_err());
    }
}
