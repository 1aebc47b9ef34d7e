//! Seller shop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_market_core::{ShopId, UserId};

use crate::store::Validate;

/// Where buyers send bank transfers for a shop's orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    pub bank_name: String,
    pub account_name: String,
    /// Ten-digit NUBAN account number.
    pub account_number: String,
}

impl BankDetails {
    /// NUBAN account numbers are ten digits.
    pub const ACCOUNT_NUMBER_LENGTH: usize = 10;
}

impl Validate for BankDetails {
    fn validate(&self) -> Result<(), String> {
        if self.account_number.len() != Self::ACCOUNT_NUMBER_LENGTH
            || !self.account_number.chars().all(|c| c.is_ascii_digit())
        {
            return Err(format!(
                "account number must be {} digits",
                Self::ACCOUNT_NUMBER_LENGTH
            ));
        }
        if self.bank_name.trim().is_empty() || self.account_name.trim().is_empty() {
            return Err("bank and account name are required".to_string());
        }
        Ok(())
    }
}

/// A shop owned by a seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    pub slug: String,
    pub owner_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    pub description: String,
    pub rating: f64,
    pub product_count: u32,
    pub bank_details: BankDetails,
    pub created_at: DateTime<Utc>,
}

impl Validate for Shop {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() || self.slug.trim().is_empty() {
            return Err(format!("shop {} needs a name and slug", self.id));
        }
        self.bank_details
            .validate()
            .map_err(|e| format!("shop {}: {e}", self.id))
    }
}

/// Turn a shop name into a URL slug (`"Tech Haven"` -> `"tech-haven"`).
#[must_use]
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank(number: &str) -> BankDetails {
        BankDetails {
            bank_name: "GTBank".to_string(),
            account_name: "Tech Haven Store".to_string(),
            account_number: number.to_string(),
        }
    }

    #[test]
    fn test_account_number_must_be_ten_digits() {
        assert!(bank("0123456789").validate().is_ok());
        assert!(bank("012345678").validate().is_err());
        assert!(bank("01234567ab").validate().is_err());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Tech Haven"), "tech-haven");
        assert_eq!(slugify("  Campus   Books! "), "campus-books");
        assert_eq!(slugify("Style-Hub 2"), "style-hub-2");
    }
}
