//! User domain types.

use serde::{Deserialize, Serialize};

use campus_market_core::{Email, UserId, UserRole};

use crate::store::Validate;

/// A signed-in marketplace user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Public handle.
    pub username: String,
    /// User's email address.
    pub email: Email,
    /// Buyer, seller or admin.
    pub role: UserRole,
    /// Avatar image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    /// Whether the user can manage shops and receive payouts.
    #[must_use]
    pub const fn is_seller(&self) -> bool {
        matches!(self.role, UserRole::Seller)
    }
}

impl Validate for User {
    fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err(format!("user {} has an empty username", self.id));
        }
        Ok(())
    }
}
