//! Seller payout requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_market_core::{Naira, PayoutId, PayoutStatus, UserId};

use crate::store::Validate;

/// A seller's request to withdraw revenue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub id: PayoutId,
    pub seller_id: UserId,
    pub amount: Naira,
    pub status: PayoutStatus,
    pub requested_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Validate for Payout {
    fn validate(&self) -> Result<(), String> {
        if !self.amount.is_positive() {
            return Err(format!("payout {} amount must be positive", self.id));
        }
        if !self.amount.is_within_limit() {
            return Err(format!("payout {} amount is out of range", self.id));
        }
        match (self.status, self.completed_at) {
            (PayoutStatus::Completed, None) => {
                Err(format!("payout {} completed without a timestamp", self.id))
            }
            (PayoutStatus::Pending, Some(_)) => {
                Err(format!("payout {} pending with a completion time", self.id))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn payout(amount: Naira) -> Payout {
        Payout {
            id: PayoutId::new("payout_1"),
            seller_id: UserId::new("seller1"),
            amount,
            status: PayoutStatus::Pending,
            requested_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn test_validate_amount_bounds() {
        assert!(payout(Naira::new(1_000)).validate().is_ok());
        assert!(payout(Naira::ZERO).validate().is_err());
        assert!(payout(Naira::new(Naira::MAX_WHOLE + 1)).validate().is_err());
    }

    #[test]
    fn test_validate_completion_timestamp() {
        let mut p = payout(Naira::new(1_000));
        p.status = PayoutStatus::Completed;
        assert!(p.validate().is_err());
        p.completed_at = Some(Utc::now());
        assert!(p.validate().is_ok());
    }
}
