//! Type-safe money representation using decimal arithmetic.
//!
//! Every amount on the marketplace is in Nigerian naira and is kept as a
//! whole number of naira; fractional input is rounded on construction.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Sub};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`Naira`] amount.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The input string is not a number.
    #[error("invalid amount: {0}")]
    Invalid(String),
    /// The amount is negative where only non-negative amounts are allowed.
    #[error("amount cannot be negative")]
    Negative,
    /// The amount is above [`Naira::MAX_WHOLE`].
    #[error("amount exceeds the ₦1,000,000,000,000 limit")]
    TooLarge,
}

/// An amount of money in naira.
///
/// ## Examples
///
/// ```
/// use campus_market_core::Naira;
///
/// let price = Naira::new(35_000);
/// assert_eq!(price.to_string(), "₦35,000");
/// assert_eq!(price * 2, Naira::new(70_000));
/// ```
///
/// Arithmetic saturates at the `Decimal` range instead of panicking; stored
/// amounts are kept below [`Naira::MAX_WHOLE`] by validation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Naira(Decimal);

impl Naira {
    /// Zero naira.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest amount a price, order total or payout may carry.
    pub const MAX_WHOLE: i64 = 1_000_000_000_000;

    /// Create an amount from a whole number of naira.
    #[must_use]
    pub fn new(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    /// Create an amount from a decimal, rounding half away from zero to whole naira.
    #[must_use]
    pub fn from_decimal(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Parse a user-supplied, non-negative amount (e.g. a payout request).
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Invalid`] for non-numeric input and
    /// [`MoneyError::Negative`] for amounts below zero.
    pub fn parse(s: &str) -> Result<Self, MoneyError> {
        let amount: Decimal = s
            .trim()
            .replace(',', "")
            .parse()
            .map_err(|_| MoneyError::Invalid(s.to_owned()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }
        let naira = Self::from_decimal(amount);
        if !naira.is_within_limit() {
            return Err(MoneyError::TooLarge);
        }
        Ok(naira)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Whether the amount lies in `0..=MAX_WHOLE`.
    #[must_use]
    pub fn is_within_limit(&self) -> bool {
        self.0 >= Decimal::ZERO && self.0 <= Decimal::from(Self::MAX_WHOLE)
    }
}

impl fmt::Display for Naira {
    /// Formats as NGN with thousands separators and no fraction digits.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0.trunc().abs().to_string();
        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        if self.0.is_sign_negative() && !self.0.is_zero() {
            write!(f, "-₦{grouped}")
        } else {
            write!(f, "₦{grouped}")
        }
    }
}

impl Add for Naira {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Naira {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl core::ops::Mul<u32> for Naira {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(rhs)))
    }
}

impl Sum for Naira {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<i64> for Naira {
    fn from(amount: i64) -> Self {
        Self::new(amount)
    }
}

impl From<Decimal> for Naira {
    fn from(amount: Decimal) -> Self {
        Self::from_decimal(amount)
    }
}

impl From<Naira> for Decimal {
    fn from(naira: Naira) -> Self {
        naira.0
    }
}
