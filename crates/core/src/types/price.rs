//! Type-safe price representation using decimal arithmetic.
//!
//! The marketplace API exchanges prices as JSON numbers. They are held as
//! [`Decimal`] rounded to cents so cart arithmetic never drifts.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A price in US dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price, rounding to whole cents (half away from zero).
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Create a price from a number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the price is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Format for display, e.g. `$19.99`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("${:.2}", self.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        Self::new(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        rust_decimal::serde::float::deserialize(deserializer).map(Self::new)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Price::from_cents(1999).display(), "$19.99");
        assert_eq!(Price::from_cents(500).display(), "$5.00");
        assert_eq!(Price::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn test_new_rounds_to_cents() {
        let price = Price::new(Decimal::new(10_005, 3));
        assert_eq!(price, Price::from_cents(1001));
    }

    #[test]
    fn test_arithmetic() {
        let unit = Price::from_cents(1250);
        assert_eq!(unit * 3, Price::from_cents(3750));
        assert_eq!(unit + Price::from_cents(50), Price::from_cents(1300));

        let total: Price = [unit, unit].into_iter().sum();
        assert_eq!(total, Price::from_cents(2500));
    }

    #[test]
    fn test_json_number_roundtrip() {
        let price: Price = serde_json::from_str("89.99").unwrap();
        assert_eq!(price, Price::from_cents(8999));
        assert_eq!(serde_json::to_string(&price).unwrap(), "89.99");

        let whole: Price = serde_json::from_str("20").unwrap();
        assert_eq!(whole.display(), "$20.00");
    }
}
