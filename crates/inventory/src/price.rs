use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, ValueObject};

/// Unit price of a product, held in the smallest currency unit (cents).
///
/// Prices are stored as `NUMERIC(31,2)`, so two decimal places are kept and
/// anything finer is rounded half away from zero. On the wire a price is a
/// plain JSON number (`4.3`), which is why serde goes through `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price {
    cents: i64,
}

impl Price {
    /// Largest accepted price in cents. Keeps every price exactly
    /// representable as an `f64` decimal on the wire.
    pub const MAX_CENTS: i64 = 999_999_999_999_999;

    pub fn from_cents(cents: i64) -> DomainResult<Self> {
        if cents <= 0 {
            return Err(DomainError::validation("price must be greater than zero"));
        }
        if cents > Self::MAX_CENTS {
            return Err(DomainError::validation("price is too large"));
        }
        Ok(Self { cents })
    }

    pub fn from_decimal(value: f64) -> DomainResult<Self> {
        if !value.is_finite() {
            return Err(DomainError::validation("price must be a finite number"));
        }
        let cents = (value * 100.0).round();
        if cents > Self::MAX_CENTS as f64 {
            return Err(DomainError::validation("price is too large"));
        }
        Self::from_cents(cents as i64)
    }

    pub fn cents(self) -> i64 {
        self.cents
    }

    pub fn as_decimal(self) -> f64 {
        self.cents as f64 / 100.0
    }
}

impl ValueObject for Price {}

impl TryFrom<f64> for Price {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_decimal(value)
    }
}

impl From<Price> for f64 {
    fn from(value: Price) -> Self {
        value.as_decimal()
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_prices_round_to_cents() {
        assert_eq!(Price::from_decimal(4.3).unwrap().cents(), 430);
        assert_eq!(Price::from_decimal(27.89).unwrap().cents(), 2789);
        assert_eq!(Price::from_decimal(0.005).unwrap().cents(), 1);
        assert_eq!(Price::from_decimal(52.554).unwrap().cents(), 5255);
    }

    #[test]
    fn non_positive_prices_are_rejected() {
        assert!(matches!(Price::from_decimal(0.0), Err(DomainError::Validation(_))));
        assert!(matches!(Price::from_decimal(-1.5), Err(DomainError::Validation(_))));
        // Rounds to zero cents.
        assert!(matches!(Price::from_decimal(0.004), Err(DomainError::Validation(_))));
        assert!(matches!(Price::from_cents(0), Err(DomainError::Validation(_))));
    }

    #[test]
    fn non_finite_and_huge_prices_are_rejected() {
        assert!(Price::from_decimal(f64::NAN).is_err());
        assert!(Price::from_decimal(f64::INFINITY).is_err());
        assert!(Price::from_decimal(1e20).is_err());
        assert!(Price::from_cents(Price::MAX_CENTS + 1).is_err());
    }

    #[test]
    fn json_uses_plain_decimal_numbers() {
        let price: Price = serde_json::from_str("4.3").unwrap();
        assert_eq!(price.cents(), 430);
        assert_eq!(serde_json::to_string(&price).unwrap(), "4.3");
        assert!(serde_json::from_str::<Price>("-2").is_err());
    }

    #[test]
    fn display_keeps_two_decimals() {
        assert_eq!(Price::from_cents(430).unwrap().to_string(), "4.30");
        assert_eq!(Price::from_cents(5).unwrap().to_string(), "0.05");
    }
}
