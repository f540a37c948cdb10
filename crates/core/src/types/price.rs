//! Menu prices using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Prices cannot be negative.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
}

/// A non-negative menu price in US dollars.
///
/// The backend sends prices as JSON numbers (`8.99`); they are read as
/// decimals so `$8.99` never turns into `$8.989999`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Default)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Create a price, rejecting negative amounts.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount < 0`.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    /// The amount in dollars.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::from_cents(899).to_string(), "$8.99");
        assert_eq!(Price::from_cents(1200).to_string(), "$12.00");
    }

    #[test]
    fn test_negative_rejected() {
        let err = Price::new(Decimal::new(-1, 0)).unwrap_err();
        assert!(matches!(err, PriceError::Negative(_)));
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_deserialize_from_json_number() {
        let price: Price = serde_json::from_str("8.99").unwrap();
        assert_eq!(price, Price::from_cents(899));

        assert!(serde_json::from_str::<Price>("-2.5").is_err());
    }

    #[test]
    fn test_wire_format_is_a_json_number() {
        let json = serde_json::to_string(&Price::from_cents(1250)).unwrap();
        assert_eq!(json, "12.5");
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Price::from_cents(1250));
    }
}
