//! Type-safe unit price with lossy coercion from persisted JSON.
//!
//! Cart documents predate schema validation: unit prices have been observed
//! as JSON numbers, as numeric strings, and occasionally as garbage. [`Price`]
//! owns the coercion policy so that every reader and writer of the store
//! applies the same rule: anything that is not a non-negative number becomes
//! zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A non-negative unit price in the store currency.
///
/// Serializes as a decimal string (`"199.00"`), which matches how prices are
/// stored in cart documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// The zero price, used as the default for absent or invalid values.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// Negative amounts are clamped to zero; a cart line can never owe the
    /// customer money.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        if amount.is_sign_negative() {
            Self::ZERO
        } else {
            Self(amount)
        }
    }

    /// Coerce a loosely-typed JSON value into a price.
    ///
    /// Accepts JSON numbers and numeric strings (including scientific
    /// notation). Missing fields, non-numeric values, and negative amounts
    /// all normalize to [`Price::ZERO`].
    #[must_use]
    pub fn coerce(value: &Value) -> Self {
        let parsed = match value {
            Value::Number(n) => parse_decimal(&n.to_string()),
            Value::String(s) => parse_decimal(s.trim()),
            _ => None,
        };

        match parsed {
            Some(amount) if !amount.is_sign_negative() => Self(amount),
            _ => Self::ZERO,
        }
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse a decimal from a string, falling back to scientific notation.
fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    s.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerces_numbers_and_numeric_strings() {
        assert_eq!(Price::coerce(&json!(100)).amount(), Decimal::from(100));
        assert_eq!(Price::coerce(&json!("100")).amount(), Decimal::from(100));
        assert_eq!(
            Price::coerce(&json!("249.50")).amount(),
            "249.50".parse().expect("decimal")
        );
        assert_eq!(Price::coerce(&json!(19.99)).amount(), "19.99".parse().expect("decimal"));
    }

    #[test]
    fn invalid_values_default_to_zero() {
        assert_eq!(Price::coerce(&Value::Null), Price::ZERO);
        assert_eq!(Price::coerce(&json!("")), Price::ZERO);
        assert_eq!(Price::coerce(&json!("  ")), Price::ZERO);
        assert_eq!(Price::coerce(&json!("free")), Price::ZERO);
        assert_eq!(Price::coerce(&json!(true)), Price::ZERO);
        assert_eq!(Price::coerce(&json!({"amount": 5})), Price::ZERO);
        assert_eq!(Price::coerce(&json!([5])), Price::ZERO);
    }

    #[test]
    fn negative_values_default_to_zero() {
        assert_eq!(Price::coerce(&json!(-5)), Price::ZERO);
        assert_eq!(Price::coerce(&json!("-5.50")), Price::ZERO);
    }

    #[test]
    fn serializes_as_decimal_string() {
        let price = Price::coerce(&json!("42.10"));
        let json = serde_json::to_string(&price).expect("serialize");
        assert_eq!(json, "\"42.10\"");

        let back: Price = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, price);
    }
}
