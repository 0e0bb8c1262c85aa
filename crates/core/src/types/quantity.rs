//! Line-item quantity with lossy coercion from persisted JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A positive line-item quantity.
///
/// The invariant is `>= 1`: a line at quantity zero does not exist, it is
/// removed from the cart. Construction through [`Quantity::new`] or
/// [`Quantity::coerce`] upholds this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// The minimum quantity, used as the default for absent or invalid values.
    pub const ONE: Self = Self(1);

    /// Create a quantity, clamping values below 1 up to 1.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        if value == 0 { Self(1) } else { Self(value) }
    }

    /// Coerce a loosely-typed JSON value into a quantity.
    ///
    /// Accepts JSON numbers and numeric strings; fractional values truncate
    /// toward zero. Missing fields, non-numeric values, and results below 1
    /// all normalize to [`Quantity::ONE`].
    #[must_use]
    pub fn coerce(value: &Value) -> Self {
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };

        match parsed {
            Some(n) if n.is_finite() && n.trunc() >= 1.0 && n.trunc() <= f64::from(u32::MAX) => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let value = n.trunc() as u32;
                Self(value)
            }
            _ => Self::ONE,
        }
    }

    /// Get the underlying count.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// The next quantity up.
    #[must_use]
    pub const fn increment(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// The next quantity down, or `None` when the line should be removed.
    #[must_use]
    pub const fn decrement(&self) -> Option<Self> {
        match self.0 {
            0 | 1 => None,
            n => Some(Self(n - 1)),
        }
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerces_numbers_and_numeric_strings() {
        assert_eq!(Quantity::coerce(&json!(3)).get(), 3);
        assert_eq!(Quantity::coerce(&json!("2")).get(), 2);
        assert_eq!(Quantity::coerce(&json!(" 4 ")).get(), 4);
    }

    #[test]
    fn fractional_values_truncate() {
        assert_eq!(Quantity::coerce(&json!(2.9)).get(), 2);
        assert_eq!(Quantity::coerce(&json!("2.5")).get(), 2);
    }

    #[test]
    fn invalid_values_default_to_one() {
        assert_eq!(Quantity::coerce(&Value::Null), Quantity::ONE);
        assert_eq!(Quantity::coerce(&json!("")), Quantity::ONE);
        assert_eq!(Quantity::coerce(&json!("lots")), Quantity::ONE);
        assert_eq!(Quantity::coerce(&json!(true)), Quantity::ONE);
        assert_eq!(Quantity::coerce(&json!(0)), Quantity::ONE);
        assert_eq!(Quantity::coerce(&json!(-3)), Quantity::ONE);
        assert_eq!(Quantity::coerce(&json!(0.4)), Quantity::ONE);
        assert_eq!(Quantity::coerce(&json!("NaN")), Quantity::ONE);
    }

    #[test]
    fn decrement_at_one_signals_removal() {
        assert_eq!(Quantity::new(3).decrement(), Some(Quantity::new(2)));
        assert_eq!(Quantity::new(1).decrement(), None);
    }

    #[test]
    fn increment_saturates() {
        assert_eq!(Quantity::new(u32::MAX).increment().get(), u32::MAX);
    }
}
