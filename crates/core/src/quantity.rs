//! Line item quantities.
//!
//! A quantity is never below one. Every constructor clamps instead of
//! failing, so a quantity field edited to `0`, `-5` or `abc` becomes `1`.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A cart line quantity, always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// The smallest allowed quantity.
    pub const ONE: Self = Self(1);

    /// Clamp any signed value into a valid quantity.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        if value < 1 {
            return Self::ONE;
        }
        Self(u32::try_from(value).unwrap_or(u32::MAX))
    }

    /// Parse user input into a quantity.
    ///
    /// Reads an optional sign and the leading run of digits after any
    /// whitespace (`"3kg"` is 3). Input without a leading integer is 1.
    #[must_use]
    pub fn parse_clamped(input: &str) -> Self {
        let trimmed = input.trim_start();
        let (negative, rest) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, trimmed.get(1..).unwrap_or("")),
            Some(b'+') => (false, trimmed.get(1..).unwrap_or("")),
            _ => (false, trimmed),
        };

        let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let Some(digits) = rest.get(..digits_len).filter(|d| !d.is_empty()) else {
            return Self::ONE;
        };

        if negative {
            return Self::ONE;
        }

        // Overflowing input saturates rather than wrapping.
        digits
            .parse::<u32>()
            .map_or(Self(u32::MAX), |value| Self::clamped(i64::from(value)))
    }

    /// The quantity as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// The next quantity up, saturating at `u32::MAX`.
    #[must_use]
    pub const fn incremented(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Stored carts may hold 0 or negative quantities written by older pages.
        let value = i64::deserialize(deserializer)?;
        Ok(Self::clamped(value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_floor() {
        assert_eq!(Quantity::clamped(0), Quantity::ONE);
        assert_eq!(Quantity::clamped(-5), Quantity::ONE);
        assert_eq!(Quantity::clamped(4).get(), 4);
    }

    #[test]
    fn test_parse_clamped() {
        assert_eq!(Quantity::parse_clamped("7").get(), 7);
        assert_eq!(Quantity::parse_clamped("  3kg").get(), 3);
        assert_eq!(Quantity::parse_clamped("+2").get(), 2);
        assert_eq!(Quantity::parse_clamped("0"), Quantity::ONE);
        assert_eq!(Quantity::parse_clamped("-5"), Quantity::ONE);
        assert_eq!(Quantity::parse_clamped("abc"), Quantity::ONE);
        assert_eq!(Quantity::parse_clamped(""), Quantity::ONE);
    }

    #[test]
    fn test_parse_saturates() {
        assert_eq!(Quantity::parse_clamped("99999999999").get(), u32::MAX);
    }

    #[test]
    fn test_deserialize_clamps() {
        let q: Quantity = serde_json::from_str("0").unwrap();
        assert_eq!(q, Quantity::ONE);
        let q: Quantity = serde_json::from_str("5").unwrap();
        assert_eq!(q.get(), 5);
    }
}
