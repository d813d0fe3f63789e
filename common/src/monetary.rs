//! Monetary types for the facilitator.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A monetary amount denominated in a settlement currency.
///
/// Amounts are carried internally as [`Decimal`] rather than floating
/// point so that batch totals sum exactly; the decimal string on the
/// wire (and in the canonical signature payload) is reparsed into this
/// type at the boundary and never round-tripped back through `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    /// Number of decimal places settlement totals are rounded to.
    pub const SCALE: u32 = 6;

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Parse a decimal string exactly as it appears on the wire.
    pub fn parse(value: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Self(value.parse()?))
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Round to [`Amount::SCALE`] decimal places using round-half-even.
    ///
    /// Chosen over round-half-up because repeated half-up rounding of
    /// batch totals biases the sum upward over many settlements.
    pub fn rounded(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointNearestEven),
        )
    }

    /// Render at [`Amount::SCALE`] decimal places, matching the format
    /// batch totals are reported in over the wire.
    pub fn to_fixed_string(&self) -> String {
        format!("{:.*}", Self::SCALE as usize, self.rounded().0)
    }

    /// Convert to integer minor units of a token with `decimals` places,
    /// truncating any remainder (the on-chain transfer encoding in use
    /// by the `Signer` capability never sees fractional minor units).
    pub fn to_minor_units(&self, decimals: u32) -> u64 {
        let scaled = self.0 * Decimal::from(10u64.pow(decimals));
        scaled.trunc().try_into().unwrap_or(0)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, other: Amount) -> Amount {
        Amount(self.0 + other.0)
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, other: Amount) -> Amount {
        Amount(self.0 - other.0)
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::zero(), Add::add)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A settlement currency code. The facilitator settles a single
/// currency per batch; cross-currency conversion is out of scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    pub fn usdc() -> Self {
        Self::new("USDC")
    }

    /// Standard minor-unit scale for this currency (USDC: 6).
    pub fn decimal_places(&self) -> u32 {
        match self.0.as_str() {
            "USDC" | "USDT" => 6,
            _ => 6,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_sum_is_exact() {
        let a = Amount::parse("0.6").unwrap();
        let b = Amount::parse("0.5").unwrap();
        let total = a + b;
        assert_eq!(total.to_fixed_string(), "1.100000");
    }

    #[test]
    fn test_rounding_half_even() {
        let half = Amount::parse("0.0000005").unwrap();
        // banker's rounding of an exact midpoint rounds to even (0)
        assert_eq!(half.rounded().to_fixed_string(), "0.000000");
    }

    #[test]
    fn test_minor_units_conversion() {
        let amount = Amount::parse("1.5").unwrap();
        assert_eq!(amount.to_minor_units(6), 1_500_000);
    }

    #[test]
    fn test_currency_default_scale() {
        assert_eq!(Currency::usdc().decimal_places(), 6);
    }
}
