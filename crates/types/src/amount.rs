use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Fixed-point decimal precision used by every on-disk amount column
/// (`DECIMAL(23,7)`).
pub const SCALE: u32 = 7;

/// A ledger amount, backed by `rust_decimal::Decimal` rather than a float so
/// that balance arithmetic never loses precision or accumulates rounding
/// error across transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value.round_dp(SCALE))
    }

    pub fn inner(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self::from_decimal)
    }

    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self::from_decimal)
    }

    /// Strip trailing zeros, as the faucet path does before hashing
    /// (`Use(lambda x: x.normalize())` in the original schema).
    pub fn normalized(&self) -> Self {
        Self(self.0.normalize())
    }

    /// The exact textual form fed into the canonical hash input - mirrors
    /// `str(amount)` on a Python `Decimal`, which preserves whatever scale
    /// the value already carries.
    pub fn canonical_string(&self) -> String {
        self.0.to_string()
    }

    /// Parse a transfer amount, rejecting anything that isn't strictly
    /// positive or that carries more than `SCALE` fractional digits - unlike
    /// `FromStr`, which silently rounds.
    pub fn parse_strict(s: &str) -> Result<Self, TypesError> {
        let decimal = Decimal::from_str(s).map_err(|_| TypesError::InvalidAmount(s.to_string()))?;
        if decimal.scale() > SCALE {
            return Err(TypesError::InvalidAmount(s.to_string()));
        }
        if decimal <= Decimal::ZERO {
            return Err(TypesError::InvalidAmount(s.to_string()));
        }
        Ok(Self(decimal))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.round_dp(SCALE))
    }
}

impl FromStr for Amount {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .map(Self::from_decimal)
            .map_err(|_| TypesError::InvalidAmount(s.to_string()))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Self::from_decimal(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::from_decimal(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_respects_scale() {
        let a = Amount::from_str("10.12345678").unwrap();
        assert_eq!(a.to_string(), "10.1234568"); // rounded to 7dp
    }

    #[test]
    fn checked_sub_detects_overflow_free_path() {
        let a = Amount::from_str("5").unwrap();
        let b = Amount::from_str("3").unwrap();
        assert_eq!(a.checked_sub(&b).unwrap().to_string(), "2.0000000");
    }

    #[test]
    fn normalize_strips_trailing_zeros() {
        let a = Amount::from_str("10.0000000").unwrap();
        assert_eq!(a.normalized().canonical_string(), "10");
    }

    #[test]
    fn parse_strict_rejects_too_many_fractional_digits() {
        assert!(Amount::parse_strict("1.12345678").is_err());
        assert!(Amount::parse_strict("1.1234567").is_ok());
    }

    #[test]
    fn parse_strict_rejects_zero_and_negative() {
        assert!(Amount::parse_strict("0").is_err());
        assert!(Amount::parse_strict("-1").is_err());
    }
}
