//! Exact conversion between wei and the larger denominations.
//!
//! All arithmetic is integer or exact-decimal. Fractional digits beyond a
//! denomination's precision are truncated.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use num::{BigInt, BigUint, Integer, Signed, Zero};

use crate::error::EthError;

/// A denomination of value, expressed as a power of ten of wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Wei,
    Kwei,
    Mwei,
    Gwei,
    Szabo,
    Finney,
    Ether,
}

impl Unit {
    /// Number of decimal places between this unit and wei.
    pub fn decimals(self) -> u32 {
        match self {
            Unit::Wei => 0,
            Unit::Kwei => 3,
            Unit::Mwei => 6,
            Unit::Gwei => 9,
            Unit::Szabo => 12,
            Unit::Finney => 15,
            Unit::Ether => 18,
        }
    }

    /// `10^decimals` as a big integer.
    pub fn factor(self) -> BigUint {
        BigUint::from(10u8).pow(self.decimals())
    }

    pub fn name(self) -> &'static str {
        match self {
            Unit::Wei => "wei",
            Unit::Kwei => "kwei",
            Unit::Mwei => "mwei",
            Unit::Gwei => "gwei",
            Unit::Szabo => "szabo",
            Unit::Finney => "finney",
            Unit::Ether => "ether",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Unit {
    type Err = EthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wei" => Ok(Unit::Wei),
            "kwei" => Ok(Unit::Kwei),
            "mwei" => Ok(Unit::Mwei),
            "gwei" => Ok(Unit::Gwei),
            "szabo" => Ok(Unit::Szabo),
            "finney" => Ok(Unit::Finney),
            "ether" | "eth" => Ok(Unit::Ether),
            other => Err(EthError::InvalidAmount(format!("unknown unit: {other}"))),
        }
    }
}

/// Converts a decimal amount in `unit` to wei.
///
/// Digits below one wei are truncated, so
/// `to_base_unit("0.0000000000000000001", Unit::Ether)` is zero.
pub fn to_base_unit(amount: &str, unit: Unit) -> Result<BigUint, EthError> {
    parse_units(amount, unit.decimals())
}

/// Formats a wei amount as a decimal string in `unit`, without trailing
/// fractional zeros.
pub fn from_base_unit(amount: &BigUint, unit: Unit) -> String {
    format_units(amount, unit.decimals())
}

/// Scales a decimal amount by `10^decimals`, truncating the remainder.
/// Used directly for tokens whose decimals are not a named unit.
pub fn parse_units(amount: &str, decimals: u32) -> Result<BigUint, EthError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(EthError::InvalidAmount("empty amount".into()));
    }
    // BigDecimal would expand an exponent into that many digits.
    if trimmed.contains(['e', 'E']) {
        return Err(EthError::InvalidAmount(format!(
            "{trimmed}: exponent notation is not accepted"
        )));
    }

    let decimal = BigDecimal::from_str(trimmed)
        .map_err(|e| EthError::InvalidAmount(format!("{trimmed}: {e}")))?;

    if decimal.is_negative() {
        return Err(EthError::InvalidAmount(format!("{trimmed}: negative amount")));
    }

    // 10^decimals, as in `BigDecimal::new(1, -decimals)`.
    let scale = BigDecimal::new(BigInt::from(1u8), -i64::from(decimals));
    let scaled = (decimal * scale).with_scale(0);
    let (int, _) = scaled.as_bigint_and_exponent();

    int.to_biguint()
        .ok_or_else(|| EthError::InvalidAmount(format!("{trimmed}: negative amount")))
}

/// Inverse of [`parse_units`]: an exact decimal string with no trailing
/// fractional zeros.
pub fn format_units(amount: &BigUint, decimals: u32) -> String {
    if decimals == 0 {
        return amount.to_string();
    }

    let factor = BigUint::from(10u8).pow(decimals);
    let (whole, frac) = amount.div_rem(&factor);
    if frac.is_zero() {
        return whole.to_string();
    }

    let frac = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Converts a decimal amount between two denominations, truncating below
/// one wei.
pub fn convert(amount: &str, from: Unit, to: Unit) -> Result<String, EthError> {
    let wei = to_base_unit(amount, from)?;
    Ok(from_base_unit(&wei, to))
}
