//! Hex encodings used at the JSON-RPC boundary.
//!
//! Quantities are `0x`-prefixed big-endian hex without leading zeros (`0x0`
//! for zero). Data is `0x`-prefixed hex of the exact bytes. Decoding is
//! lenient about leading zeros in quantities, since some nodes emit them.

use num::{BigUint, Num, Zero};

use crate::error::EthError;

pub fn encode_quantity(value: &BigUint) -> String {
    if value.is_zero() {
        return "0x0".to_string();
    }
    format!("0x{}", value.to_str_radix(16))
}

pub fn encode_u64(value: u64) -> String {
    format!("{value:#x}")
}

pub fn encode_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn strip_prefix(s: &str) -> Result<&str, EthError> {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| EthError::EncodingError(format!("missing 0x prefix: {s}")))
}

pub fn decode_quantity(s: &str) -> Result<BigUint, EthError> {
    let digits = strip_prefix(s)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EthError::EncodingError(format!("invalid quantity: {s}")));
    }
    BigUint::from_str_radix(digits, 16)
        .map_err(|e| EthError::EncodingError(format!("invalid quantity {s}: {e}")))
}

pub fn decode_u64(s: &str) -> Result<u64, EthError> {
    let digits = strip_prefix(s)?;
    if digits.is_empty() {
        return Err(EthError::EncodingError(format!("invalid quantity: {s}")));
    }
    u64::from_str_radix(digits, 16)
        .map_err(|e| EthError::EncodingError(format!("invalid quantity {s}: {e}")))
}

pub fn decode_data(s: &str) -> Result<Vec<u8>, EthError> {
    let digits = strip_prefix(s)?;
    hex::decode(digits).map_err(|e| EthError::EncodingError(format!("invalid data {s}: {e}")))
}

/// Decodes exactly 32 bytes of data, as used for hashes and log topics.
pub fn decode_word(s: &str) -> Result<[u8; 32], EthError> {
    let bytes = decode_data(s)?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        EthError::EncodingError(format!("expected 32 bytes, got {}", bytes.len()))
    })
}
