use std::fmt;
use std::str::FromStr;

use sha3::{Digest, Keccak256};

use crate::error::EthError;
use crate::keys::PublicKey;

/// A 20-byte account address.
///
/// Equality is on the raw bytes, so two textual forms that differ only in
/// EIP-55 casing compare equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Builds an address from the low 20 bytes of a 32-byte ABI word or log
    /// topic, dropping the 12 bytes of left padding.
    pub fn from_word(word: &[u8; 32]) -> Self {
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&word[12..]);
        Self(bytes)
    }

    /// Left-pads the address into a 32-byte word.
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&self.0);
        word
    }

    /// Canonical lowercase `0x`-prefixed form.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// EIP-55 mixed-case form.
    pub fn to_checksum(&self) -> String {
        checksum_hex(&hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = EthError;

    /// Parses a `0x`-prefixed address. All-lowercase and all-uppercase input
    /// is accepted as is; mixed case must carry a valid EIP-55 checksum.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !validate_address(s)? {
            return Err(EthError::InvalidAddress(format!("bad EIP-55 checksum: {s}")));
        }
        let bytes = hex::decode(&s[2..])
            .map_err(|e| EthError::InvalidAddress(format!("invalid hex: {e}")))?;
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&bytes);
        Ok(Self(addr))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

/// Derives the address of a public key: the low 20 bytes of
/// `keccak256(x || y)`.
pub fn derive_address(public_key: &PublicKey) -> Address {
    let hash = Keccak256::digest(public_key.as_bytes());
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash[12..]);
    Address(addr)
}

/// Validates an address string.
///
/// Errors on malformed input (prefix, length, non-hex). Returns `Ok(false)`
/// when a mixed-case address fails its EIP-55 checksum.
pub fn validate_address(address: &str) -> Result<bool, EthError> {
    let hex_part = strip_and_check(address)?;

    let is_all_lower = hex_part.chars().all(|c| !c.is_ascii_uppercase());
    let is_all_upper = hex_part.chars().all(|c| !c.is_ascii_lowercase());
    if is_all_lower || is_all_upper {
        return Ok(true);
    }

    Ok(checksum_hex(&hex_part.to_lowercase()) == address)
}

fn strip_and_check(address: &str) -> Result<&str, EthError> {
    let hex_part = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| EthError::InvalidAddress("address must start with 0x".into()))?;

    if hex_part.len() != 40 {
        return Err(EthError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }

    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EthError::InvalidAddress(
            "address contains non-hex characters".into(),
        ));
    }

    Ok(hex_part)
}

/// EIP-55 over 40 lowercase hex digits (no prefix).
fn checksum_hex(lower_hex: &str) -> String {
    let hash = Keccak256::digest(lower_hex.as_bytes());

    let mut checksummed = String::with_capacity(42);
    checksummed.push_str("0x");

    for (i, c) in lower_hex.chars().enumerate() {
        // Nibble i of the hash decides the case of character i.
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }

    checksummed
}
