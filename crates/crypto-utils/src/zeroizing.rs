use std::ops::Deref;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// A `Vec<u8>` wrapper that is zeroed when dropped.
///
/// Holds decoded private-key material between parsing and handing it to the
/// signing key, so the intermediate copy does not linger in memory.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ZeroizingBytes(Vec<u8>);

impl ZeroizingBytes {
    pub fn new(data: Vec<u8>) -> Self {
        Self(data)
    }

    /// Decodes a hex string (optional `0x` prefix) straight into a zeroizing
    /// buffer.
    pub fn from_hex(input: &str) -> Result<Self, CryptoError> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        hex::decode(digits)
            .map(Self)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid hex: {e}")))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for ZeroizingBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for ZeroizingBytes {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

// Never print the contents.
impl std::fmt::Debug for ZeroizingBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ZeroizingBytes([REDACTED; {}])", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deref_exposes_bytes() {
        let zb = ZeroizingBytes::new(vec![1u8, 2, 3]);
        assert_eq!(&*zb, &[1u8, 2, 3]);
        assert_eq!(zb.len(), 3);
        assert!(!zb.is_empty());
    }

    #[test]
    fn from_hex_with_and_without_prefix() {
        let a = ZeroizingBytes::from_hex("0xdeadBEEF").unwrap();
        let b = ZeroizingBytes::from_hex("deadbeef").unwrap();
        assert_eq!(&*a, &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(&*a, &*b);
    }

    #[test]
    fn from_hex_trims_whitespace() {
        let zb = ZeroizingBytes::from_hex("  0x01ff\n").unwrap();
        assert_eq!(&*zb, &[0x01, 0xff]);
    }

    #[test]
    fn from_hex_rejects_odd_length() {
        assert!(ZeroizingBytes::from_hex("0xabc").is_err());
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        assert!(ZeroizingBytes::from_hex("0xzz").is_err());
    }

    #[test]
    fn debug_is_redacted() {
        let zb = ZeroizingBytes::new(vec![0xAA; 32]);
        let debug = format!("{zb:?}");
        assert!(!debug.contains("170"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn manual_zeroize_clears() {
        let mut zb = ZeroizingBytes::new(vec![0xAA; 32]);
        zb.zeroize();
        assert!(zb.is_empty());
    }
}
