//! RLP field wrappers shared by the transaction encoders.
//!
//! Encoding goes through `alloy_rlp::Encodable` so the field structs can use
//! `#[derive(RlpEncodable)]`. Decoding is strict: integers must be minimal,
//! strings must use the shortest header, and unexpected lists are rejected.

use alloy_rlp::{BufMut, Encodable, Header, EMPTY_STRING_CODE};
use num::{BigInt, BigUint, Signed, Zero};

use crate::address::Address;
use crate::error::EthError;

/// An unsigned integer of at most 256 bits, stored as minimal big-endian
/// bytes (empty for zero).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RlpUint(Vec<u8>);

impl RlpUint {
    pub(crate) fn from_word(word: &[u8; 32]) -> Self {
        let start = word.iter().position(|&b| b != 0).unwrap_or(32);
        Self(word[start..].to_vec())
    }

    pub(crate) fn from_biguint(value: &BigUint) -> Option<Self> {
        if value.is_zero() {
            return Some(Self(Vec::new()));
        }
        let bytes = value.to_bytes_be();
        (bytes.len() <= 32).then_some(Self(bytes))
    }

    /// Checks a signed money field: non-negative and at most 2^256 - 1.
    pub(crate) fn from_amount(value: &BigInt, field: &str) -> Result<Self, EthError> {
        if value.is_negative() {
            return Err(EthError::InvalidTransaction(format!(
                "{field} must not be negative, got {value}"
            )));
        }
        value
            .to_biguint()
            .and_then(|v| Self::from_biguint(&v))
            .ok_or_else(|| EthError::InvalidTransaction(format!("{field} exceeds 256 bits")))
    }

    pub(crate) fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }

    pub(crate) fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[32 - self.0.len()..].copy_from_slice(&self.0);
        word
    }

    pub(crate) fn decode(buf: &mut &[u8]) -> Result<Self, EthError> {
        let payload = decode_string(buf)?;
        if payload.len() > 32 {
            return Err(EthError::EncodingError(format!(
                "integer of {} bytes exceeds 256 bits",
                payload.len()
            )));
        }
        if payload.first() == Some(&0) {
            return Err(EthError::EncodingError("integer has leading zero".into()));
        }
        Ok(Self(payload.to_vec()))
    }
}

impl Encodable for RlpUint {
    fn encode(&self, out: &mut dyn BufMut) {
        self.0.as_slice().encode(out);
    }

    fn length(&self) -> usize {
        self.0.as_slice().length()
    }
}

/// The `to` field: 20 bytes, or the empty string for contract creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RlpTo(pub(crate) Option<Address>);

impl RlpTo {
    pub(crate) fn decode(buf: &mut &[u8]) -> Result<Self, EthError> {
        let payload = decode_string(buf)?;
        match payload.len() {
            0 => Ok(Self(None)),
            20 => {
                let mut bytes = [0u8; 20];
                bytes.copy_from_slice(payload);
                Ok(Self(Some(Address::from_bytes(bytes))))
            }
            n => Err(EthError::EncodingError(format!(
                "recipient must be 0 or 20 bytes, got {n}"
            ))),
        }
    }
}

impl Encodable for RlpTo {
    fn encode(&self, out: &mut dyn BufMut) {
        match &self.0 {
            Some(address) => address.as_bytes().as_slice().encode(out),
            None => out.put_u8(EMPTY_STRING_CODE),
        }
    }

    fn length(&self) -> usize {
        match &self.0 {
            Some(address) => address.as_bytes().as_slice().length(),
            None => 1,
        }
    }
}

/// An opaque byte string (calldata).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RlpBytes(pub(crate) Vec<u8>);

impl RlpBytes {
    pub(crate) fn decode(buf: &mut &[u8]) -> Result<Self, EthError> {
        decode_string(buf).map(|payload| Self(payload.to_vec()))
    }
}

impl Encodable for RlpBytes {
    fn encode(&self, out: &mut dyn BufMut) {
        self.0.as_slice().encode(out);
    }

    fn length(&self) -> usize {
        self.0.as_slice().length()
    }
}

/// An always-empty list, used for EIP-1559 access lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct EmptyList;

impl Encodable for EmptyList {
    fn encode(&self, out: &mut dyn BufMut) {
        Header {
            list: true,
            payload_length: 0,
        }
        .encode(out);
    }

    fn length(&self) -> usize {
        1
    }
}

pub(crate) fn decode_u64(buf: &mut &[u8]) -> Result<u64, EthError> {
    let value = RlpUint::decode(buf)?;
    if value.0.len() > 8 {
        return Err(EthError::EncodingError("integer exceeds 64 bits".into()));
    }
    Ok(value.0.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

/// Returns the payload of a string item and advances past it.
fn decode_string<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8], EthError> {
    let header = Header::decode(buf)?;
    if header.list {
        return Err(EthError::EncodingError("expected string, found list".into()));
    }
    take(buf, header.payload_length)
}

/// Returns the payload of a list item and advances past it.
pub(crate) fn decode_list<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8], EthError> {
    let header = Header::decode(buf)?;
    if !header.list {
        return Err(EthError::EncodingError("expected list, found string".into()));
    }
    take(buf, header.payload_length)
}

fn take<'a>(buf: &mut &'a [u8], len: usize) -> Result<&'a [u8], EthError> {
    if buf.len() < len {
        return Err(EthError::EncodingError(format!(
            "item needs {len} bytes, {} left",
            buf.len()
        )));
    }
    let (payload, rest) = buf.split_at(len);
    *buf = rest;
    Ok(payload)
}
