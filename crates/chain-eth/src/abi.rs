//! Static ABI word encoding, enough for ERC-20 calls and results.

use num::BigUint;

use crate::address::Address;
use crate::error::EthError;
use crate::hash::keccak256;

/// A single static ABI parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiParam {
    /// Left-padded to 32 bytes.
    Address(Address),
    /// Big-endian 32-byte word.
    Uint256([u8; 32]),
}

impl AbiParam {
    /// A `uint256` from an arbitrary-precision value.
    pub fn uint(value: &BigUint) -> Result<Self, EthError> {
        uint256_word(value).map(AbiParam::Uint256)
    }

    fn to_word(&self) -> [u8; 32] {
        match self {
            AbiParam::Address(address) => address.to_word(),
            AbiParam::Uint256(word) => *word,
        }
    }
}

/// First four bytes of keccak256 of a canonical function signature such as
/// `transfer(address,uint256)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// `selector || word(params[0]) || word(params[1]) || ...`
pub fn encode_function_call(selector: [u8; 4], params: &[AbiParam]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + params.len() * 32);
    data.extend_from_slice(&selector);
    for param in params {
        data.extend_from_slice(&param.to_word());
    }
    data
}

/// Big-endian 32-byte word for `value`; `InvalidAmount` above 2^256 - 1.
pub fn uint256_word(value: &BigUint) -> Result<[u8; 32], EthError> {
    let bytes = value.to_bytes_be();
    if bytes.len() > 32 {
        return Err(EthError::InvalidAmount(format!(
            "{value} does not fit in uint256"
        )));
    }
    let mut word = [0u8; 32];
    word[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(word)
}

/// Reads the word at `index` (0-based) from ABI-encoded data.
pub fn word_at(data: &[u8], index: usize) -> Result<[u8; 32], EthError> {
    let start = index * 32;
    let end = start + 32;
    if data.len() < end {
        return Err(EthError::EncodingError(format!(
            "expected at least {end} bytes of ABI data, got {}",
            data.len()
        )));
    }
    let mut word = [0u8; 32];
    word.copy_from_slice(&data[start..end]);
    Ok(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_param_is_left_padded() {
        let mut bytes = [0u8; 20];
        bytes[0] = 0xde;
        bytes[19] = 0xad;
        let word = AbiParam::Address(Address::from_bytes(bytes)).to_word();
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(&word[12..], &bytes);
    }

    #[test]
    fn uint_param_is_big_endian() {
        let word = AbiParam::uint(&BigUint::from(0x0102u16)).unwrap().to_word();
        assert_eq!(&word[..30], &[0u8; 30]);
        assert_eq!(word[30], 0x01);
        assert_eq!(word[31], 0x02);
    }

    #[test]
    fn uint_rejects_values_above_256_bits() {
        let too_big = BigUint::from(1u8) << 256usize;
        assert!(matches!(uint256_word(&too_big), Err(EthError::InvalidAmount(_))));
    }

    #[test]
    fn selector_only_call() {
        let data = encode_function_call([0xa9, 0x05, 0x9c, 0xbb], &[]);
        assert_eq!(data, vec![0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn known_selectors() {
        assert_eq!(hex::encode(selector("transfer(address,uint256)")), "a9059cbb");
        assert_eq!(hex::encode(selector("balanceOf(address)")), "70a08231");
    }

    #[test]
    fn word_at_bounds() {
        let mut data = vec![0u8; 64];
        data[63] = 7;
        assert_eq!(word_at(&data, 1).unwrap()[31], 7);
        assert!(word_at(&data, 2).is_err());
    }
}
