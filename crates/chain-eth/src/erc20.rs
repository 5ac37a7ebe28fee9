//! Calldata for the ERC-20 calls a wallet makes.

use num::BigUint;

use crate::abi::{encode_function_call, word_at, AbiParam};
use crate::address::Address;
use crate::error::EthError;

/// `transfer(address,uint256)`
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// `balanceOf(address)`
pub const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

/// `approve(address,uint256)`
pub const APPROVE_SELECTOR: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];

/// `transferFrom(address,address,uint256)`
pub const TRANSFER_FROM_SELECTOR: [u8; 4] = [0x23, 0xb8, 0x72, 0xdd];

/// `allowance(address,address)`
pub const ALLOWANCE_SELECTOR: [u8; 4] = [0xdd, 0x62, 0xed, 0x3e];

pub fn encode_transfer(to: &Address, amount: &BigUint) -> Result<Vec<u8>, EthError> {
    let params = [AbiParam::Address(*to), AbiParam::uint(amount)?];
    Ok(encode_function_call(TRANSFER_SELECTOR, &params))
}

pub fn encode_balance_of(owner: &Address) -> Vec<u8> {
    encode_function_call(BALANCE_OF_SELECTOR, &[AbiParam::Address(*owner)])
}

/// `allowance(owner, spender)`, the amount `spender` may still move.
pub fn encode_allowance(owner: &Address, spender: &Address) -> Vec<u8> {
    encode_function_call(
        ALLOWANCE_SELECTOR,
        &[AbiParam::Address(*owner), AbiParam::Address(*spender)],
    )
}

pub fn encode_approve(spender: &Address, amount: &BigUint) -> Result<Vec<u8>, EthError> {
    let params = [AbiParam::Address(*spender), AbiParam::uint(amount)?];
    Ok(encode_function_call(APPROVE_SELECTOR, &params))
}

pub fn encode_transfer_from(
    from: &Address,
    to: &Address,
    amount: &BigUint,
) -> Result<Vec<u8>, EthError> {
    let params = [
        AbiParam::Address(*from),
        AbiParam::Address(*to),
        AbiParam::uint(amount)?,
    ];
    Ok(encode_function_call(TRANSFER_FROM_SELECTOR, &params))
}

/// Decodes a single `uint256` return value, as returned by `balanceOf`.
/// Bytes past the first word are ignored.
pub fn decode_uint256(data: &[u8]) -> Result<BigUint, EthError> {
    word_at(data, 0).map(|word| BigUint::from_bytes_be(&word))
}
