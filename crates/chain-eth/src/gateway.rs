//! The JSON-RPC collaborator the signing pipeline submits to and polls.
//!
//! Implementations are blocking. `Ok(None)` means the node does not know the
//! item yet (pending or unknown hash) and is not an error. Transport failures
//! surface as [`EthError::GatewayTimeout`] or [`EthError::GatewayUnavailable`]
//! and are never retried here.

use std::fmt;
use std::str::FromStr;

use num::BigUint;

use crate::address::Address;
use crate::error::EthError;
use crate::hash::{BlockHash, TxHash};
use crate::quantity::{decode_u64, encode_u64};
use crate::receipt::TransactionReceipt;

/// A block selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRef {
    Hash(BlockHash),
    Number(u64),
    Latest,
    Pending,
}

impl fmt::Display for BlockRef {
    /// The JSON-RPC parameter form: a hash, a hex quantity, or a tag.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockRef::Hash(hash) => write!(f, "{hash}"),
            BlockRef::Number(number) => f.write_str(&encode_u64(*number)),
            BlockRef::Latest => f.write_str("latest"),
            BlockRef::Pending => f.write_str("pending"),
        }
    }
}

impl FromStr for BlockRef {
    type Err = EthError;

    /// Accepts `latest`, `pending`, a 32-byte `0x` hash, a `0x` hex number,
    /// or a decimal number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "latest" => Ok(BlockRef::Latest),
            "pending" => Ok(BlockRef::Pending),
            hex if hex.starts_with("0x") && hex.len() == 66 => hex.parse().map(BlockRef::Hash),
            hex if hex.starts_with("0x") => decode_u64(hex).map(BlockRef::Number),
            decimal => decimal.parse().map(BlockRef::Number).map_err(|e| {
                EthError::EncodingError(format!("invalid block reference {decimal:?}: {e}"))
            }),
        }
    }
}

/// The network's view of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInfo {
    pub hash: TxHash,
    pub nonce: u64,
    pub from: Address,
    pub to: Option<Address>,
    pub value: BigUint,
    pub gas_price: Option<BigUint>,
    pub gas: u64,
    pub input: Vec<u8>,
    /// `None` while pending.
    pub block_hash: Option<BlockHash>,
    pub block_number: Option<u64>,
    pub transaction_index: Option<u64>,
}

impl TransactionInfo {
    pub fn is_pending(&self) -> bool {
        self.block_number.is_none()
    }
}

/// An `eth_call` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Option<Address>,
    pub to: Address,
    pub data: Vec<u8>,
}

pub trait RpcGateway {
    /// `eth_sendRawTransaction`. Returns the hash the node assigned.
    fn submit_raw(&self, raw: &[u8]) -> Result<TxHash, EthError>;

    /// `eth_getTransactionByHash`.
    fn transaction_by_hash(&self, hash: &TxHash) -> Result<Option<TransactionInfo>, EthError>;

    /// `eth_getTransactionByBlockHashAndIndex` or
    /// `eth_getTransactionByBlockNumberAndIndex`, depending on `block`.
    fn transaction_by_block(
        &self,
        block: BlockRef,
        index: u64,
    ) -> Result<Option<TransactionInfo>, EthError>;

    /// `eth_getTransactionReceipt`.
    fn receipt(&self, hash: &TxHash) -> Result<Option<TransactionReceipt>, EthError>;

    /// `eth_getTransactionCount`, the next nonce for `address`.
    fn transaction_count(&self, address: &Address, block: BlockRef) -> Result<u64, EthError>;

    /// `eth_call`, returning the raw return data.
    fn call(&self, request: &CallRequest, block: BlockRef) -> Result<Vec<u8>, EthError>;

    /// `eth_gasPrice`, the node's current legacy gas price in wei.
    fn gas_price(&self) -> Result<BigUint, EthError>;
}

impl<G: RpcGateway + ?Sized> RpcGateway for &G {
    fn submit_raw(&self, raw: &[u8]) -> Result<TxHash, EthError> {
        (**self).submit_raw(raw)
    }

    fn transaction_by_hash(&self, hash: &TxHash) -> Result<Option<TransactionInfo>, EthError> {
        (**self).transaction_by_hash(hash)
    }

    fn transaction_by_block(
        &self,
        block: BlockRef,
        index: u64,
    ) -> Result<Option<TransactionInfo>, EthError> {
        (**self).transaction_by_block(block, index)
    }

    fn receipt(&self, hash: &TxHash) -> Result<Option<TransactionReceipt>, EthError> {
        (**self).receipt(hash)
    }

    fn transaction_count(&self, address: &Address, block: BlockRef) -> Result<u64, EthError> {
        (**self).transaction_count(address, block)
    }

    fn call(&self, request: &CallRequest, block: BlockRef) -> Result<Vec<u8>, EthError> {
        (**self).call(request, block)
    }

    fn gas_price(&self) -> Result<BigUint, EthError> {
        (**self).gas_price()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_ref_parameter_forms() {
        assert_eq!(BlockRef::Latest.to_string(), "latest");
        assert_eq!(BlockRef::Pending.to_string(), "pending");
        assert_eq!(BlockRef::Number(0).to_string(), "0x0");
        assert_eq!(BlockRef::Number(4_387_850).to_string(), "0x42f40a");
        assert_eq!(
            BlockRef::Hash(BlockHash::from_bytes([0xab; 32])).to_string(),
            format!("0x{}", "ab".repeat(32))
        );
    }

    #[test]
    fn block_ref_parsing() {
        assert_eq!("latest".parse::<BlockRef>().unwrap(), BlockRef::Latest);
        assert_eq!("pending".parse::<BlockRef>().unwrap(), BlockRef::Pending);
        assert_eq!("9023354".parse::<BlockRef>().unwrap(), BlockRef::Number(9_023_354));
        assert_eq!("0x89af7a".parse::<BlockRef>().unwrap(), BlockRef::Number(9_023_354));

        let hash = format!("0x{}", "ab".repeat(32));
        assert_eq!(
            hash.parse::<BlockRef>().unwrap(),
            BlockRef::Hash(BlockHash::from_bytes([0xab; 32]))
        );

        assert!("earliest-ish".parse::<BlockRef>().is_err());
        assert!("-1".parse::<BlockRef>().is_err());
    }

    #[test]
    fn pending_transaction_has_no_block() {
        let info = TransactionInfo {
            hash: TxHash::from_bytes([1; 32]),
            nonce: 0,
            from: Address::ZERO,
            to: None,
            value: BigUint::from(0u8),
            gas_price: None,
            gas: 21_000,
            input: Vec::new(),
            block_hash: None,
            block_number: None,
            transaction_index: None,
        };
        assert!(info.is_pending());
    }
}
