//! Interpreting transaction receipts and their event logs.
//!
//! A failed execution is a normal receipt with [`ReceiptStatus::Failure`],
//! never an error. Errors here only mean a log does not have the shape of the
//! event being decoded.

use num::BigUint;

use crate::address::Address;
use crate::error::EthError;
use crate::hash::TxHash;

/// keccak256("Transfer(address,address,uint256)")
pub const TRANSFER_EVENT_TOPIC: [u8; 32] = [
    0xdd, 0xf2, 0x52, 0xad, 0x1b, 0xe2, 0xc8, 0x9b, 0x69, 0xc2, 0xb0, 0x68, 0xfc, 0x37, 0x8d, 0xaa,
    0x95, 0x2b, 0xa7, 0xf1, 0x63, 0xc4, 0xa1, 0x16, 0x28, 0xf5, 0x5a, 0x4d, 0xf5, 0x23, 0xb3, 0xef,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    Success,
    Failure,
}

impl ReceiptStatus {
    /// Maps the post-Byzantium status field: 1 is success, anything else is
    /// failure.
    pub fn from_code(code: u64) -> Self {
        if code == 1 {
            ReceiptStatus::Success
        } else {
            ReceiptStatus::Failure
        }
    }
}

/// One log emitted during execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Contract that emitted the log.
    pub address: Address,
    pub topics: Vec<[u8; 32]>,
    pub data: Vec<u8>,
}

/// The network's record of an executed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    pub status: ReceiptStatus,
    pub gas_used: BigUint,
    /// Present on nodes that report `effectiveGasPrice`.
    pub effective_gas_price: Option<BigUint>,
    pub block_number: u64,
    pub from: Address,
    pub to: Option<Address>,
    pub contract_address: Option<Address>,
    pub logs: Vec<LogEntry>,
}

/// A decoded ERC-20 `Transfer(from, to, amount)` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    /// Token contract that emitted the event.
    pub token: Address,
    pub from: Address,
    pub to: Address,
    pub amount: BigUint,
}

pub fn is_success(receipt: &TransactionReceipt) -> bool {
    receipt.status == ReceiptStatus::Success
}

/// `gas_used * gas_price`.
pub fn total_fee(receipt: &TransactionReceipt, gas_price: &BigUint) -> BigUint {
    &receipt.gas_used * gas_price
}

/// The fee actually charged, when the receipt carries the effective price.
pub fn effective_fee(receipt: &TransactionReceipt) -> Option<BigUint> {
    receipt
        .effective_gas_price
        .as_ref()
        .map(|price| total_fee(receipt, price))
}

/// Decodes a `Transfer` log.
///
/// Requires exactly three topics (signature, `from`, `to`), topic 0 equal to
/// [`TRANSFER_EVENT_TOPIC`], and exactly 32 bytes of data holding the
/// big-endian amount.
pub fn decode_transfer_event(log: &LogEntry) -> Result<TransferEvent, EthError> {
    if log.topics.len() != 3 {
        return Err(EthError::MalformedLog(format!(
            "expected 3 topics, got {}",
            log.topics.len()
        )));
    }
    if log.data.len() != 32 {
        return Err(EthError::MalformedLog(format!(
            "expected 32 bytes of data, got {}",
            log.data.len()
        )));
    }
    if log.topics[0] != TRANSFER_EVENT_TOPIC {
        return Err(EthError::MalformedLog(format!(
            "topic 0x{} is not the Transfer signature",
            hex::encode(log.topics[0])
        )));
    }

    Ok(TransferEvent {
        token: log.address,
        from: Address::from_word(&log.topics[1]),
        to: Address::from_word(&log.topics[2]),
        amount: BigUint::from_bytes_be(&log.data),
    })
}

/// All `Transfer` events in the receipt, in log order. Logs of other events
/// are skipped.
pub fn transfer_events(receipt: &TransactionReceipt) -> Vec<TransferEvent> {
    receipt
        .logs
        .iter()
        .filter(|log| log.topics.first() == Some(&TRANSFER_EVENT_TOPIC))
        .filter_map(|log| match decode_transfer_event(log) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::debug!(error = %e, "skipping Transfer log");
                None
            }
        })
        .collect()
}
