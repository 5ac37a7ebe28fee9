//! EVM key management and transaction signing.
//!
//! This crate provides:
//! - secp256k1 key pairs and address derivation (with EIP-55 checksums)
//! - recoverable message signatures (EIP-191 personal messages)
//! - EIP-155 legacy and EIP-1559 transaction encoding and signing
//! - receipt interpretation and ERC-20 `Transfer` log decoding
//! - exact wei/gwei/ether conversion
//! - ERC-20 calldata, a static EVM chain table, and the JSON-RPC gateway
//!   contract used to submit and poll transactions
//!
//! Nothing here reads the environment or talks to the network; secrets and
//! gateways are passed in explicitly.

pub mod abi;
pub mod address;
pub mod chains;
pub mod eip1559;
pub mod envelope;
pub mod erc20;
pub mod error;
pub mod gateway;
pub mod hash;
pub mod keys;
pub mod quantity;
pub mod receipt;
mod rlp;
pub mod signer;
pub mod transaction;
pub mod units;

pub use address::Address;
pub use eip1559::{Eip1559Transaction, SignedEip1559Transaction};
pub use envelope::TxEnvelope;
pub use error::EthError;
pub use gateway::{BlockRef, CallRequest, RpcGateway, TransactionInfo};
pub use hash::{BlockHash, TxHash};
pub use keys::{KeyPair, PrivateKey, PublicKey};
pub use receipt::{LogEntry, ReceiptStatus, TransactionReceipt, TransferEvent};
pub use signer::SignatureData;
pub use transaction::{LegacyTransaction, Signable, SignedEnvelope, SignedTransaction};
pub use units::Unit;
