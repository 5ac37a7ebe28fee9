//! Wallet workflows built on `chain_eth`: key generation, message signing,
//! value and ERC-20 transfers, and reading results back from the network.
//!
//! Every function takes its key and gateway explicitly, so the same flows run
//! against a live node or an in-memory gateway in tests.

pub mod config;
pub mod error;

use std::thread;
use std::time::Duration;

use chain_eth::receipt::{effective_fee, is_success, transfer_events, TransferEvent};
use chain_eth::signer::{self, SignatureData};
use chain_eth::transaction::sign_transaction;
use chain_eth::{
    erc20, Address, BlockRef, CallRequest, Eip1559Transaction, LegacyTransaction, PrivateKey,
    RpcGateway, Signable, SignedEnvelope, TransactionReceipt, TxEnvelope, TxHash,
};
use num::{BigInt, BigUint, Zero};

pub use config::{Config, ConfigArgs};
pub use error::{Result, WorkoutError};

/// Receipt polling schedule used by the CLI.
pub const RECEIPT_POLL_ATTEMPTS: u32 = 40;
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Gas limit of a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// A signed message together with the address recovered from it.
#[derive(Debug, Clone)]
pub struct MessageProof {
    pub signature: SignatureData,
    pub signer: Address,
    pub recovered: Address,
}

impl MessageProof {
    pub fn verified(&self) -> bool {
        self.signer == self.recovered
    }
}

/// Signs `message` and immediately recovers the signer from the signature.
pub fn sign_and_verify(message: &[u8], private_key: &PrivateKey) -> Result<MessageProof> {
    let signature = signer::sign_message(message, private_key)?;
    let recovered = signer::recover_message(message, &signature)?.address();
    Ok(MessageProof {
        signature,
        signer: private_key.address(),
        recovered,
    })
}

/// Default tip for type-2 transactions: 1 gwei.
pub const DEFAULT_PRIORITY_FEE_WEI: u64 = 1_000_000_000;

/// How the sender pays for gas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeeSettings {
    /// Legacy `gasPrice`. `None` asks the node for `eth_gasPrice`.
    Legacy { gas_price: Option<BigUint> },
    /// Type-2 fees. Without a cap, `max_fee` is twice the node's gas price
    /// plus the tip.
    Eip1559 {
        max_fee: Option<BigUint>,
        priority_fee: BigUint,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasSettings {
    pub fees: FeeSettings,
    pub gas_limit: u64,
}

impl GasSettings {
    pub fn legacy(gas_price: Option<BigUint>, gas_limit: u64) -> Self {
        Self {
            fees: FeeSettings::Legacy { gas_price },
            gas_limit,
        }
    }

    pub fn eip1559(max_fee: Option<BigUint>, priority_fee: BigUint, gas_limit: u64) -> Self {
        Self {
            fees: FeeSettings::Eip1559 {
                max_fee,
                priority_fee,
            },
            gas_limit,
        }
    }

    /// Legacy pricing at the node's gas price with the plain transfer limit.
    pub fn transfer() -> Self {
        Self::legacy(None, TRANSFER_GAS_LIMIT)
    }
}

/// A transaction the node has accepted.
#[derive(Debug, Clone)]
pub struct Submission {
    pub hash: TxHash,
    pub signed: TxEnvelope,
}

/// Sends `value_wei` to `to`, using the account's pending nonce.
pub fn send_native_transfer<G: RpcGateway>(
    gateway: &G,
    private_key: &PrivateKey,
    chain_id: u64,
    to: &Address,
    value_wei: &BigUint,
    gas: &GasSettings,
) -> Result<Submission> {
    send_call(gateway, private_key, chain_id, to, value_wei.clone(), Vec::new(), gas)
}

/// Calls `transfer(to, amount)` on `token`. `amount` is in the token's base
/// units.
pub fn send_erc20_transfer<G: RpcGateway>(
    gateway: &G,
    private_key: &PrivateKey,
    chain_id: u64,
    token: &Address,
    to: &Address,
    amount: &BigUint,
    gas: &GasSettings,
) -> Result<Submission> {
    let data = erc20::encode_transfer(to, amount)?;
    send_call(gateway, private_key, chain_id, token, BigUint::zero(), data, gas)
}

/// Calls `approve(spender, amount)` on `token`, replacing any earlier
/// allowance.
pub fn send_erc20_approve<G: RpcGateway>(
    gateway: &G,
    private_key: &PrivateKey,
    chain_id: u64,
    token: &Address,
    spender: &Address,
    amount: &BigUint,
    gas: &GasSettings,
) -> Result<Submission> {
    let data = erc20::encode_approve(spender, amount)?;
    send_call(gateway, private_key, chain_id, token, BigUint::zero(), data, gas)
}

/// Calls `transferFrom(from, to, amount)` on `token`. The signer spends an
/// allowance `from` granted it.
#[allow(clippy::too_many_arguments)]
pub fn send_erc20_transfer_from<G: RpcGateway>(
    gateway: &G,
    private_key: &PrivateKey,
    chain_id: u64,
    token: &Address,
    from: &Address,
    to: &Address,
    amount: &BigUint,
    gas: &GasSettings,
) -> Result<Submission> {
    let data = erc20::encode_transfer_from(from, to, amount)?;
    send_call(gateway, private_key, chain_id, token, BigUint::zero(), data, gas)
}

fn send_call<G: RpcGateway>(
    gateway: &G,
    private_key: &PrivateKey,
    chain_id: u64,
    to: &Address,
    value: BigUint,
    data: Vec<u8>,
    gas: &GasSettings,
) -> Result<Submission> {
    let nonce = gateway.transaction_count(&private_key.address(), BlockRef::Pending)?;
    let signed: TxEnvelope = match &gas.fees {
        FeeSettings::Legacy { gas_price } => {
            let gas_price = match gas_price {
                Some(price) => price.clone(),
                None => gateway.gas_price()?,
            };
            let tx = LegacyTransaction {
                nonce,
                gas_price: BigInt::from(gas_price),
                gas_limit: gas.gas_limit,
                to: Some(*to),
                value: BigInt::from(value),
                data,
                chain_id,
            };
            sign_transaction(&tx, private_key)?.into()
        }
        FeeSettings::Eip1559 {
            max_fee,
            priority_fee,
        } => {
            let max_fee = match max_fee {
                Some(cap) => cap.clone(),
                None => gateway.gas_price()? * 2u8 + priority_fee,
            };
            let tx = Eip1559Transaction {
                chain_id,
                nonce,
                max_priority_fee_per_gas: BigInt::from(priority_fee.clone()),
                max_fee_per_gas: BigInt::from(max_fee),
                gas_limit: gas.gas_limit,
                to: Some(*to),
                value: BigInt::from(value),
                data,
            };
            tx.sign(private_key)?.into()
        }
    };
    submit(gateway, signed)
}

fn submit<G: RpcGateway>(gateway: &G, signed: TxEnvelope) -> Result<Submission> {
    let local = signed.hash();
    let remote = gateway.submit_raw(signed.raw())?;
    if remote != local {
        return Err(WorkoutError::HashMismatch { local, remote });
    }
    tracing::info!(
        tx_hash = %remote,
        nonce = signed.nonce(),
        chain_id = signed.chain_id(),
        "transaction submitted"
    );
    Ok(Submission {
        hash: remote,
        signed,
    })
}

/// `balanceOf(owner)` on `token`, in base units.
pub fn erc20_balance<G: RpcGateway>(gateway: &G, token: &Address, owner: &Address) -> Result<BigUint> {
    let request = CallRequest {
        from: None,
        to: *token,
        data: erc20::encode_balance_of(owner),
    };
    let data = gateway.call(&request, BlockRef::Latest)?;
    Ok(erc20::decode_uint256(&data)?)
}

/// `allowance(owner, spender)` on `token`, in base units.
pub fn erc20_allowance<G: RpcGateway>(
    gateway: &G,
    token: &Address,
    owner: &Address,
    spender: &Address,
) -> Result<BigUint> {
    let request = CallRequest {
        from: None,
        to: *token,
        data: erc20::encode_allowance(owner, spender),
    };
    let data = gateway.call(&request, BlockRef::Latest)?;
    Ok(erc20::decode_uint256(&data)?)
}

/// Polls for a receipt until it appears or `attempts` run out. Transport
/// errors end the wait immediately.
pub fn wait_for_receipt<G: RpcGateway>(
    gateway: &G,
    hash: &TxHash,
    attempts: u32,
    interval: Duration,
) -> Result<TransactionReceipt> {
    for attempt in 1..=attempts {
        if let Some(receipt) = gateway.receipt(hash)? {
            return Ok(receipt);
        }
        tracing::debug!(tx_hash = %hash, attempt, "receipt not available yet");
        if attempt < attempts {
            thread::sleep(interval);
        }
    }
    Err(WorkoutError::ReceiptTimeout {
        hash: *hash,
        attempts,
    })
}

/// What a receipt says about the transaction, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptSummary {
    pub hash: TxHash,
    pub success: bool,
    pub block_number: u64,
    pub gas_used: BigUint,
    /// `None` when the node omits `effectiveGasPrice`.
    pub fee: Option<BigUint>,
    pub transfers: Vec<TransferEvent>,
}

pub fn summarize_receipt(receipt: &TransactionReceipt) -> ReceiptSummary {
    ReceiptSummary {
        hash: receipt.transaction_hash,
        success: is_success(receipt),
        block_number: receipt.block_number,
        gas_used: receipt.gas_used.clone(),
        fee: effective_fee(receipt),
        transfers: transfer_events(receipt),
    }
}
