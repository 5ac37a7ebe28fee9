//! Wire shapes of JSON-RPC envelopes and the Ethereum objects we read.
//!
//! Every numeric field arrives as a hex quantity string and is converted into
//! the domain types with [`chain_eth::quantity`].

use std::str::FromStr;

use chain_eth::quantity::{decode_data, decode_quantity, decode_u64, decode_word};
use chain_eth::receipt::{LogEntry, ReceiptStatus, TransactionReceipt};
use chain_eth::{Address, EthError, TransactionInfo, TxHash};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub(crate) struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: Value,
    pub id: u64,
}

/// `result` is `None` when the key is absent and `Some(None)` when the node
/// answered `null`.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct JsonRpcResponse<T> {
    #[serde(default, deserialize_with = "present")]
    pub result: Option<Option<T>>,
    pub error: Option<JsonRpcError>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

impl<T> JsonRpcResponse<T> {
    /// An error object wins over any result; a null result is `None`. A
    /// response carrying neither is malformed.
    pub fn into_result(self) -> Result<Option<T>, EthError> {
        match (self.error, self.result) {
            (Some(error), _) => Err(EthError::Rpc {
                code: error.code,
                message: error.message,
            }),
            (None, Some(result)) => Ok(result),
            (None, None) => Err(EthError::GatewayUnavailable(
                "response has neither result nor error".into(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TransactionDto {
    hash: String,
    nonce: String,
    from: String,
    to: Option<String>,
    value: String,
    gas_price: Option<String>,
    gas: String,
    input: String,
    block_hash: Option<String>,
    block_number: Option<String>,
    transaction_index: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReceiptDto {
    transaction_hash: String,
    status: Option<String>,
    gas_used: String,
    effective_gas_price: Option<String>,
    block_number: String,
    from: String,
    to: Option<String>,
    contract_address: Option<String>,
    #[serde(default)]
    logs: Vec<LogDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LogDto {
    address: String,
    topics: Vec<String>,
    data: String,
}

fn address(s: &str) -> Result<Address, EthError> {
    Address::from_str(s)
}

fn optional<T>(
    value: Option<&str>,
    parse: impl Fn(&str) -> Result<T, EthError>,
) -> Result<Option<T>, EthError> {
    value.map(parse).transpose()
}

impl TryFrom<TransactionDto> for TransactionInfo {
    type Error = EthError;

    fn try_from(dto: TransactionDto) -> Result<Self, Self::Error> {
        Ok(TransactionInfo {
            hash: TxHash::from_str(&dto.hash)?,
            nonce: decode_u64(&dto.nonce)?,
            from: address(&dto.from)?,
            to: optional(dto.to.as_deref(), address)?,
            value: decode_quantity(&dto.value)?,
            gas_price: optional(dto.gas_price.as_deref(), decode_quantity)?,
            gas: decode_u64(&dto.gas)?,
            input: decode_data(&dto.input)?,
            block_hash: optional(dto.block_hash.as_deref(), TxHash::from_str)?,
            block_number: optional(dto.block_number.as_deref(), decode_u64)?,
            transaction_index: optional(dto.transaction_index.as_deref(), decode_u64)?,
        })
    }
}

impl TryFrom<LogDto> for LogEntry {
    type Error = EthError;

    fn try_from(dto: LogDto) -> Result<Self, Self::Error> {
        Ok(LogEntry {
            address: address(&dto.address)?,
            topics: dto
                .topics
                .iter()
                .map(|topic| decode_word(topic))
                .collect::<Result<_, _>>()?,
            data: decode_data(&dto.data)?,
        })
    }
}

impl TryFrom<ReceiptDto> for TransactionReceipt {
    type Error = EthError;

    fn try_from(dto: ReceiptDto) -> Result<Self, Self::Error> {
        let status = dto.status.as_deref().ok_or_else(|| {
            EthError::EncodingError("receipt has no status field".into())
        })?;

        Ok(TransactionReceipt {
            transaction_hash: TxHash::from_str(&dto.transaction_hash)?,
            status: ReceiptStatus::from_code(decode_u64(status)?),
            gas_used: decode_quantity(&dto.gas_used)?,
            effective_gas_price: optional(dto.effective_gas_price.as_deref(), decode_quantity)?,
            block_number: decode_u64(&dto.block_number)?,
            from: address(&dto.from)?,
            to: optional(dto.to.as_deref(), address)?,
            contract_address: optional(dto.contract_address.as_deref(), address)?,
            logs: dto
                .logs
                .into_iter()
                .map(LogEntry::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}
