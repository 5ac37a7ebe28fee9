use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chain_eth::quantity::{decode_data, decode_quantity, decode_u64, encode_data, encode_u64};
use chain_eth::{
    Address, BlockRef, CallRequest, EthError, RpcGateway, TransactionInfo, TransactionReceipt,
    TxHash,
};
use num::BigUint;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::dto::{JsonRpcRequest, JsonRpcResponse, ReceiptDto, TransactionDto};

/// Applied when the caller does not configure a timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A JSON-RPC endpoint reached over HTTP(S).
///
/// Each call is one blocking POST. Failures are reported, never retried.
pub struct HttpGateway {
    client: reqwest::blocking::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpGateway {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, EthError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EthError::GatewayUnavailable(format!("building http client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Sends one request. `Ok(None)` when the node answers with a null
    /// result.
    fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<Option<T>, EthError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };
        // The URL can embed an API key, so only the method is logged.
        tracing::debug!(method, id, "rpc request");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(EthError::GatewayUnavailable(format!(
                "{method}: http status {status}"
            )));
        }

        let body: JsonRpcResponse<T> = response.json().map_err(transport_error)?;
        let result = body.into_result();
        if let Err(e) = &result {
            tracing::debug!(method, id, error = %e, "rpc error");
        }
        result
    }
}

/// Strips the URL from the error, since it can embed an API key.
fn transport_error(e: reqwest::Error) -> EthError {
    let e = e.without_url();
    if e.is_timeout() {
        EthError::GatewayTimeout(e.to_string())
    } else {
        EthError::GatewayUnavailable(e.to_string())
    }
}

impl RpcGateway for HttpGateway {
    fn submit_raw(&self, raw: &[u8]) -> Result<TxHash, EthError> {
        let hash: String = self
            .request("eth_sendRawTransaction", json!([encode_data(raw)]))?
            .ok_or_else(|| {
                EthError::GatewayUnavailable("eth_sendRawTransaction returned no hash".into())
            })?;
        let hash = TxHash::from_str(&hash)?;
        tracing::debug!(tx_hash = %hash, "submitted raw transaction");
        Ok(hash)
    }

    fn transaction_by_hash(&self, hash: &TxHash) -> Result<Option<TransactionInfo>, EthError> {
        self.request::<TransactionDto>("eth_getTransactionByHash", json!([hash.to_string()]))?
            .map(TransactionInfo::try_from)
            .transpose()
    }

    fn transaction_by_block(
        &self,
        block: BlockRef,
        index: u64,
    ) -> Result<Option<TransactionInfo>, EthError> {
        let method = match block {
            BlockRef::Hash(_) => "eth_getTransactionByBlockHashAndIndex",
            _ => "eth_getTransactionByBlockNumberAndIndex",
        };
        self.request::<TransactionDto>(method, json!([block.to_string(), encode_u64(index)]))?
            .map(TransactionInfo::try_from)
            .transpose()
    }

    fn receipt(&self, hash: &TxHash) -> Result<Option<TransactionReceipt>, EthError> {
        self.request::<ReceiptDto>("eth_getTransactionReceipt", json!([hash.to_string()]))?
            .map(TransactionReceipt::try_from)
            .transpose()
    }

    fn transaction_count(&self, address: &Address, block: BlockRef) -> Result<u64, EthError> {
        let count: String = self
            .request(
                "eth_getTransactionCount",
                json!([address.to_hex(), block.to_string()]),
            )?
            .ok_or_else(|| {
                EthError::GatewayUnavailable("eth_getTransactionCount returned null".into())
            })?;
        decode_u64(&count)
    }

    fn call(&self, request: &CallRequest, block: BlockRef) -> Result<Vec<u8>, EthError> {
        let mut call = json!({
            "to": request.to.to_hex(),
            "data": encode_data(&request.data),
        });
        if let Some(from) = &request.from {
            call["from"] = json!(from.to_hex());
        }

        let data: String = self
            .request("eth_call", json!([call, block.to_string()]))?
            .ok_or_else(|| EthError::GatewayUnavailable("eth_call returned null".into()))?;
        decode_data(&data)
    }

    fn gas_price(&self) -> Result<BigUint, EthError> {
        let price: String = self
            .request("eth_gasPrice", json!([]))?
            .ok_or_else(|| EthError::GatewayUnavailable("eth_gasPrice returned null".into()))?;
        decode_quantity(&price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn unreachable_endpoint_is_a_transport_error() {
        // Nothing listens on the discard port locally.
        let gateway = HttpGateway::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = gateway
            .transaction_count(&Address::ZERO, BlockRef::Latest)
            .unwrap_err();
        assert!(err.is_transport(), "unexpected error: {err}");
    }

    #[test]
    fn silent_endpoint_times_out() {
        // Accepts the connection and never answers.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let connection = listener.accept();
            thread::sleep(Duration::from_secs(2));
            drop(connection);
        });

        let gateway = HttpGateway::new(format!("http://{addr}"), Duration::from_millis(300)).unwrap();
        let err = gateway.gas_price().unwrap_err();
        assert!(matches!(err, EthError::GatewayTimeout(_)), "unexpected error: {err}");
        assert!(err.is_transport());
        server.join().unwrap();
    }

    #[test]
    fn request_ids_increase() {
        let gateway = HttpGateway::new("http://127.0.0.1:9", DEFAULT_TIMEOUT).unwrap();
        let first = gateway.next_id.fetch_add(1, Ordering::Relaxed);
        let second = gateway.next_id.fetch_add(1, Ordering::Relaxed);
        assert!(second > first);
    }
}
