use thiserror::Error;

/// Errors raised by key handling, signing, encoding and receipt decoding.
///
/// Every failure is reported at the call that produced it; nothing is
/// coerced to a default value. An on-chain execution failure is *not* an
/// error here, see [`crate::receipt::ReceiptStatus`].
#[derive(Debug, Error)]
pub enum EthError {
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("malformed log: {0}")]
    MalformedLog(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("unsupported chain: {0}")]
    UnsupportedChain(u64),

    #[error("gateway timed out: {0}")]
    GatewayTimeout(String),

    #[error("gateway unavailable: {0}")]
    GatewayUnavailable(String),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
}

impl From<crypto_utils::CryptoError> for EthError {
    fn from(e: crypto_utils::CryptoError) -> Self {
        match e {
            crypto_utils::CryptoError::RandomSource(msg) => EthError::KeyGeneration(msg),
            crypto_utils::CryptoError::InvalidInput(msg) => EthError::InvalidKey(msg),
        }
    }
}

impl From<alloy_rlp::Error> for EthError {
    fn from(e: alloy_rlp::Error) -> Self {
        EthError::EncodingError(format!("rlp: {e}"))
    }
}

impl EthError {
    /// Whether the failure came from the transport rather than from local
    /// validation. Callers own any retry policy.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            EthError::GatewayTimeout(_) | EthError::GatewayUnavailable(_)
        )
    }
}
