use chain_eth::{EthError, TxHash};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkoutError {
    #[error(transparent)]
    Eth(#[from] EthError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("no private key configured (set PRIVATE_KEY or pass --private-key)")]
    MissingPrivateKey,

    #[error("node returned hash {remote}, expected {local}")]
    HashMismatch { local: TxHash, remote: TxHash },

    #[error("no receipt for {hash} after {attempts} attempts")]
    ReceiptTimeout { hash: TxHash, attempts: u32 },

    #[error("not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, WorkoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eth_errors_pass_through() {
        let err: WorkoutError = EthError::InvalidAmount("-1".into()).into();
        assert_eq!(err.to_string(), "invalid amount: -1");
    }

    #[test]
    fn receipt_timeout_names_the_hash() {
        let hash = TxHash::from_bytes([0x11; 32]);
        let err = WorkoutError::ReceiptTimeout { hash, attempts: 3 };
        assert!(err.to_string().contains(&hash.to_string()));
        assert!(err.to_string().ends_with("after 3 attempts"));
    }
}
