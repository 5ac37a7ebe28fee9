use thiserror::Error;

/// Errors from the low-level crypto helpers.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("random source failure: {0}")]
    RandomSource(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_random_source() {
        let err = CryptoError::RandomSource("getrandom unavailable".into());
        assert_eq!(err.to_string(), "random source failure: getrandom unavailable");
    }

    #[test]
    fn display_invalid_input() {
        let err = CryptoError::InvalidInput("odd-length hex".into());
        assert_eq!(err.to_string(), "invalid input: odd-length hex");
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> =
            Box::new(CryptoError::RandomSource("test".into()));
        assert!(err.to_string().contains("test"));
    }
}
