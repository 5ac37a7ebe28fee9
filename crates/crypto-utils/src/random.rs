use rand::RngCore;
use rand_core::OsRng;

use crate::error::CryptoError;

/// Fills a fixed-size array from the operating system's CSPRNG.
///
/// Fails instead of panicking when the OS entropy source is unavailable,
/// so key generation can report the condition to its caller.
pub fn try_random_bytes_fixed<const N: usize>() -> Result<[u8; N], CryptoError> {
    let mut buf = [0u8; N];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| CryptoError::RandomSource(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_bytes_have_requested_length() {
        let empty: [u8; 0] = try_random_bytes_fixed().unwrap();
        assert!(empty.is_empty());
        let wide: [u8; 64] = try_random_bytes_fixed().unwrap();
        assert_eq!(wide.len(), 64);
    }

    #[test]
    fn fixed_bytes_not_all_zero() {
        // Probability of 32 random bytes all being zero is 2^-256.
        let buf: [u8; 32] = try_random_bytes_fixed().unwrap();
        assert!(buf.iter().any(|&b| b != 0));
    }

    #[test]
    fn fixed_bytes_differ_between_calls() {
        let a: [u8; 32] = try_random_bytes_fixed().unwrap();
        let b: [u8; 32] = try_random_bytes_fixed().unwrap();
        assert_ne!(a, b);
    }
}
