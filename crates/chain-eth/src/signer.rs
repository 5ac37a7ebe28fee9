//! Recoverable ECDSA signatures over keccak256 digests.
//!
//! Two hashing conventions exist and are kept apart:
//! - off-chain messages are hashed with the EIP-191 personal-message prefix
//!   ([`sign_message`], [`recover_message`]);
//! - transaction pre-images are hashed raw and signed as a prehash
//!   ([`sign_prehash`], [`recover_prehash`]).
//!
//! Nonces are RFC 6979 deterministic, so the same key and digest always
//! produce the same signature.

use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

use crate::address::Address;
use crate::error::EthError;
use crate::keys::{PrivateKey, PublicKey};

/// `(r, s, recovery_id)` with `recovery_id` in `{0, 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureData {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub recovery_id: u8,
}

impl SignatureData {
    /// 65-byte `r || s || v` with `v = 27 + recovery_id`, the form returned
    /// by `personal_sign`.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = 27 + self.recovery_id;
        out
    }

    /// Parses `r || s || v`, accepting `v` as 0/1 or 27/28.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EthError> {
        if bytes.len() != 65 {
            return Err(EthError::InvalidSignature(format!(
                "expected 65 bytes, got {}",
                bytes.len()
            )));
        }

        let recovery_id = match bytes[64] {
            0 | 1 => bytes[64],
            27 | 28 => bytes[64] - 27,
            v => {
                return Err(EthError::InvalidSignature(format!(
                    "unsupported v value {v}"
                )))
            }
        };

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { r, s, recovery_id })
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    /// Range-checks `r`, `s` and the recovery id.
    fn to_k256(&self) -> Result<(Signature, RecoveryId), EthError> {
        let signature = Signature::from_scalars(self.r, self.s)
            .map_err(|_| EthError::InvalidSignature("r and s must be in [1, n-1]".into()))?;
        let recovery_id = match self.recovery_id {
            0 | 1 => RecoveryId::from_byte(self.recovery_id),
            _ => None,
        }
        .ok_or_else(|| {
            EthError::InvalidSignature(format!(
                "recovery id must be 0 or 1, got {}",
                self.recovery_id
            ))
        })?;
        Ok((signature, recovery_id))
    }
}

/// keccak256(`"\x19Ethereum Signed Message:\n" || len(message) || message`).
pub fn hash_personal_message(message: &[u8]) -> [u8; 32] {
    let prefix = format!("\x19Ethereum Signed Message:\n{}", message.len());
    let mut hasher = Keccak256::new();
    hasher.update(prefix.as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}

/// Signs an off-chain message with personal-message prefixing.
pub fn sign_message(message: &[u8], private_key: &PrivateKey) -> Result<SignatureData, EthError> {
    sign_prehash(&hash_personal_message(message), private_key)
}

/// Signs a 32-byte digest as is.
///
/// The recovery id is chosen by recovering both candidates and keeping the
/// one that reproduces the signer's key, so verification never has to guess.
pub fn sign_prehash(hash: &[u8; 32], private_key: &PrivateKey) -> Result<SignatureData, EthError> {
    let signing_key = private_key.signing_key();
    let signature: Signature = signing_key
        .sign_prehash(hash)
        .map_err(|e| EthError::SigningError(e.to_string()))?;
    // k256 already emits low-S; normalize anyway so recovery is unambiguous.
    let signature = signature.normalize_s().unwrap_or(signature);

    let recovery_id = select_recovery_id(hash, &signature, signing_key.verifying_key())?;

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&signature.r().to_bytes());
    s.copy_from_slice(&signature.s().to_bytes());

    Ok(SignatureData {
        r,
        s,
        recovery_id: recovery_id.to_byte(),
    })
}

fn select_recovery_id(
    hash: &[u8; 32],
    signature: &Signature,
    expected: &VerifyingKey,
) -> Result<RecoveryId, EthError> {
    for candidate in 0u8..=1 {
        let Some(id) = RecoveryId::from_byte(candidate) else {
            continue;
        };
        if let Ok(recovered) = VerifyingKey::recover_from_prehash(hash, signature, id) {
            if &recovered == expected {
                return Ok(id);
            }
        }
    }
    Err(EthError::SigningError(
        "no recovery id reproduces the signing key".into(),
    ))
}

/// Recovers the signer of a personal message.
pub fn recover_message(message: &[u8], signature: &SignatureData) -> Result<PublicKey, EthError> {
    recover_prehash(&hash_personal_message(message), signature)
}

/// Recovers the signer of a raw digest.
pub fn recover_prehash(hash: &[u8; 32], signature: &SignatureData) -> Result<PublicKey, EthError> {
    let (signature, recovery_id) = signature.to_k256()?;
    let key = VerifyingKey::recover_from_prehash(hash, &signature, recovery_id)
        .map_err(|_| EthError::InvalidSignature("signature is not recoverable".into()))?;
    Ok(PublicKey::from_verifying_key(&key))
}

/// Checks that `signature` over the personal message was made by `signer`.
///
/// Returns `Ok(false)` for a well-formed signature by someone else, and an
/// error for a signature that cannot be recovered at all.
pub fn verify_message(
    message: &[u8],
    signature: &SignatureData,
    signer: &Address,
) -> Result<bool, EthError> {
    let recovered = recover_message(message, signature)?;
    Ok(recovered.address() == *signer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::from_private_scalar;

    const SAMPLE_KEY: &str = "0x4acdd58a6ccf6f4eceb0b158726689e0ad21beb7afabe2262a8790b39b55ca85";

    fn key() -> PrivateKey {
        PrivateKey::from_hex(SAMPLE_KEY).unwrap()
    }

    #[test]
    fn personal_hash_matches_known_vector() {
        // keccak256("\x19Ethereum Signed Message:\n11hello world")
        let hash = hash_personal_message(b"hello world");
        assert_eq!(
            hex::encode(hash),
            "d9eba16ed0ecae432b71fe008c98cc872bb4cc214d3220a36f365326cf807d68"
        );
    }

    #[test]
    fn sign_then_recover_returns_signer() {
        let key = key();
        let (public_key, address) = from_private_scalar(&key);

        let long = [0u8; 300];
        for message in [
            &b"test"[..],
            &b"This message is for test."[..],
            &b""[..],
            &long[..],
        ] {
            let sig = sign_message(message, &key).unwrap();
            assert!(sig.recovery_id <= 1);
            assert_eq!(recover_message(message, &sig).unwrap(), public_key);
            assert!(verify_message(message, &sig, &address).unwrap());
        }
    }

    #[test]
    fn fresh_keys_round_trip() {
        for _ in 0..8 {
            let key = PrivateKey::generate().unwrap();
            let sig = sign_message(b"test", &key).unwrap();
            assert_eq!(recover_message(b"test", &sig).unwrap(), key.public_key());
        }
    }

    #[test]
    fn signing_is_deterministic() {
        let key = key();
        let a = sign_message(b"test", &key).unwrap();
        let b = sign_message(b"test", &key).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn message_and_prehash_paths_differ() {
        let key = key();
        let raw: [u8; 32] = Keccak256::digest(b"test").into();
        let via_message = sign_message(b"test", &key).unwrap();
        let via_prehash = sign_prehash(&raw, &key).unwrap();
        assert_ne!(via_message, via_prehash);
        assert_eq!(recover_prehash(&raw, &via_prehash).unwrap(), key.public_key());
    }

    #[test]
    fn wrong_message_recovers_someone_else() {
        let key = key();
        let sig = sign_message(b"test", &key).unwrap();
        let recovered = recover_message(b"tampered", &sig).unwrap();
        assert_ne!(recovered, key.public_key());
        assert!(!verify_message(b"tampered", &sig, &key.address()).unwrap());
    }

    #[test]
    fn flipped_recovery_id_recovers_someone_else() {
        let key = key();
        let mut sig = sign_message(b"test", &key).unwrap();
        sig.recovery_id ^= 1;
        match recover_message(b"test", &sig) {
            Ok(other) => assert_ne!(other, key.public_key()),
            Err(e) => assert!(matches!(e, EthError::InvalidSignature(_))),
        }
    }

    #[test]
    fn zero_r_or_s_is_invalid() {
        let sig = sign_message(b"test", &key()).unwrap();

        let zero_r = SignatureData { r: [0u8; 32], ..sig };
        assert!(matches!(
            recover_message(b"test", &zero_r),
            Err(EthError::InvalidSignature(_))
        ));

        let zero_s = SignatureData { s: [0u8; 32], ..sig };
        assert!(matches!(
            recover_message(b"test", &zero_s),
            Err(EthError::InvalidSignature(_))
        ));
    }

    #[test]
    fn r_at_or_above_order_is_invalid() {
        let sig = sign_message(b"test", &key()).unwrap();
        let big_r = SignatureData { r: [0xff; 32], ..sig };
        assert!(matches!(
            recover_message(b"test", &big_r),
            Err(EthError::InvalidSignature(_))
        ));
    }

    #[test]
    fn recovery_id_out_of_range_is_invalid() {
        let sig = sign_message(b"test", &key()).unwrap();
        let bad = SignatureData { recovery_id: 2, ..sig };
        assert!(matches!(
            recover_message(b"test", &bad),
            Err(EthError::InvalidSignature(_))
        ));
    }

    #[test]
    fn wire_bytes_round_trip() {
        let sig = sign_message(b"test", &key()).unwrap();
        let bytes = sig.to_bytes();
        assert!(bytes[64] == 27 || bytes[64] == 28);
        assert_eq!(SignatureData::from_bytes(&bytes).unwrap(), sig);

        let mut raw_v = bytes;
        raw_v[64] -= 27;
        assert_eq!(SignatureData::from_bytes(&raw_v).unwrap(), sig);

        assert_eq!(sig.to_hex().len(), 2 + 130);
    }

    #[test]
    fn from_bytes_rejects_bad_input() {
        assert!(SignatureData::from_bytes(&[0u8; 64]).is_err());
        let mut bytes = [1u8; 65];
        bytes[64] = 29;
        assert!(SignatureData::from_bytes(&bytes).is_err());
    }
}
