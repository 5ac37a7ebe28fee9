//! Private scalars, public keys, and key pairs.
//!
//! A [`PrivateKey`] owns a k256 signing key, which zeroizes its scalar on
//! drop. Nothing in this module logs or formats key material.

use std::fmt;

use crypto_utils::random::try_random_bytes_fixed;
use crypto_utils::zeroizing::ZeroizingBytes;
use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{AffinePoint, NonZeroScalar, ProjectivePoint};
use zeroize::{Zeroize, Zeroizing};

use crate::address::{derive_address, Address};
use crate::error::EthError;

/// Upper bound on rejection-sampling draws. A uniformly random 32-byte
/// string is outside `[1, n-1]` with probability below 2^-127.
const MAX_GENERATION_ATTEMPTS: usize = 16;

/// A secp256k1 private scalar in `[1, n-1]`.
pub struct PrivateKey {
    signing_key: SigningKey,
}

impl PrivateKey {
    /// Draws a fresh key from the operating system's CSPRNG.
    pub fn generate() -> Result<Self, EthError> {
        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let mut candidate: [u8; 32] = try_random_bytes_fixed()?;
            let result = SigningKey::from_bytes((&candidate).into());
            candidate.zeroize();
            if let Ok(signing_key) = result {
                return Ok(Self { signing_key });
            }
        }
        Err(EthError::KeyGeneration(
            "random source produced no valid scalar".into(),
        ))
    }

    /// Accepts a big-endian 32-byte scalar. Fails with `InvalidKey` if it is
    /// zero or not below the curve order.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, EthError> {
        let signing_key = SigningKey::from_bytes(bytes.into())
            .map_err(|_| EthError::InvalidKey("scalar must be in [1, n-1]".into()))?;
        Ok(Self { signing_key })
    }

    /// Parses a hex scalar with an optional `0x` prefix.
    ///
    /// Leading zeros may be omitted, as produced by tools that print the key
    /// as a plain integer.
    pub fn from_hex(input: &str) -> Result<Self, EthError> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.is_empty() || digits.len() > 64 {
            return Err(EthError::InvalidKey(format!(
                "expected 1 to 64 hex digits, got {}",
                digits.len()
            )));
        }

        let padded = Zeroizing::new(format!("{digits:0>64}"));
        let decoded = ZeroizingBytes::from_hex(&padded)?;

        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&decoded);
        let result = Self::from_bytes(&bytes);
        bytes.zeroize();
        result
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_verifying_key(self.signing_key.verifying_key())
    }

    pub fn address(&self) -> Address {
        derive_address(&self.public_key())
    }

    /// Hex form of the scalar for export into another wallet. The returned
    /// string zeroizes on drop; callers decide whether to display it.
    pub fn reveal_hex(&self) -> Zeroizing<String> {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        let encoded = Zeroizing::new(format!("0x{}", hex::encode(bytes)));
        bytes.zeroize();
        encoded
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("address", &self.address())
            .field("scalar", &"[REDACTED]")
            .finish()
    }
}

/// An uncompressed secp256k1 public key as the 64-byte `x || y` encoding.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 64]);

impl PublicKey {
    /// Checks that `x || y` is a point on the curve.
    pub fn from_bytes(xy: &[u8; 64]) -> Result<Self, EthError> {
        let mut sec1 = [0u8; 65];
        sec1[0] = 0x04;
        sec1[1..].copy_from_slice(xy);
        VerifyingKey::from_sec1_bytes(&sec1)
            .map_err(|_| EthError::InvalidPublicKey("point is not on the secp256k1 curve".into()))?;
        Ok(Self(*xy))
    }

    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let encoded = key.to_encoded_point(false);
        let mut xy = [0u8; 64];
        // Skip the 0x04 SEC1 tag.
        xy.copy_from_slice(&encoded.as_bytes()[1..]);
        Self(xy)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn address(&self) -> Address {
        derive_address(self)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

/// A freshly generated key with its derived public key and address.
#[derive(Debug)]
pub struct KeyPair {
    pub private_key: PrivateKey,
    pub public_key: PublicKey,
    pub address: Address,
}

/// Generates a new key pair from the OS CSPRNG.
pub fn generate() -> Result<KeyPair, EthError> {
    let private_key = PrivateKey::generate()?;
    let (public_key, address) = from_private_scalar(&private_key);
    tracing::debug!(%address, "generated key pair");
    Ok(KeyPair {
        private_key,
        public_key,
        address,
    })
}

/// Derives the public key and address of an existing private key.
pub fn from_private_scalar(private_key: &PrivateKey) -> (PublicKey, Address) {
    let public_key = private_key.public_key();
    let address = derive_address(&public_key);
    (public_key, address)
}

/// Computes `scalar * G` directly on the curve.
///
/// This is the arithmetic path; [`PrivateKey::public_key`] goes through the
/// ECDSA signing key. The two must agree bit-for-bit.
pub fn public_key_from_scalar(scalar: &[u8; 32]) -> Result<PublicKey, EthError> {
    let scalar: Option<NonZeroScalar> = NonZeroScalar::from_repr((*scalar).into()).into();
    let scalar =
        scalar.ok_or_else(|| EthError::InvalidKey("scalar must be in [1, n-1]".into()))?;

    let point = AffinePoint::from(ProjectivePoint::GENERATOR * *scalar);
    let encoded = point.to_encoded_point(false);

    let mut xy = [0u8; 64];
    xy.copy_from_slice(&encoded.as_bytes()[1..]);
    Ok(PublicKey(xy))
}
