//! Legacy transactions with EIP-155 replay protection.
//!
//! The signing pre-image is
//! `rlp([nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0])` and the
//! broadcast form is `rlp([nonce, gasPrice, gasLimit, to, value, data, v, r, s])`
//! with `v = recovery_id + chain_id * 2 + 35`.

use alloy_rlp::{Encodable, RlpEncodable};
use num::BigInt;

use crate::address::Address;
use crate::error::EthError;
use crate::hash::{keccak256, Hash256, TxHash};
use crate::keys::PrivateKey;
use crate::quantity::encode_data;
use crate::rlp::{self, RlpBytes, RlpTo, RlpUint};
use crate::signer::{self, SignatureData};

/// A transaction kind that can be signed: it knows its pre-image and how to
/// assemble its wire form once a signature exists.
pub trait Signable {
    type Signed: SignedEnvelope;

    /// Bytes whose keccak256 is signed.
    fn signing_payload(&self) -> Result<Vec<u8>, EthError>;

    /// Builds the signed form. Fails if the signature cannot be represented
    /// for this transaction (for example an overflowing `v`).
    fn attach_signature(&self, signature: SignatureData) -> Result<Self::Signed, EthError>;

    fn signing_hash(&self) -> Result<[u8; 32], EthError> {
        Ok(keccak256(self.signing_payload()?))
    }

    fn sign(&self, private_key: &PrivateKey) -> Result<Self::Signed, EthError> {
        let hash = self.signing_hash()?;
        let signature = signer::sign_prehash(&hash, private_key)?;
        let signed = self.attach_signature(signature)?;
        tracing::debug!(tx_hash = %signed.hash(), "signed transaction");
        Ok(signed)
    }
}

/// A signed transaction ready for `eth_sendRawTransaction`.
pub trait SignedEnvelope {
    /// The exact bytes to broadcast.
    fn raw(&self) -> &[u8];

    /// keccak256 of the raw bytes; the network's transaction id.
    fn hash(&self) -> TxHash {
        Hash256::digest(self.raw())
    }

    fn raw_hex(&self) -> String {
        encode_data(self.raw())
    }
}

/// An unsigned legacy transaction.
///
/// `nonce` and `gas_limit` cannot be negative by construction. The money
/// fields are arbitrary precision and checked by [`LegacyTransaction::validate`].
/// `to == None` creates a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub nonce: u64,
    pub gas_price: BigInt,
    pub gas_limit: u64,
    pub to: Option<Address>,
    pub value: BigInt,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

#[derive(RlpEncodable)]
struct UnsignedLegacyFields {
    nonce: u64,
    gas_price: RlpUint,
    gas_limit: u64,
    to: RlpTo,
    value: RlpUint,
    data: RlpBytes,
    chain_id: u64,
    empty_r: u8,
    empty_s: u8,
}

#[derive(RlpEncodable)]
struct SignedLegacyFields {
    nonce: u64,
    gas_price: RlpUint,
    gas_limit: u64,
    to: RlpTo,
    value: RlpUint,
    data: RlpBytes,
    v: u64,
    r: RlpUint,
    s: RlpUint,
}

impl LegacyTransaction {
    /// Rejects negative or over-wide money fields and a zero chain id.
    pub fn validate(&self) -> Result<(), EthError> {
        self.checked_amounts().map(|_| ())
    }

    fn checked_amounts(&self) -> Result<(RlpUint, RlpUint), EthError> {
        if self.chain_id == 0 {
            return Err(EthError::InvalidTransaction(
                "chain id must be positive".into(),
            ));
        }
        let gas_price = RlpUint::from_amount(&self.gas_price, "gas price")?;
        let value = RlpUint::from_amount(&self.value, "value")?;
        Ok((gas_price, value))
    }
}

impl Signable for LegacyTransaction {
    type Signed = SignedTransaction;

    fn signing_payload(&self) -> Result<Vec<u8>, EthError> {
        let (gas_price, value) = self.checked_amounts()?;
        let fields = UnsignedLegacyFields {
            nonce: self.nonce,
            gas_price,
            gas_limit: self.gas_limit,
            to: RlpTo(self.to),
            value,
            data: RlpBytes(self.data.clone()),
            chain_id: self.chain_id,
            empty_r: 0,
            empty_s: 0,
        };

        let mut out = Vec::with_capacity(fields.length());
        fields.encode(&mut out);
        Ok(out)
    }

    fn attach_signature(&self, signature: SignatureData) -> Result<SignedTransaction, EthError> {
        let (gas_price, value) = self.checked_amounts()?;
        let v = eip155_v(self.chain_id, signature.recovery_id)?;
        let fields = SignedLegacyFields {
            nonce: self.nonce,
            gas_price,
            gas_limit: self.gas_limit,
            to: RlpTo(self.to),
            value,
            data: RlpBytes(self.data.clone()),
            v,
            r: RlpUint::from_word(&signature.r),
            s: RlpUint::from_word(&signature.s),
        };

        let mut raw = Vec::with_capacity(fields.length());
        fields.encode(&mut raw);

        Ok(SignedTransaction {
            tx: self.clone(),
            signature,
            v,
            raw,
        })
    }
}

/// A signed legacy transaction. Immutable once built; the wire bytes are
/// computed once and reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    tx: LegacyTransaction,
    signature: SignatureData,
    v: u64,
    raw: Vec<u8>,
}

impl SignedTransaction {
    pub fn tx(&self) -> &LegacyTransaction {
        &self.tx
    }

    pub fn signature(&self) -> &SignatureData {
        &self.signature
    }

    pub fn v(&self) -> u64 {
        self.v
    }

    pub fn chain_id(&self) -> u64 {
        self.tx.chain_id
    }

    /// The broadcast bytes, `rlp([nonce, ..., v, r, s])`.
    pub fn encode(&self) -> Vec<u8> {
        self.raw.clone()
    }
}

impl SignedEnvelope for SignedTransaction {
    fn raw(&self) -> &[u8] {
        &self.raw
    }
}

/// The EIP-155 pre-image of `tx`.
pub fn encode_unsigned(tx: &LegacyTransaction) -> Result<Vec<u8>, EthError> {
    tx.signing_payload()
}

/// Signs `tx` with `private_key`.
pub fn sign_transaction(
    tx: &LegacyTransaction,
    private_key: &PrivateKey,
) -> Result<SignedTransaction, EthError> {
    let signed = tx.sign(private_key)?;
    tracing::debug!(
        chain_id = tx.chain_id,
        nonce = tx.nonce,
        v = signed.v,
        "signed legacy transaction"
    );
    Ok(signed)
}

/// Broadcast bytes of a signed transaction.
pub fn encode_signed(signed: &SignedTransaction) -> Vec<u8> {
    signed.encode()
}

/// Parses the wire form produced by [`encode_signed`].
///
/// Only replay-protected encodings are accepted; a `v` of 27 or 28 carries
/// no chain id and is rejected.
pub fn decode_signed(raw: &[u8]) -> Result<SignedTransaction, EthError> {
    let mut buf = raw;
    let mut payload = rlp::decode_list(&mut buf)?;
    if !buf.is_empty() {
        return Err(EthError::EncodingError(format!(
            "{} trailing bytes after transaction",
            buf.len()
        )));
    }

    let nonce = rlp::decode_u64(&mut payload)?;
    let gas_price = RlpUint::decode(&mut payload)?;
    let gas_limit = rlp::decode_u64(&mut payload)?;
    let to = RlpTo::decode(&mut payload)?;
    let value = RlpUint::decode(&mut payload)?;
    let data = RlpBytes::decode(&mut payload)?;
    let v = rlp::decode_u64(&mut payload)?;
    let r = RlpUint::decode(&mut payload)?;
    let s = RlpUint::decode(&mut payload)?;
    if !payload.is_empty() {
        return Err(EthError::EncodingError(
            "legacy transaction has more than 9 fields".into(),
        ));
    }

    let chain_id = chain_id_from_v(v).ok_or_else(|| {
        EthError::InvalidTransaction(format!("v = {v} is not EIP-155 replay protected"))
    })?;
    let recovery_id = recovery_id_from_v(v)
        .ok_or_else(|| EthError::InvalidSignature(format!("v = {v} has no recovery id")))?;

    let tx = LegacyTransaction {
        nonce,
        gas_price: BigInt::from(gas_price.to_biguint()),
        gas_limit,
        to: to.0,
        value: BigInt::from(value.to_biguint()),
        data: data.0,
        chain_id,
    };
    let signature = SignatureData {
        r: r.to_word(),
        s: s.to_word(),
        recovery_id,
    };

    Ok(SignedTransaction {
        tx,
        signature,
        v,
        raw: raw.to_vec(),
    })
}

/// `recovery_id + chain_id * 2 + 35`, or `InvalidTransaction` on overflow.
pub fn eip155_v(chain_id: u64, recovery_id: u8) -> Result<u64, EthError> {
    chain_id
        .checked_mul(2)
        .and_then(|v| v.checked_add(35 + u64::from(recovery_id)))
        .ok_or_else(|| EthError::InvalidTransaction(format!("chain id {chain_id} overflows v")))
}

/// Inverse of [`eip155_v`]. `None` for pre-EIP-155 values.
pub fn chain_id_from_v(v: u64) -> Option<u64> {
    v.checked_sub(35).map(|x| x / 2).filter(|&id| id > 0)
}

/// Recovery id carried by `v`, for both the EIP-155 and the 27/28 forms.
pub fn recovery_id_from_v(v: u64) -> Option<u8> {
    match v {
        27 | 28 => Some((v - 27) as u8),
        v if v >= 35 => Some(((v - 35) % 2) as u8),
        _ => None,
    }
}

/// Recovers the address that signed `signed`.
pub fn recover_sender(signed: &SignedTransaction) -> Result<Address, EthError> {
    let hash = signed.tx.signing_hash()?;
    let public_key = signer::recover_prehash(&hash, &signed.signature)?;
    Ok(public_key.address())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::from_private_scalar;

    const EIP155_KEY: &str = "0x4646464646464646464646464646464646464646464646464646464646464646";
    const EIP155_TO: &str = "0x3535353535353535353535353535353535353535";

    fn eip155_example() -> LegacyTransaction {
        LegacyTransaction {
            nonce: 9,
            gas_price: BigInt::from(20_000_000_000u64),
            gas_limit: 21_000,
            to: Some(EIP155_TO.parse().unwrap()),
            value: BigInt::from(1_000_000_000_000_000_000u64),
            data: Vec::new(),
            chain_id: 1,
        }
    }

    fn key() -> PrivateKey {
        PrivateKey::from_hex(EIP155_KEY).unwrap()
    }

    #[test]
    fn eip155_signing_data() {
        let tx = eip155_example();
        assert_eq!(
            hex::encode(encode_unsigned(&tx).unwrap()),
            "ec098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a764000080018080"
        );
        assert_eq!(
            hex::encode(tx.signing_hash().unwrap()),
            "daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        );
    }

    #[test]
    fn eip155_signed_transaction() {
        let signed = sign_transaction(&eip155_example(), &key()).unwrap();
        assert_eq!(signed.v(), 37);
        assert_eq!(
            signed.raw_hex(),
            "0xf86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
        );
        assert_eq!(
            recover_sender(&signed).unwrap().to_hex(),
            "0x9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f"
        );
    }

    #[test]
    fn hash_is_keccak_of_raw_bytes() {
        let signed = sign_transaction(&eip155_example(), &key()).unwrap();
        assert_eq!(signed.hash(), Hash256::digest(signed.encode()));
        assert_eq!(encode_signed(&signed), signed.raw());
    }

    #[test]
    fn decode_round_trip() {
        let signed = sign_transaction(&eip155_example(), &key()).unwrap();
        let decoded = decode_signed(&signed.encode()).unwrap();
        assert_eq!(decoded, signed);
        assert_eq!(decoded.tx(), &eip155_example());
        assert_eq!(recover_sender(&decoded).unwrap(), key().address());
    }

    #[test]
    fn sepolia_transfer_carries_chain_id_in_v() {
        let key = PrivateKey::generate().unwrap();
        let (_, sender) = from_private_scalar(&key);
        let tx = LegacyTransaction {
            nonce: 0,
            gas_price: BigInt::from(1_000_000_000u64),
            gas_limit: 21_000,
            to: Some("0x192897df0B17c99fA24eCF998c22e2E83C3cD3D8".parse().unwrap()),
            value: BigInt::from(1u8),
            data: Vec::new(),
            chain_id: 11_155_111,
        };

        let signed = sign_transaction(&tx, &key).unwrap();
        assert!(signed.v() == 22_310_257 || signed.v() == 22_310_258);

        let decoded = decode_signed(signed.raw()).unwrap();
        assert_eq!(decoded.chain_id(), 11_155_111);
        assert_eq!(chain_id_from_v(decoded.v()), Some(11_155_111));
        assert_eq!(recover_sender(&decoded).unwrap(), sender);
    }

    #[test]
    fn v_formula_and_inverse() {
        for chain_id in [1u64, 3, 56, 97, 11_155_111] {
            for recovery_id in [0u8, 1] {
                let v = eip155_v(chain_id, recovery_id).unwrap();
                assert_eq!(v, u64::from(recovery_id) + chain_id * 2 + 35);
                assert_eq!(chain_id_from_v(v), Some(chain_id));
                assert_eq!(recovery_id_from_v(v), Some(recovery_id));
            }
        }
        assert_eq!(chain_id_from_v(27), None);
        assert_eq!(recovery_id_from_v(28), Some(1));
        assert_eq!(recovery_id_from_v(30), None);
        assert!(eip155_v(u64::MAX, 0).is_err());
    }

    #[test]
    fn signing_is_deterministic() {
        let a = sign_transaction(&eip155_example(), &key()).unwrap();
        let b = sign_transaction(&eip155_example(), &key()).unwrap();
        assert_eq!(a.raw(), b.raw());
    }

    #[test]
    fn different_chains_produce_different_bytes() {
        let mut other = eip155_example();
        other.chain_id = 56;
        let a = sign_transaction(&eip155_example(), &key()).unwrap();
        let b = sign_transaction(&other, &key()).unwrap();
        assert_ne!(a.raw(), b.raw());
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn negative_money_fields_are_rejected() {
        let mut tx = eip155_example();
        tx.value = BigInt::from(-1);
        assert!(matches!(
            sign_transaction(&tx, &key()),
            Err(EthError::InvalidTransaction(_))
        ));

        let mut tx = eip155_example();
        tx.gas_price = BigInt::from(-20);
        assert!(matches!(tx.validate(), Err(EthError::InvalidTransaction(_))));
        assert!(encode_unsigned(&tx).is_err());
    }

    #[test]
    fn zero_chain_id_is_rejected() {
        let mut tx = eip155_example();
        tx.chain_id = 0;
        assert!(matches!(tx.validate(), Err(EthError::InvalidTransaction(_))));
    }

    #[test]
    fn contract_creation_has_empty_recipient() {
        let tx = LegacyTransaction {
            to: None,
            data: vec![0x60, 0x80],
            ..eip155_example()
        };
        let signed = sign_transaction(&tx, &key()).unwrap();
        let decoded = decode_signed(signed.raw()).unwrap();
        assert_eq!(decoded.tx().to, None);
        assert_eq!(decoded.tx().data, vec![0x60, 0x80]);
    }

    #[test]
    fn decode_rejects_malformed_input() {
        assert!(matches!(decode_signed(&[]), Err(EthError::EncodingError(_))));
        assert!(matches!(decode_signed(&[0x80]), Err(EthError::EncodingError(_))));

        let signed = sign_transaction(&eip155_example(), &key()).unwrap();
        let mut raw = signed.encode();
        raw.push(0x00);
        assert!(matches!(decode_signed(&raw), Err(EthError::EncodingError(_))));

        let raw = signed.encode();
        assert!(decode_signed(&raw[..raw.len() - 1]).is_err());
    }

    #[test]
    fn decode_rejects_unprotected_v() {
        // The EIP-155 example re-encoded with v = 27.
        let raw = hex::decode(
            "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a7640000801ba028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83",
        )
        .unwrap();
        assert!(matches!(
            decode_signed(&raw),
            Err(EthError::InvalidTransaction(_))
        ));
    }
}
