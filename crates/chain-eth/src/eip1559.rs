//! EIP-1559 (type 2) transactions.
//!
//! The pre-image is `0x02 || rlp([chain_id, nonce, max_priority_fee_per_gas,
//! max_fee_per_gas, gas_limit, to, value, data, access_list])`; the signed
//! form appends `[y_parity, r, s]` inside the list. Access lists are always
//! empty here.

use alloy_rlp::{Encodable, RlpEncodable};
use num::BigInt;

use crate::address::Address;
use crate::error::EthError;
use crate::rlp::{self, EmptyList, RlpBytes, RlpTo, RlpUint};
use crate::signer::{self, SignatureData};
use crate::transaction::{Signable, SignedEnvelope};

/// EIP-2718 type byte.
pub const EIP1559_TX_TYPE: u8 = 0x02;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip1559Transaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub max_priority_fee_per_gas: BigInt,
    pub max_fee_per_gas: BigInt,
    pub gas_limit: u64,
    pub to: Option<Address>,
    pub value: BigInt,
    pub data: Vec<u8>,
}

#[derive(RlpEncodable)]
struct UnsignedFields {
    chain_id: u64,
    nonce: u64,
    max_priority_fee_per_gas: RlpUint,
    max_fee_per_gas: RlpUint,
    gas_limit: u64,
    to: RlpTo,
    value: RlpUint,
    data: RlpBytes,
    access_list: EmptyList,
}

#[derive(RlpEncodable)]
struct SignedFields {
    chain_id: u64,
    nonce: u64,
    max_priority_fee_per_gas: RlpUint,
    max_fee_per_gas: RlpUint,
    gas_limit: u64,
    to: RlpTo,
    value: RlpUint,
    data: RlpBytes,
    access_list: EmptyList,
    y_parity: u8,
    r: RlpUint,
    s: RlpUint,
}

struct CheckedAmounts {
    max_priority_fee_per_gas: RlpUint,
    max_fee_per_gas: RlpUint,
    value: RlpUint,
}

impl Eip1559Transaction {
    /// Rejects negative or over-wide fee and value fields, a priority fee
    /// above the fee cap, and a zero chain id.
    pub fn validate(&self) -> Result<(), EthError> {
        self.checked_amounts().map(|_| ())
    }

    fn checked_amounts(&self) -> Result<CheckedAmounts, EthError> {
        if self.chain_id == 0 {
            return Err(EthError::InvalidTransaction(
                "chain id must be positive".into(),
            ));
        }
        if self.max_priority_fee_per_gas > self.max_fee_per_gas {
            return Err(EthError::InvalidTransaction(
                "max priority fee exceeds max fee".into(),
            ));
        }
        Ok(CheckedAmounts {
            max_priority_fee_per_gas: RlpUint::from_amount(
                &self.max_priority_fee_per_gas,
                "max priority fee",
            )?,
            max_fee_per_gas: RlpUint::from_amount(&self.max_fee_per_gas, "max fee")?,
            value: RlpUint::from_amount(&self.value, "value")?,
        })
    }
}

fn typed(rlp: impl Encodable) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + rlp.length());
    out.push(EIP1559_TX_TYPE);
    rlp.encode(&mut out);
    out
}

impl Signable for Eip1559Transaction {
    type Signed = SignedEip1559Transaction;

    fn signing_payload(&self) -> Result<Vec<u8>, EthError> {
        let amounts = self.checked_amounts()?;
        Ok(typed(UnsignedFields {
            chain_id: self.chain_id,
            nonce: self.nonce,
            max_priority_fee_per_gas: amounts.max_priority_fee_per_gas,
            max_fee_per_gas: amounts.max_fee_per_gas,
            gas_limit: self.gas_limit,
            to: RlpTo(self.to),
            value: amounts.value,
            data: RlpBytes(self.data.clone()),
            access_list: EmptyList,
        }))
    }

    fn attach_signature(
        &self,
        signature: SignatureData,
    ) -> Result<SignedEip1559Transaction, EthError> {
        if signature.recovery_id > 1 {
            return Err(EthError::InvalidSignature(format!(
                "y parity must be 0 or 1, got {}",
                signature.recovery_id
            )));
        }
        let amounts = self.checked_amounts()?;
        let raw = typed(SignedFields {
            chain_id: self.chain_id,
            nonce: self.nonce,
            max_priority_fee_per_gas: amounts.max_priority_fee_per_gas,
            max_fee_per_gas: amounts.max_fee_per_gas,
            gas_limit: self.gas_limit,
            to: RlpTo(self.to),
            value: amounts.value,
            data: RlpBytes(self.data.clone()),
            access_list: EmptyList,
            y_parity: signature.recovery_id,
            r: RlpUint::from_word(&signature.r),
            s: RlpUint::from_word(&signature.s),
        });

        Ok(SignedEip1559Transaction {
            tx: self.clone(),
            signature,
            raw,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEip1559Transaction {
    tx: Eip1559Transaction,
    signature: SignatureData,
    raw: Vec<u8>,
}

impl SignedEip1559Transaction {
    pub fn tx(&self) -> &Eip1559Transaction {
        &self.tx
    }

    pub fn signature(&self) -> &SignatureData {
        &self.signature
    }
}

impl SignedEnvelope for SignedEip1559Transaction {
    fn raw(&self) -> &[u8] {
        &self.raw
    }
}

/// Parses `0x02 || rlp([...12 fields])`. Access lists must be empty.
pub fn decode_signed(raw: &[u8]) -> Result<SignedEip1559Transaction, EthError> {
    let Some((&EIP1559_TX_TYPE, body)) = raw.split_first() else {
        return Err(EthError::EncodingError(
            "not an EIP-1559 transaction (type byte 0x02 missing)".into(),
        ));
    };

    let mut buf = body;
    let mut payload = rlp::decode_list(&mut buf)?;
    if !buf.is_empty() {
        return Err(EthError::EncodingError(format!(
            "{} trailing bytes after transaction",
            buf.len()
        )));
    }

    let chain_id = rlp::decode_u64(&mut payload)?;
    let nonce = rlp::decode_u64(&mut payload)?;
    let max_priority_fee_per_gas = RlpUint::decode(&mut payload)?;
    let max_fee_per_gas = RlpUint::decode(&mut payload)?;
    let gas_limit = rlp::decode_u64(&mut payload)?;
    let to = RlpTo::decode(&mut payload)?;
    let value = RlpUint::decode(&mut payload)?;
    let data = RlpBytes::decode(&mut payload)?;
    if !rlp::decode_list(&mut payload)?.is_empty() {
        return Err(EthError::EncodingError(
            "access lists are not supported".into(),
        ));
    }
    let y_parity = rlp::decode_u64(&mut payload)?;
    let r = RlpUint::decode(&mut payload)?;
    let s = RlpUint::decode(&mut payload)?;
    if !payload.is_empty() {
        return Err(EthError::EncodingError(
            "EIP-1559 transaction has more than 12 fields".into(),
        ));
    }
    let recovery_id = match y_parity {
        0 | 1 => y_parity as u8,
        other => {
            return Err(EthError::InvalidSignature(format!(
                "y parity must be 0 or 1, got {other}"
            )))
        }
    };

    let tx = Eip1559Transaction {
        chain_id,
        nonce,
        max_priority_fee_per_gas: BigInt::from(max_priority_fee_per_gas.to_biguint()),
        max_fee_per_gas: BigInt::from(max_fee_per_gas.to_biguint()),
        gas_limit,
        to: to.0,
        value: BigInt::from(value.to_biguint()),
        data: data.0,
    };
    tx.validate()?;

    Ok(SignedEip1559Transaction {
        tx,
        signature: SignatureData {
            r: r.to_word(),
            s: s.to_word(),
            recovery_id,
        },
        raw: raw.to_vec(),
    })
}

/// Recovers the address that signed `signed`.
pub fn recover_sender(signed: &SignedEip1559Transaction) -> Result<Address, EthError> {
    let hash = signed.tx.signing_hash()?;
    Ok(signer::recover_prehash(&hash, &signed.signature)?.address())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::PrivateKey;
    use crate::signer::recover_prehash;

    fn test_key() -> PrivateKey {
        let mut key = [0u8; 32];
        key[31] = 1;
        PrivateKey::from_bytes(&key).unwrap()
    }

    fn transfer(chain_id: u64, nonce: u64) -> Eip1559Transaction {
        Eip1559Transaction {
            chain_id,
            nonce,
            max_priority_fee_per_gas: BigInt::from(1_000_000_000u64),
            max_fee_per_gas: BigInt::from(50_000_000_000u64),
            gas_limit: 21_000,
            to: Some("0x000000000000000000000000000000000000dEaD".parse().unwrap()),
            value: BigInt::from(1_000_000_000_000_000_000u64),
            data: Vec::new(),
        }
    }

    #[test]
    fn payload_starts_with_type_byte() {
        let payload = transfer(1, 0).signing_payload().unwrap();
        assert_eq!(payload[0], EIP1559_TX_TYPE);
        // 0xc0 + payload length fits a short list header.
        assert!(payload[1] >= 0xc0);
    }

    #[test]
    fn empty_access_list_and_data_encode_minimally() {
        let payload = transfer(1, 0).signing_payload().unwrap();
        // data = 0x80, access_list = 0xc0 close the list.
        assert_eq!(&payload[payload.len() - 2..], &[0x80, 0xc0]);
    }

    #[test]
    fn signed_form_recovers_signer() {
        let tx = transfer(1, 0);
        let signed = tx.sign(&test_key()).unwrap();
        assert_eq!(signed.raw()[0], EIP1559_TX_TYPE);
        assert!(signed.raw_hex().starts_with("0x02"));
        assert_eq!(signed.hash().to_string().len(), 66);

        let hash = tx.signing_hash().unwrap();
        let recovered = recover_prehash(&hash, signed.signature()).unwrap();
        assert_eq!(recovered.address(), test_key().address());
    }

    #[test]
    fn signing_is_deterministic() {
        let a = transfer(1, 0).sign(&test_key()).unwrap();
        let b = transfer(1, 0).sign(&test_key()).unwrap();
        assert_eq!(a.raw(), b.raw());
    }

    #[test]
    fn nonce_and_chain_change_the_bytes() {
        let base = transfer(1, 0).sign(&test_key()).unwrap();
        let other_nonce = transfer(1, 1).sign(&test_key()).unwrap();
        let other_chain = transfer(137, 0).sign(&test_key()).unwrap();
        assert_ne!(base.hash(), other_nonce.hash());
        assert_ne!(base.hash(), other_chain.hash());
    }

    #[test]
    fn decode_round_trip_recovers_sender() {
        let tx = Eip1559Transaction {
            data: vec![0xa9, 0x05, 0x9c, 0xbb],
            to: None,
            ..transfer(11_155_111, 7)
        };
        let signed = tx.sign(&test_key()).unwrap();
        let decoded = decode_signed(signed.raw()).unwrap();
        assert_eq!(decoded, signed);
        assert_eq!(recover_sender(&decoded).unwrap(), test_key().address());
    }

    #[test]
    fn decode_rejects_malformed_input() {
        assert!(matches!(decode_signed(&[]), Err(EthError::EncodingError(_))));

        let signed = transfer(1, 0).sign(&test_key()).unwrap();
        let raw = signed.raw();
        // Legacy bytes have no type prefix.
        assert!(decode_signed(&raw[1..]).is_err());

        let mut trailing = raw.to_vec();
        trailing.push(0x00);
        assert!(matches!(
            decode_signed(&trailing),
            Err(EthError::EncodingError(_))
        ));
        assert!(decode_signed(&raw[..raw.len() - 1]).is_err());
    }

    #[test]
    fn priority_fee_above_cap_is_rejected() {
        let mut tx = transfer(1, 0);
        tx.max_priority_fee_per_gas = BigInt::from(60_000_000_000u64);
        assert!(matches!(tx.validate(), Err(EthError::InvalidTransaction(_))));
    }

    #[test]
    fn negative_value_is_rejected() {
        let mut tx = transfer(1, 0);
        tx.value = BigInt::from(-5);
        assert!(matches!(
            tx.sign(&test_key()),
            Err(EthError::InvalidTransaction(_))
        ));
    }
}
