//! Either kind of signed transaction, told apart by the EIP-2718 type byte.

use num::BigInt;

use crate::address::Address;
use crate::eip1559::{self, SignedEip1559Transaction, EIP1559_TX_TYPE};
use crate::error::EthError;
use crate::transaction::{self, SignedEnvelope, SignedTransaction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxEnvelope {
    Legacy(SignedTransaction),
    Eip1559(SignedEip1559Transaction),
}

impl TxEnvelope {
    /// Dispatches on the first byte: `0x02` is EIP-1559, an RLP list header
    /// is a legacy transaction. Other typed transactions are rejected.
    pub fn decode(raw: &[u8]) -> Result<Self, EthError> {
        match raw.first() {
            Some(&EIP1559_TX_TYPE) => eip1559::decode_signed(raw).map(Self::Eip1559),
            Some(&b) if b >= 0xc0 => transaction::decode_signed(raw).map(Self::Legacy),
            Some(&b) => Err(EthError::EncodingError(format!(
                "unsupported transaction type 0x{b:02x}"
            ))),
            None => Err(EthError::EncodingError("empty transaction".into())),
        }
    }

    pub fn nonce(&self) -> u64 {
        match self {
            Self::Legacy(signed) => signed.tx().nonce,
            Self::Eip1559(signed) => signed.tx().nonce,
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Self::Legacy(signed) => signed.chain_id(),
            Self::Eip1559(signed) => signed.tx().chain_id,
        }
    }

    pub fn gas_limit(&self) -> u64 {
        match self {
            Self::Legacy(signed) => signed.tx().gas_limit,
            Self::Eip1559(signed) => signed.tx().gas_limit,
        }
    }

    pub fn to(&self) -> Option<Address> {
        match self {
            Self::Legacy(signed) => signed.tx().to,
            Self::Eip1559(signed) => signed.tx().to,
        }
    }

    pub fn value(&self) -> &BigInt {
        match self {
            Self::Legacy(signed) => &signed.tx().value,
            Self::Eip1559(signed) => &signed.tx().value,
        }
    }

    pub fn data(&self) -> &[u8] {
        match self {
            Self::Legacy(signed) => &signed.tx().data,
            Self::Eip1559(signed) => &signed.tx().data,
        }
    }

    /// The price per gas the sender offered: `gasPrice`, or the fee cap.
    pub fn max_gas_price(&self) -> &BigInt {
        match self {
            Self::Legacy(signed) => &signed.tx().gas_price,
            Self::Eip1559(signed) => &signed.tx().max_fee_per_gas,
        }
    }

    pub fn recover_sender(&self) -> Result<Address, EthError> {
        match self {
            Self::Legacy(signed) => transaction::recover_sender(signed),
            Self::Eip1559(signed) => eip1559::recover_sender(signed),
        }
    }
}

impl SignedEnvelope for TxEnvelope {
    fn raw(&self) -> &[u8] {
        match self {
            Self::Legacy(signed) => signed.raw(),
            Self::Eip1559(signed) => signed.raw(),
        }
    }
}

impl From<SignedTransaction> for TxEnvelope {
    fn from(signed: SignedTransaction) -> Self {
        Self::Legacy(signed)
    }
}

impl From<SignedEip1559Transaction> for TxEnvelope {
    fn from(signed: SignedEip1559Transaction) -> Self {
        Self::Eip1559(signed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eip1559::Eip1559Transaction;
    use crate::keys::PrivateKey;
    use crate::transaction::{sign_transaction, LegacyTransaction, Signable};

    fn key() -> PrivateKey {
        let mut bytes = [0u8; 32];
        bytes[31] = 7;
        PrivateKey::from_bytes(&bytes).unwrap()
    }

    fn recipient() -> Address {
        Address::from_bytes([0x35; 20])
    }

    #[test]
    fn decodes_both_kinds() {
        let legacy = sign_transaction(
            &LegacyTransaction {
                nonce: 3,
                gas_price: BigInt::from(1_000_000_000u64),
                gas_limit: 21_000,
                to: Some(recipient()),
                value: BigInt::from(1u8),
                data: Vec::new(),
                chain_id: 97,
            },
            &key(),
        )
        .unwrap();
        let typed = Eip1559Transaction {
            chain_id: 97,
            nonce: 4,
            max_priority_fee_per_gas: BigInt::from(1_000_000_000u64),
            max_fee_per_gas: BigInt::from(3_000_000_000u64),
            gas_limit: 21_000,
            to: Some(recipient()),
            value: BigInt::from(2u8),
            data: Vec::new(),
        }
        .sign(&key())
        .unwrap();

        let a = TxEnvelope::decode(legacy.raw()).unwrap();
        let b = TxEnvelope::decode(typed.raw()).unwrap();
        assert!(matches!(a, TxEnvelope::Legacy(_)));
        assert!(matches!(b, TxEnvelope::Eip1559(_)));

        assert_eq!((a.nonce(), b.nonce()), (3, 4));
        assert_eq!(a.chain_id(), b.chain_id());
        assert_eq!(b.max_gas_price(), &BigInt::from(3_000_000_000u64));
        assert_eq!(a.recover_sender().unwrap(), key().address());
        assert_eq!(b.recover_sender().unwrap(), key().address());
        assert_eq!(a.hash(), legacy.hash());
        assert_eq!(b.raw(), typed.raw());
    }

    #[test]
    fn rejects_unknown_types() {
        assert!(matches!(TxEnvelope::decode(&[]), Err(EthError::EncodingError(_))));
        // EIP-2930 access-list transactions are not handled.
        assert!(matches!(
            TxEnvelope::decode(&[0x01, 0xc0]),
            Err(EthError::EncodingError(_))
        ));
    }
}
