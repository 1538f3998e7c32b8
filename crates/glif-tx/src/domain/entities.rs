//! Transaction entities.

use glif_primitives::{Address, Bytes, Hash, U256};
use rlp::RlpStream;
use sha3::{Digest, Keccak256};

use crate::domain::fees::FeeBump;
use crate::domain::TxError;
use crate::ports::TxSigner;

/// EIP-2718 type byte for dynamic-fee transactions.
pub const EIP1559_TX_TYPE: u8 = 0x02;

/// What the caller wants sent; unset fields are filled in from the chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxRequest {
    /// `None` deploys a contract
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
    pub gas_limit: Option<u64>,
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
}

impl TxRequest {
    /// Plain value transfer.
    pub fn transfer(to: Address, value: U256) -> Self {
        Self {
            to: Some(to),
            value,
            ..Self::default()
        }
    }

    /// Contract call with calldata.
    pub fn call(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to: Some(to),
            data: data.into(),
            ..Self::default()
        }
    }
}

/// Unsigned EIP-1559 transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip1559Transaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub max_priority_fee_per_gas: U256,
    pub max_fee_per_gas: U256,
    pub gas_limit: u64,
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
}

impl Eip1559Transaction {
    /// `[chainId, nonce, maxPriorityFeePerGas, maxFeePerGas, gasLimit, to, value, data, accessList]`
    fn append_fields(&self, stream: &mut RlpStream) {
        stream.append(&self.chain_id);
        stream.append(&self.nonce);
        stream.append(&self.max_priority_fee_per_gas);
        stream.append(&self.max_fee_per_gas);
        stream.append(&self.gas_limit);
        match &self.to {
            Some(to) => stream.append(to),
            None => stream.append_empty_data(),
        };
        stream.append(&self.value);
        stream.append(&self.data.0);
        stream.begin_list(0);
    }

    /// keccak256(0x02 || rlp(9 fields)).
    pub fn signing_hash(&self) -> [u8; 32] {
        let mut stream = RlpStream::new_list(9);
        self.append_fields(&mut stream);

        let mut hasher = Keccak256::new();
        hasher.update([EIP1559_TX_TYPE]);
        hasher.update(stream.as_raw());
        hasher.finalize().into()
    }

    /// Sign and encode as `0x02 || rlp(12 fields)`.
    pub fn sign<S: TxSigner + ?Sized>(&self, signer: &S) -> Result<SignedTransaction, TxError> {
        let signature = signer.sign_hash(&self.signing_hash())?;

        let mut stream = RlpStream::new_list(12);
        self.append_fields(&mut stream);
        stream.append(&u64::from(signature.y_parity));
        stream.append(&U256::from_big_endian(&signature.r));
        stream.append(&U256::from_big_endian(&signature.s));

        let mut raw = Vec::with_capacity(1 + stream.as_raw().len());
        raw.push(EIP1559_TX_TYPE);
        raw.extend_from_slice(stream.as_raw());

        let hash = Hash::from_slice(&Keccak256::digest(&raw));

        Ok(SignedTransaction {
            tx: self.clone(),
            from: signer.address(),
            hash,
            raw: Bytes(raw),
        })
    }
}

/// Signed, encoded transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub tx: Eip1559Transaction,
    pub from: Address,
    pub hash: Hash,
    pub raw: Bytes,
}

/// Mempool view of a transaction, enough to rebuild it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub hash: Hash,
    pub from: Address,
    pub to: Option<Address>,
    pub nonce: u64,
    pub value: U256,
    pub data: Bytes,
    pub gas_limit: u64,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
    /// Set once included in a block
    pub block_number: Option<u64>,
}

/// Execution outcome of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub hash: Hash,
    pub block_number: u64,
    pub gas_used: U256,
    /// 1 = success, 0 = reverted
    pub status: u64,
    pub effective_gas_price: Option<U256>,
}

impl Receipt {
    pub fn succeeded(&self) -> bool {
        self.status == 1
    }
}

/// Kind of replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceKind {
    /// Same call, higher fees
    SpeedUp,
    /// Zero-value self transfer at the same nonce
    Cancel,
}

/// Caller overrides for a replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceOptions {
    pub max_priority_fee_per_gas: Option<U256>,
    pub max_fee_per_gas: Option<U256>,
    /// Gas limit for a cancel; defaults to the original limit
    pub gas_limit: Option<u64>,
}

/// Result of a broadcast replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub kind: ReplaceKind,
    pub original: Hash,
    pub signed: SignedTransaction,
    pub fees: FeeBump,
}

#[cfg(test)]
mod tests {
    use super::*;
    use glif_wallet::{recover_address, LocalSigner};

    fn sample_tx() -> Eip1559Transaction {
        Eip1559Transaction {
            chain_id: 314_159,
            nonce: 3,
            max_priority_fee_per_gas: U256::from(100_000u64),
            max_fee_per_gas: U256::from(1_000_000u64),
            gas_limit: 21_000,
            to: Some(Address::repeat_byte(0x22)),
            value: U256::from(1u64),
            data: Bytes::new(),
        }
    }

    #[test]
    fn test_signed_encoding_layout() {
        let signer = LocalSigner::generate();
        let tx = sample_tx();
        let signed = tx.sign(&signer).unwrap();

        assert_eq!(signed.raw[0], EIP1559_TX_TYPE);
        let rlp = rlp::Rlp::new(&signed.raw[1..]);
        assert_eq!(rlp.item_count().unwrap(), 12);
        assert_eq!(rlp.val_at::<u64>(0).unwrap(), 314_159);
        assert_eq!(rlp.val_at::<u64>(1).unwrap(), 3);
        assert_eq!(rlp.val_at::<u64>(4).unwrap(), 21_000);
        assert_eq!(rlp.at(8).unwrap().item_count().unwrap(), 0);

        assert_eq!(signed.hash, Hash::from_slice(&Keccak256::digest(&signed.raw.0)));
        assert_eq!(signed.from, signer.address());
    }

    #[test]
    fn test_signature_recovers_sender() {
        let signer = LocalSigner::generate();
        let tx = sample_tx();
        let signed = tx.sign(&signer).unwrap();

        let rlp = rlp::Rlp::new(&signed.raw[1..]);
        let y_parity: u64 = rlp.val_at(9).unwrap();
        let r: U256 = rlp.val_at(10).unwrap();
        let s: U256 = rlp.val_at(11).unwrap();

        let mut r_bytes = [0u8; 32];
        let mut s_bytes = [0u8; 32];
        r.to_big_endian(&mut r_bytes);
        s.to_big_endian(&mut s_bytes);

        let signature = glif_wallet::RecoverableSignature {
            r: r_bytes,
            s: s_bytes,
            y_parity: y_parity as u8,
        };
        assert_eq!(
            recover_address(&tx.signing_hash(), &signature).unwrap(),
            signer.address()
        );
    }

    #[test]
    fn test_contract_creation_encodes_empty_to() {
        let tx = Eip1559Transaction {
            to: None,
            ..sample_tx()
        };
        let signed = tx.sign(&LocalSigner::generate()).unwrap();
        let rlp = rlp::Rlp::new(&signed.raw[1..]);
        assert!(rlp.at(5).unwrap().is_empty());
    }

    #[test]
    fn test_signing_hash_depends_on_nonce() {
        let a = sample_tx();
        let b = Eip1559Transaction { nonce: 4, ..sample_tx() };
        assert_ne!(a.signing_hash(), b.signing_hash());
    }
}
