//! [`TxSigner`] for keys held in memory.

use glif_primitives::Address;
use glif_wallet::{LocalSigner, RecoverableSignature};

use crate::domain::TxError;
use crate::ports::TxSigner;

impl TxSigner for LocalSigner {
    fn address(&self) -> Address {
        LocalSigner::address(self)
    }

    fn sign_hash(&self, hash: &[u8; 32]) -> Result<RecoverableSignature, TxError> {
        Ok(LocalSigner::sign_hash(self, hash))
    }
}
