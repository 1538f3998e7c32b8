//! Outbound (Driven) ports.
//!
//! [`ChainProvider`] is the node; [`TxSigner`] holds the key.

use async_trait::async_trait;
use glif_primitives::{Address, Hash, U256};
use glif_wallet::RecoverableSignature;

use crate::domain::{PendingTransaction, Receipt, TxError, TxRequest};

/// Chain access needed to send, replace and track transactions.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    async fn chain_id(&self) -> Result<u64, TxError>;

    /// Current head height.
    async fn block_number(&self) -> Result<u64, TxError>;

    /// Nonce including transactions still in the mempool.
    async fn pending_nonce(&self, address: Address) -> Result<u64, TxError>;

    async fn transaction_by_hash(&self, hash: Hash)
        -> Result<Option<PendingTransaction>, TxError>;

    /// `None` until mined.
    async fn transaction_receipt(&self, hash: Hash) -> Result<Option<Receipt>, TxError>;

    /// Ethereum hash for a Filecoin message CID.
    async fn resolve_cid(&self, cid: &str) -> Result<Option<Hash>, TxError>;

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<Hash, TxError>;

    /// Suggested priority fee.
    async fn max_priority_fee(&self) -> Result<U256, TxError>;

    /// Base fee of the latest block.
    async fn base_fee(&self) -> Result<U256, TxError>;

    async fn estimate_gas(&self, from: Address, request: &TxRequest) -> Result<u64, TxError>;
}

/// Signs transaction digests.
pub trait TxSigner: Send + Sync {
    fn address(&self) -> Address;

    fn sign_hash(&self, hash: &[u8; 32]) -> Result<RecoverableSignature, TxError>;
}

/// In-memory chain for service tests.
#[cfg(test)]
pub struct MockChainProvider {
    state: parking_lot::Mutex<MockState>,
    nonce_queries: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
#[derive(Default)]
struct MockState {
    chain_id: u64,
    head: u64,
    advance_head: bool,
    nonces: std::collections::HashMap<Address, u64>,
    failing_nonce: bool,
    txs: std::collections::HashMap<Hash, PendingTransaction>,
    cids: std::collections::HashMap<String, Hash>,
    receipts: std::collections::HashMap<Hash, (usize, Receipt)>,
    receipt_errors: usize,
    sent: Vec<Vec<u8>>,
    failing_sends: usize,
    tip: U256,
    base_fee: U256,
    gas_estimate: u64,
}

#[cfg(test)]
impl MockChainProvider {
    pub fn new() -> Self {
        Self {
            state: parking_lot::Mutex::new(MockState {
                chain_id: 314_159,
                head: 100,
                tip: U256::from(1_000u64),
                base_fee: U256::from(100u64),
                gas_estimate: 21_000,
                ..MockState::default()
            }),
            nonce_queries: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    fn state(&self) -> parking_lot::MutexGuard<'_, MockState> {
        self.state.lock()
    }

    pub fn with_nonce(self, address: Address, nonce: u64) -> Self {
        self.set_nonce(address, nonce);
        self
    }

    pub fn set_nonce(&self, address: Address, nonce: u64) {
        self.state().nonces.insert(address, nonce);
    }

    pub fn failing_nonce(self) -> Self {
        self.state().failing_nonce = true;
        self
    }

    pub fn with_transaction(self, tx: PendingTransaction) -> Self {
        self.state().txs.insert(tx.hash, tx);
        self
    }

    pub fn with_cid(self, cid: &str, hash: Hash) -> Self {
        self.state().cids.insert(cid.to_string(), hash);
        self
    }

    /// Receipt becomes visible after `polls` empty answers.
    pub fn with_receipt_after(self, polls: usize, receipt: Receipt) -> Self {
        self.state().receipts.insert(receipt.hash, (polls, receipt));
        self
    }

    pub fn with_receipt_errors(self, count: usize) -> Self {
        self.state().receipt_errors = count;
        self
    }

    pub fn with_head(self, head: u64, advance: bool) -> Self {
        {
            let mut state = self.state();
            state.head = head;
            state.advance_head = advance;
        }
        self
    }

    pub fn with_fees(self, tip: u64, base_fee: u64) -> Self {
        {
            let mut state = self.state();
            state.tip = U256::from(tip);
            state.base_fee = U256::from(base_fee);
        }
        self
    }

    pub fn failing_sends(self, count: usize) -> Self {
        self.state().failing_sends = count;
        self
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.state().sent.clone()
    }

    pub fn nonce_queries(&self) -> usize {
        self.nonce_queries.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl ChainProvider for MockChainProvider {
    async fn chain_id(&self) -> Result<u64, TxError> {
        Ok(self.state().chain_id)
    }

    async fn block_number(&self) -> Result<u64, TxError> {
        let mut state = self.state();
        let head = state.head;
        if state.advance_head {
            state.head += 1;
        }
        Ok(head)
    }

    async fn pending_nonce(&self, address: Address) -> Result<u64, TxError> {
        self.nonce_queries
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        // Give racing callers a chance to interleave.
        tokio::task::yield_now().await;
        let state = self.state();
        if state.failing_nonce {
            return Err(TxError::Provider("nonce unavailable".into()));
        }
        Ok(state.nonces.get(&address).copied().unwrap_or(0))
    }

    async fn transaction_by_hash(
        &self,
        hash: Hash,
    ) -> Result<Option<PendingTransaction>, TxError> {
        Ok(self.state().txs.get(&hash).cloned())
    }

    async fn transaction_receipt(&self, hash: Hash) -> Result<Option<Receipt>, TxError> {
        let mut state = self.state();
        if state.receipt_errors > 0 {
            state.receipt_errors -= 1;
            return Err(TxError::Provider("connection reset".into()));
        }
        match state.receipts.get_mut(&hash) {
            Some((0, receipt)) => Ok(Some(receipt.clone())),
            Some((polls, _)) => {
                *polls -= 1;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn resolve_cid(&self, cid: &str) -> Result<Option<Hash>, TxError> {
        Ok(self.state().cids.get(cid).copied())
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<Hash, TxError> {
        use sha3::{Digest, Keccak256};

        let mut state = self.state();
        if state.failing_sends > 0 {
            state.failing_sends -= 1;
            return Err(TxError::Provider("mempool rejected message".into()));
        }
        state.sent.push(raw.to_vec());
        Ok(Hash::from_slice(&Keccak256::digest(raw)))
    }

    async fn max_priority_fee(&self) -> Result<U256, TxError> {
        Ok(self.state().tip)
    }

    async fn base_fee(&self) -> Result<U256, TxError> {
        Ok(self.state().base_fee)
    }

    async fn estimate_gas(&self, _from: Address, _request: &TxRequest) -> Result<u64, TxError> {
        Ok(self.state().gas_estimate)
    }
}
