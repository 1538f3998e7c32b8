//! Per-account nonce sequencing.
//!
//! The first request for an address seeds the counter from the node's
//! pending nonce; later requests are served from memory so concurrent
//! submitters never collide. The lock is held across the seeding call,
//! which means the node is asked at most once per address.

use std::collections::HashMap;

use glif_primitives::Address;
use tokio::sync::Mutex;

use crate::domain::TxError;
use crate::ports::ChainProvider;

/// Next nonce to hand out, per address.
#[derive(Debug, Default)]
pub struct NonceCache {
    next: Mutex<HashMap<Address, u64>>,
}

impl NonceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next nonce for `address`.
    ///
    /// A seeding failure leaves the cache untouched.
    pub async fn next_nonce<P: ChainProvider + ?Sized>(
        &self,
        address: Address,
        provider: &P,
    ) -> Result<u64, TxError> {
        let mut next = self.next.lock().await;

        let nonce = match next.get(&address) {
            Some(&nonce) => nonce,
            None => {
                let seeded = provider.pending_nonce(address).await?;
                tracing::debug!(address = ?address, nonce = seeded, "Seeded nonce from chain");
                seeded
            }
        };

        next.insert(address, nonce + 1);
        Ok(nonce)
    }

    /// Give back `nonce` after a failed broadcast.
    ///
    /// Only the most recent nonce can be returned to the pool; otherwise the
    /// entry is dropped and the next request re-seeds from the chain.
    pub async fn release(&self, address: Address, nonce: u64) {
        let mut next = self.next.lock().await;
        match next.get(&address) {
            Some(&current) if current == nonce + 1 => {
                next.insert(address, nonce);
            }
            Some(_) => {
                tracing::debug!(address = ?address, nonce, "Out-of-order release, re-seeding");
                next.remove(&address);
            }
            None => {}
        }
    }

    /// Forget `address`.
    pub async fn reset(&self, address: Address) {
        self.next.lock().await.remove(&address);
    }

    /// Nonce the next call would return, if seeded.
    pub async fn peek(&self, address: Address) -> Option<u64> {
        self.next.lock().await.get(&address).copied()
    }
}
