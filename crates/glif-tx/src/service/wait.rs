//! Receipt polling.
//!
//! Filecoin produces a tipset every 30 seconds, so polling faster than a few
//! seconds only adds load on the node.

use std::sync::Arc;
use std::time::Duration;

use glif_primitives::Hash;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::domain::{Receipt, TxError};
use crate::ports::ChainProvider;

/// Default delay between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default overall deadline.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(600);

/// Default blocks to wait on top of the inclusion block.
pub const DEFAULT_CONFIRMATIONS: u64 = 1;

/// Shorter poll intervals, including zero, are raised to this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Waits for a transaction to be mined and confirmed.
///
/// Dropping the future returned by [`wait`](Self::wait) stops polling; it
/// holds no state outside itself, so waiting again is always safe.
pub struct ReceiptWaiter<P: ChainProvider> {
    provider: Arc<P>,
    pub poll_interval: Duration,
    pub confirmations: u64,
    pub timeout: Duration,
}

impl<P: ChainProvider> ReceiptWaiter<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            poll_interval: DEFAULT_POLL_INTERVAL,
            confirmations: DEFAULT_CONFIRMATIONS,
            timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Wait for `hash` to be mined and buried under `confirmations` blocks.
    pub async fn wait(&self, hash: Hash) -> Result<Receipt, TxError> {
        match timeout(self.timeout, self.poll(hash)).await {
            Ok(result) => result,
            Err(_) => Err(TxError::Timeout {
                hash,
                waited: self.timeout,
            }),
        }
    }

    async fn poll(&self, hash: Hash) -> Result<Receipt, TxError> {
        let mut ticker = interval(self.poll_interval.max(MIN_POLL_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let receipt = loop {
            ticker.tick().await;
            match self.provider.transaction_receipt(hash).await {
                Ok(Some(receipt)) => break receipt,
                Ok(None) => tracing::trace!(tx_hash = ?hash, "Receipt not available yet"),
                Err(e) => tracing::warn!(tx_hash = ?hash, error = %e, "Receipt poll failed, retrying"),
            }
        };
        tracing::debug!(tx_hash = ?hash, block = receipt.block_number, "Transaction mined");

        if self.confirmations > 0 {
            let target = receipt.block_number.saturating_add(self.confirmations);
            loop {
                ticker.tick().await;
                match self.provider.block_number().await {
                    Ok(head) if head >= target => break,
                    Ok(head) => tracing::trace!(head, target, "Waiting for confirmation"),
                    Err(e) => tracing::warn!(error = %e, "Head poll failed, retrying"),
                }
            }
        }

        if !receipt.succeeded() {
            return Err(TxError::Reverted {
                hash,
                block_number: receipt.block_number,
            });
        }
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MockChainProvider;
    use glif_primitives::U256;
    use tokio::time::Instant;

    fn receipt(status: u64, block_number: u64) -> Receipt {
        Receipt {
            hash: Hash::repeat_byte(0xaa),
            block_number,
            gas_used: U256::from(21_000u64),
            status,
            effective_gas_price: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_receipt_and_confirmation() {
        let provider = Arc::new(
            MockChainProvider::new()
                .with_head(50, true)
                .with_receipt_after(2, receipt(1, 50)),
        );
        let waiter = ReceiptWaiter::new(provider);
        let start = Instant::now();

        let found = waiter.wait(Hash::repeat_byte(0xaa)).await.unwrap();

        assert_eq!(found.block_number, 50);
        // Two empty polls, the hit, then two head polls (50, 51).
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(20) && elapsed < Duration::from_secs(25));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_confirmations_returns_on_receipt() {
        let provider = Arc::new(
            MockChainProvider::new()
                .with_head(50, false)
                .with_receipt_after(0, receipt(1, 50)),
        );
        let waiter = ReceiptWaiter::new(provider).with_confirmations(0);
        let start = Instant::now();

        waiter.wait(Hash::repeat_byte(0xaa)).await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_poll_interval_is_clamped() {
        let provider = Arc::new(
            MockChainProvider::new()
                .with_head(50, true)
                .with_receipt_after(2, receipt(1, 50)),
        );
        let mut waiter = ReceiptWaiter::new(provider).with_poll_interval(Duration::ZERO);
        assert!(waiter.wait(Hash::repeat_byte(0xaa)).await.is_ok());

        waiter.poll_interval = Duration::ZERO;
        assert!(waiter.wait(Hash::repeat_byte(0xaa)).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reverted() {
        let provider = Arc::new(
            MockChainProvider::new()
                .with_head(60, false)
                .with_receipt_after(0, receipt(0, 55)),
        );
        let waiter = ReceiptWaiter::new(provider);

        let err = waiter.wait(Hash::repeat_byte(0xaa)).await.unwrap_err();
        assert!(matches!(err, TxError::Reverted { block_number: 55, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_provider_errors_are_retried() {
        let provider = Arc::new(
            MockChainProvider::new()
                .with_head(60, false)
                .with_receipt_errors(3)
                .with_receipt_after(0, receipt(1, 55)),
        );
        let waiter = ReceiptWaiter::new(provider);

        assert!(waiter.wait(Hash::repeat_byte(0xaa)).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let provider = Arc::new(MockChainProvider::new());
        let waiter = ReceiptWaiter::new(provider)
            .with_poll_interval(Duration::from_secs(5))
            .with_timeout(Duration::from_secs(60));
        let start = Instant::now();

        let err = waiter.wait(Hash::repeat_byte(0xaa)).await.unwrap_err();
        match err {
            TxError::Timeout { waited, .. } => assert_eq!(waited, Duration::from_secs(60)),
            other => panic!("unexpected error: {other}"),
        }
        assert!(start.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unconfirmed_times_out() {
        let provider = Arc::new(
            MockChainProvider::new()
                .with_head(50, false)
                .with_receipt_after(0, receipt(1, 50)),
        );
        let waiter = ReceiptWaiter::new(provider).with_timeout(Duration::from_secs(30));

        assert!(matches!(
            waiter.wait(Hash::repeat_byte(0xaa)).await,
            Err(TxError::Timeout { .. })
        ));
    }
}
