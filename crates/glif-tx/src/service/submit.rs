//! Build, sign and broadcast new transactions.

use std::sync::Arc;

use glif_telemetry::log_tx_event;

use crate::domain::{
    fee_cap_for, Eip1559Transaction, NonceCache, SignedTransaction, TxError, TxRequest,
};
use crate::ports::{ChainProvider, TxSigner};

/// Sends transactions with nonces from a shared [`NonceCache`].
pub struct TxSubmitter<P: ChainProvider> {
    provider: Arc<P>,
    nonces: Arc<NonceCache>,
}

impl<P: ChainProvider> TxSubmitter<P> {
    pub fn new(provider: Arc<P>, nonces: Arc<NonceCache>) -> Self {
        Self { provider, nonces }
    }

    pub fn nonces(&self) -> &Arc<NonceCache> {
        &self.nonces
    }

    /// Fill in gas, fees and nonce for `request`, sign it and broadcast it.
    ///
    /// If signing or broadcasting fails the nonce is released.
    pub async fn send<S: TxSigner + ?Sized>(
        &self,
        signer: &S,
        request: TxRequest,
    ) -> Result<SignedTransaction, TxError> {
        let from = signer.address();
        let chain_id = self.provider.chain_id().await?;

        let gas_limit = match request.gas_limit {
            Some(limit) => limit,
            None => self.provider.estimate_gas(from, &request).await?,
        };
        let tip = match request.max_priority_fee_per_gas {
            Some(tip) => tip,
            None => self.provider.max_priority_fee().await?,
        };
        let cap = match request.max_fee_per_gas {
            Some(cap) => cap,
            None => fee_cap_for(self.provider.base_fee().await?, tip),
        };
        if cap < tip {
            return Err(TxError::InvalidFees {
                max_fee_per_gas: cap,
                max_priority_fee_per_gas: tip,
            });
        }

        let nonce = self.nonces.next_nonce(from, self.provider.as_ref()).await?;

        let tx = Eip1559Transaction {
            chain_id,
            nonce,
            max_priority_fee_per_gas: tip,
            max_fee_per_gas: cap,
            gas_limit,
            to: request.to,
            value: request.value,
            data: request.data,
        };

        let signed = match tx.sign(signer) {
            Ok(signed) => signed,
            Err(e) => {
                self.nonces.release(from, nonce).await;
                return Err(e);
            }
        };

        if let Err(e) = self.provider.send_raw_transaction(&signed.raw).await {
            log_tx_event!(warn, "Broadcast failed, releasing nonce", signed.hash, nonce = nonce, error = %e);
            self.nonces.release(from, nonce).await;
            return Err(e);
        }

        log_tx_event!(info, "Transaction broadcast", signed.hash, nonce = nonce, from = ?from);
        Ok(signed)
    }
}
