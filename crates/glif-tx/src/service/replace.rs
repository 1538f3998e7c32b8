//! Speed-up and cancel of pending transactions.
//!
//! A replacement reuses the pending transaction's nonce with fees raised by
//! the [`RbfPolicy`]. Speed-up resends the same call; cancel sends an empty
//! zero-value transfer to the sender.

use std::sync::Arc;

use glif_primitives::{Bytes, TxId, U256};
use glif_telemetry::log_tx_event;

use crate::domain::{
    fee_cap_for, Eip1559Transaction, FeeBump, GasFees, RbfPolicy, ReplaceKind, ReplaceOptions,
    Replacement, TxError,
};
use crate::ports::{ChainProvider, TxSigner};

/// Replaces pending transactions.
pub struct Replacer<P: ChainProvider> {
    provider: Arc<P>,
    policy: RbfPolicy,
}

impl<P: ChainProvider> Replacer<P> {
    pub fn new(provider: Arc<P>, policy: RbfPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn policy(&self) -> &RbfPolicy {
        &self.policy
    }

    /// Replace the pending transaction `tx_id` sent by `signer`.
    pub async fn replace<S: TxSigner + ?Sized>(
        &self,
        signer: &S,
        tx_id: &TxId,
        kind: ReplaceKind,
        opts: &ReplaceOptions,
    ) -> Result<Replacement, TxError> {
        let hash = match tx_id {
            TxId::EthHash(hash) => *hash,
            TxId::Cid(cid) => self
                .provider
                .resolve_cid(cid)
                .await?
                .ok_or_else(|| TxError::NotFound(cid.clone()))?,
        };

        let pending = self
            .provider
            .transaction_by_hash(hash)
            .await?
            .ok_or_else(|| TxError::NotFound(tx_id.to_string()))?;

        if let Some(block_number) = pending.block_number {
            return Err(TxError::AlreadyMined { hash, block_number });
        }

        let signer_address = signer.address();
        if pending.from != signer_address {
            return Err(TxError::SenderMismatch {
                sender: pending.from,
                signer: signer_address,
            });
        }

        let old = GasFees {
            max_priority_fee_per_gas: pending.max_priority_fee_per_gas,
            max_fee_per_gas: pending.max_fee_per_gas,
        };
        let network_tip = self.provider.max_priority_fee().await?;
        let base_fee = self.provider.base_fee().await?;

        let new = match (opts.max_priority_fee_per_gas, opts.max_fee_per_gas) {
            (None, None) => self.policy.bump(old, network_tip, base_fee)?.new,
            (tip, cap) => {
                let suggested = self.policy.suggest(old, network_tip, base_fee);
                let tip = tip.unwrap_or(suggested.max_priority_fee_per_gas);
                let cap = cap.unwrap_or_else(|| {
                    suggested.max_fee_per_gas.max(fee_cap_for(base_fee, tip))
                });
                GasFees {
                    max_priority_fee_per_gas: tip,
                    max_fee_per_gas: cap,
                }
            }
        };
        self.policy.check_replacement(&old, &new)?;

        let (to, value, data, gas_limit) = match kind {
            ReplaceKind::SpeedUp => (pending.to, pending.value, pending.data, pending.gas_limit),
            ReplaceKind::Cancel => (
                Some(signer_address),
                U256::zero(),
                Bytes::new(),
                opts.gas_limit.unwrap_or(pending.gas_limit),
            ),
        };

        let tx = Eip1559Transaction {
            chain_id: self.provider.chain_id().await?,
            nonce: pending.nonce,
            max_priority_fee_per_gas: new.max_priority_fee_per_gas,
            max_fee_per_gas: new.max_fee_per_gas,
            gas_limit,
            to,
            value,
            data,
        };

        let signed = tx.sign(signer)?;
        self.provider.send_raw_transaction(&signed.raw).await?;

        log_tx_event!(
            info,
            "Replacement broadcast",
            signed.hash,
            original = ?hash,
            kind = ?kind,
            nonce = pending.nonce
        );

        Ok(Replacement {
            kind,
            original: hash,
            signed,
            fees: FeeBump { old, new },
        })
    }
}
