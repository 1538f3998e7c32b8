//! Transaction pipeline errors.

use std::time::Duration;

use glif_primitives::{Address, Hash, U256};
use thiserror::Error;

/// Errors raised while building, replacing or tracking transactions.
#[derive(Debug, Error)]
pub enum TxError {
    /// Hash or CID unknown to the node
    #[error("Transaction {0} not found")]
    NotFound(String),

    /// Replacement requested for a transaction already in a block
    #[error("Transaction {hash:?} already mined in block {block_number}")]
    AlreadyMined { hash: Hash, block_number: u64 },

    /// Transaction was sent by a different account than the signer
    #[error("Transaction was sent by {sender:?}, not by signer {signer:?}")]
    SenderMismatch { sender: Address, signer: Address },

    /// Replacement fee below the minimum bump
    #[error("{field} of {new} does not bump {old} by at least {min_bump_percent}%")]
    InsufficientFeeBump {
        field: &'static str,
        old: U256,
        new: U256,
        min_bump_percent: u64,
    },

    /// RBF ratio below the protocol minimum
    #[error("Replace-by-fee ratio {ratio}% is below the minimum {min}%")]
    InvalidRbfRatio { ratio: u64, min: u64 },

    /// Bumped fee cap exceeds the user's limit
    #[error("Max fee per gas {max_fee_per_gas} exceeds the limit {limit}")]
    FeeLimitExceeded { max_fee_per_gas: U256, limit: U256 },

    /// Fee cap lower than the tip
    #[error("Max fee per gas {max_fee_per_gas} is below the priority fee {max_priority_fee_per_gas}")]
    InvalidFees {
        max_fee_per_gas: U256,
        max_priority_fee_per_gas: U256,
    },

    /// Mined with status 0
    #[error("Transaction {hash:?} reverted in block {block_number}")]
    Reverted { hash: Hash, block_number: u64 },

    /// Receipt did not arrive in time
    #[error("Timed out after {waited:?} waiting for {hash:?}")]
    Timeout { hash: Hash, waited: Duration },

    /// Node or transport failure
    #[error("Provider error: {0}")]
    Provider(String),

    /// Signer failure
    #[error("Signing failed: {0}")]
    Signing(String),
}

impl From<glif_rpc::RpcError> for TxError {
    fn from(err: glif_rpc::RpcError) -> Self {
        TxError::Provider(err.to_string())
    }
}

impl From<glif_wallet::WalletError> for TxError {
    fn from(err: glif_wallet::WalletError) -> Self {
        TxError::Signing(err.to_string())
    }
}
