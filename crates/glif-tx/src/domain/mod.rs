//! Domain layer: transaction entities, fee policy and nonce sequencing.

pub mod entities;
pub mod errors;
pub mod fees;
pub mod nonce;

pub use entities::{
    Eip1559Transaction, PendingTransaction, Receipt, ReplaceKind, ReplaceOptions, Replacement,
    SignedTransaction, TxRequest, EIP1559_TX_TYPE,
};
pub use errors::TxError;
pub use fees::{
    compute_min_rbf, compute_rbf, fee_cap_for, FeeBump, GasFees, Percent, RbfPolicy,
    REPLACE_BY_FEE_DEFAULT, REPLACE_BY_FEE_MIN,
};
pub use nonce::NonceCache;
