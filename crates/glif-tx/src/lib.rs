//! # GLIF Transactions
//!
//! Sending, replacing and tracking FEVM transactions.
//!
//! ## Guarantees
//!
//! | Guarantee | Enforcement |
//! |-----------|-------------|
//! | Distinct, consecutive nonces per sender under concurrency | `domain/nonce.rs` - lock held while seeding |
//! | Replacements raise tip and fee cap by at least 10% | `domain/fees.rs` - `check_replacement()` |
//! | Nonce returned after a failed broadcast | `service/submit.rs` - `send()` |
//! | Waiting is bounded and can be abandoned at any point | `service/wait.rs` - `wait()` |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  adapters/ - RpcChainProvider (Lotus JSON-RPC), LocalSigner     │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ports/outbound.rs - ChainProvider, TxSigner                    │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  service/ - TxSubmitter, Replacer, ReceiptWaiter                │
//! │  domain/  - entities, RbfPolicy, NonceCache, TxError            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::RpcChainProvider;
pub use domain::{
    compute_min_rbf, compute_rbf, Eip1559Transaction, FeeBump, GasFees, NonceCache,
    PendingTransaction, Percent, RbfPolicy, Receipt, ReplaceKind, ReplaceOptions, Replacement,
    SignedTransaction, TxError, TxRequest, REPLACE_BY_FEE_DEFAULT, REPLACE_BY_FEE_MIN,
};
pub use ports::{ChainProvider, TxSigner};
pub use service::{ReceiptWaiter, Replacer, TxSubmitter};
