//! Ports layer: what the transaction services need from the outside.

pub mod outbound;

pub use outbound::{ChainProvider, TxSigner};

#[cfg(test)]
pub use outbound::MockChainProvider;
