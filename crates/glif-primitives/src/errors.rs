//! Primitive parsing errors.

use thiserror::Error;

/// Errors raised while parsing or converting primitive values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrimitivesError {
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: &'static str },

    #[error("Invalid Filecoin address '{input}': {reason}")]
    InvalidFilAddress { input: String, reason: &'static str },

    #[error("Filecoin address checksum mismatch: {0}")]
    ChecksumMismatch(String),

    #[error("Address {0} has no Ethereum equivalent")]
    NoEthEquivalent(String),

    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("Invalid transaction id '{0}': expected 0x-prefixed hash or message CID")]
    InvalidTxId(String),
}
