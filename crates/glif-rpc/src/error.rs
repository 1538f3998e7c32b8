//! RPC error types.

use thiserror::Error;

/// Errors that can occur when talking to a node.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("RPC response for {0} missing result")]
    MissingResult(String),

    #[error("Invalid RPC URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl RpcError {
    /// True when the failure happened before the node saw the request.
    pub fn is_transport(&self) -> bool {
        matches!(self, RpcError::Http(_) | RpcError::Connection(_))
    }
}
