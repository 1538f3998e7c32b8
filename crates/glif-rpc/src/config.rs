//! Endpoint configuration.

use std::time::Duration;

use crate::RpcError;

/// Public GLIF node (Ethereum and Filecoin namespaces on one endpoint).
pub const DEFAULT_RPC_URL: &str = "https://api.node.glif.io/rpc/v1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Node endpoints and credentials.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Endpoint for `eth_*` calls
    pub eth_url: String,
    /// Endpoint for `Filecoin.*` calls
    pub lotus_url: String,
    /// Bearer token sent with Lotus calls
    pub lotus_token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            eth_url: DEFAULT_RPC_URL.to_string(),
            lotus_url: DEFAULT_RPC_URL.to_string(),
            lotus_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RpcConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), RpcError> {
        validate_url(&self.eth_url)?;
        validate_url(&self.lotus_url)?;
        if self.timeout.is_zero() {
            return Err(RpcError::InvalidUrl {
                url: self.eth_url.clone(),
                reason: "timeout must be non-zero".into(),
            });
        }
        Ok(())
    }
}

/// Only `http` and `https` endpoints are accepted.
pub fn validate_url(url: &str) -> Result<(), RpcError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| RpcError::InvalidUrl {
            url: url.to_string(),
            reason: "scheme must be http or https".into(),
        })?;
    if rest.is_empty() || rest.starts_with('/') {
        return Err(RpcError::InvalidUrl {
            url: url.to_string(),
            reason: "missing host".into(),
        });
    }
    Ok(())
}
