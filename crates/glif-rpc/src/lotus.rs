//! Filecoin namespace (`Filecoin.*`) client.
//!
//! Only the methods needed to move between message CIDs and Ethereum
//! transaction hashes are wrapped.

use glif_primitives::Hash;
use serde::{Deserialize, Serialize};

use crate::types::LotusVersion;
use crate::{RpcConfig, RpcError, RpcTransport};

/// IPLD JSON link: `{"/": "bafy..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CidLink {
    #[serde(rename = "/")]
    root: String,
}

/// Client for Lotus `Filecoin.*` methods.
#[derive(Debug)]
pub struct LotusClient {
    transport: RpcTransport,
}

impl LotusClient {
    pub fn new(transport: RpcTransport) -> Self {
        Self { transport }
    }

    /// Build a client for `config.lotus_url`, authenticating with `config.lotus_token`.
    pub fn from_config(config: &RpcConfig) -> Result<Self, RpcError> {
        Ok(Self::new(RpcTransport::new(
            config.lotus_url.clone(),
            config.lotus_token.clone(),
            config.timeout,
        )?))
    }

    /// Ethereum hash of the message with CID `cid`, if the node has indexed it.
    pub async fn eth_tx_hash_by_cid(&self, cid: &str) -> Result<Option<Hash>, RpcError> {
        let link = CidLink {
            root: cid.to_string(),
        };
        self.transport
            .call("Filecoin.EthGetTransactionHashByCid", [link])
            .await
    }

    /// Message CID of the transaction with hash `hash`.
    pub async fn message_cid_by_eth_hash(&self, hash: Hash) -> Result<Option<String>, RpcError> {
        let link: Option<CidLink> = self
            .transport
            .call("Filecoin.EthGetMessageCidByTransactionHash", [hash])
            .await?;
        Ok(link.map(|l| l.root))
    }

    /// Filecoin.Version - Node build and API version.
    pub async fn version(&self) -> Result<LotusVersion, RpcError> {
        self.transport
            .call("Filecoin.Version", Vec::<()>::new())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cid_link_shape() {
        let link = CidLink {
            root: "bafy2bzacea".into(),
        };
        assert_eq!(
            serde_json::to_value(&link).unwrap(),
            serde_json::json!({"/": "bafy2bzacea"})
        );
    }
}
