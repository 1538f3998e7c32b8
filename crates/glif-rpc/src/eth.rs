//! Ethereum namespace (`eth_*`) client.

use glif_primitives::{quantity, Address, Bytes, Hash, U256};

use crate::types::{BlockHeader, BlockTag, CallRequest, EthTransaction, TransactionReceipt};
use crate::{RpcConfig, RpcError, RpcTransport};

/// Client for the `eth_*` methods Lotus serves on `/rpc/v1`.
#[derive(Debug)]
pub struct EthClient {
    transport: RpcTransport,
}

impl EthClient {
    pub fn new(transport: RpcTransport) -> Self {
        Self { transport }
    }

    /// Build a client for `config.eth_url`.
    pub fn from_config(config: &RpcConfig) -> Result<Self, RpcError> {
        Ok(Self::new(RpcTransport::new(
            config.eth_url.clone(),
            None,
            config.timeout,
        )?))
    }

    pub fn transport(&self) -> &RpcTransport {
        &self.transport
    }

    async fn call_quantity<P: serde::Serialize>(
        &self,
        method: &str,
        params: P,
    ) -> Result<u64, RpcError> {
        let result: String = self.transport.call(method, params).await?;
        quantity::parse_u64(&result).map_err(|e| RpcError::Parse(format!("{method}: {e}")))
    }

    /// eth_chainId - Get chain ID.
    pub async fn chain_id(&self) -> Result<u64, RpcError> {
        self.call_quantity("eth_chainId", Vec::<()>::new()).await
    }

    /// eth_blockNumber - Get current block height.
    pub async fn block_number(&self) -> Result<u64, RpcError> {
        self.call_quantity("eth_blockNumber", Vec::<()>::new()).await
    }

    /// eth_getTransactionCount - Nonce of `address` at `tag`.
    pub async fn get_transaction_count(
        &self,
        address: Address,
        tag: BlockTag,
    ) -> Result<u64, RpcError> {
        self.call_quantity("eth_getTransactionCount", (address, tag))
            .await
    }

    /// eth_getBalance - Balance of `address` in attoFIL at the latest block.
    pub async fn get_balance(&self, address: Address) -> Result<U256, RpcError> {
        self.transport
            .call("eth_getBalance", (address, BlockTag::Latest))
            .await
    }

    /// eth_getTransactionByHash - `None` when the node does not know the hash.
    pub async fn get_transaction_by_hash(
        &self,
        hash: Hash,
    ) -> Result<Option<EthTransaction>, RpcError> {
        self.transport
            .call("eth_getTransactionByHash", [hash])
            .await
    }

    /// eth_getTransactionReceipt - `None` until the transaction is mined.
    pub async fn get_transaction_receipt(
        &self,
        hash: Hash,
    ) -> Result<Option<TransactionReceipt>, RpcError> {
        self.transport
            .call("eth_getTransactionReceipt", [hash])
            .await
    }

    /// eth_sendRawTransaction - Broadcast a signed transaction.
    pub async fn send_raw_transaction(&self, raw: &[u8]) -> Result<Hash, RpcError> {
        self.transport
            .call("eth_sendRawTransaction", [Bytes::from(raw)])
            .await
    }

    /// eth_maxPriorityFeePerGas - Suggested tip in attoFIL.
    pub async fn max_priority_fee_per_gas(&self) -> Result<U256, RpcError> {
        self.transport
            .call("eth_maxPriorityFeePerGas", Vec::<()>::new())
            .await
    }

    /// eth_getBlockByNumber without transaction bodies.
    pub async fn get_block_by_number(
        &self,
        tag: BlockTag,
    ) -> Result<Option<BlockHeader>, RpcError> {
        self.transport
            .call("eth_getBlockByNumber", (tag, false))
            .await
    }

    /// Base fee of the latest block.
    pub async fn latest_base_fee(&self) -> Result<U256, RpcError> {
        self.get_block_by_number(BlockTag::Latest)
            .await?
            .and_then(|block| block.base_fee_per_gas)
            .ok_or_else(|| RpcError::MissingResult("eth_getBlockByNumber.baseFeePerGas".into()))
    }

    /// eth_estimateGas - Gas limit estimate for `call`.
    pub async fn estimate_gas(&self, call: &CallRequest) -> Result<u64, RpcError> {
        self.call_quantity("eth_estimateGas", [call]).await
    }
}
