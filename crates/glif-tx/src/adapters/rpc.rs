//! [`ChainProvider`] backed by a Lotus node's JSON-RPC API.

use async_trait::async_trait;
use glif_primitives::{Address, Hash, U256};
use glif_rpc::{
    BlockTag, CallRequest, EthClient, EthTransaction, LotusClient, RpcConfig, TransactionReceipt,
};

use crate::domain::{PendingTransaction, Receipt, TxError, TxRequest};
use crate::ports::ChainProvider;

/// Node access through [`EthClient`], with CID lookups through [`LotusClient`].
pub struct RpcChainProvider {
    eth: EthClient,
    lotus: Option<LotusClient>,
}

impl RpcChainProvider {
    pub fn new(eth: EthClient, lotus: Option<LotusClient>) -> Self {
        Self { eth, lotus }
    }

    /// Both clients built from `config`.
    pub fn from_config(config: &RpcConfig) -> Result<Self, TxError> {
        Ok(Self::new(
            EthClient::from_config(config)?,
            Some(LotusClient::from_config(config)?),
        ))
    }

    pub fn eth(&self) -> &EthClient {
        &self.eth
    }

    pub fn lotus(&self) -> Option<&LotusClient> {
        self.lotus.as_ref()
    }
}

impl From<EthTransaction> for PendingTransaction {
    fn from(tx: EthTransaction) -> Self {
        // Legacy transactions only carry a gas price, which serves as both fields.
        let max_fee_per_gas = tx.max_fee_per_gas.or(tx.gas_price).unwrap_or_default();
        let max_priority_fee_per_gas = tx
            .max_priority_fee_per_gas
            .or(tx.gas_price)
            .unwrap_or_default();

        Self {
            hash: tx.hash,
            from: tx.from,
            to: tx.to,
            nonce: tx.nonce,
            value: tx.value,
            data: tx.input,
            gas_limit: tx.gas,
            max_fee_per_gas,
            max_priority_fee_per_gas,
            block_number: tx.block_number,
        }
    }
}

impl From<TransactionReceipt> for Receipt {
    fn from(receipt: TransactionReceipt) -> Self {
        Self {
            hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            status: receipt.status,
            effective_gas_price: receipt.effective_gas_price,
        }
    }
}

#[async_trait]
impl ChainProvider for RpcChainProvider {
    async fn chain_id(&self) -> Result<u64, TxError> {
        Ok(self.eth.chain_id().await?)
    }

    async fn block_number(&self) -> Result<u64, TxError> {
        Ok(self.eth.block_number().await?)
    }

    async fn pending_nonce(&self, address: Address) -> Result<u64, TxError> {
        Ok(self
            .eth
            .get_transaction_count(address, BlockTag::Pending)
            .await?)
    }

    async fn transaction_by_hash(
        &self,
        hash: Hash,
    ) -> Result<Option<PendingTransaction>, TxError> {
        Ok(self
            .eth
            .get_transaction_by_hash(hash)
            .await?
            .map(PendingTransaction::from))
    }

    async fn transaction_receipt(&self, hash: Hash) -> Result<Option<Receipt>, TxError> {
        Ok(self
            .eth
            .get_transaction_receipt(hash)
            .await?
            .map(Receipt::from))
    }

    async fn resolve_cid(&self, cid: &str) -> Result<Option<Hash>, TxError> {
        let lotus = self
            .lotus
            .as_ref()
            .ok_or_else(|| TxError::Provider("no Lotus endpoint configured for CID lookup".into()))?;
        Ok(lotus.eth_tx_hash_by_cid(cid).await?)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<Hash, TxError> {
        Ok(self.eth.send_raw_transaction(raw).await?)
    }

    async fn max_priority_fee(&self) -> Result<U256, TxError> {
        Ok(self.eth.max_priority_fee_per_gas().await?)
    }

    async fn base_fee(&self) -> Result<U256, TxError> {
        Ok(self.eth.latest_base_fee().await?)
    }

    async fn estimate_gas(&self, from: Address, request: &TxRequest) -> Result<u64, TxError> {
        let call = CallRequest {
            from: Some(from),
            to: request.to,
            value: Some(request.value),
            data: (!request.data.is_empty()).then(|| request.data.clone()),
        };
        Ok(self.eth.estimate_gas(&call).await?)
    }
}
