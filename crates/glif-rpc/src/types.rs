//! JSON-RPC response and request types.

use glif_primitives::{quantity, Address, Bytes, Hash, U256};
use serde::{Deserialize, Serialize, Serializer};

/// Block selector for state queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockTag {
    #[default]
    Latest,
    Pending,
    Earliest,
    Number(u64),
}

impl Serialize for BlockTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BlockTag::Latest => serializer.serialize_str("latest"),
            BlockTag::Pending => serializer.serialize_str("pending"),
            BlockTag::Earliest => serializer.serialize_str("earliest"),
            BlockTag::Number(n) => serializer.serialize_str(&quantity::to_hex(*n)),
        }
    }
}

/// Transaction as returned by `eth_getTransactionByHash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthTransaction {
    pub hash: Hash,
    #[serde(with = "quantity")]
    pub nonce: u64,
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
    pub value: U256,
    #[serde(with = "quantity")]
    pub gas: u64,
    #[serde(default)]
    pub gas_price: Option<U256>,
    #[serde(default)]
    pub max_fee_per_gas: Option<U256>,
    #[serde(default)]
    pub max_priority_fee_per_gas: Option<U256>,
    #[serde(default)]
    pub input: Bytes,
    #[serde(default, with = "quantity::opt")]
    pub chain_id: Option<u64>,
    #[serde(default)]
    pub block_hash: Option<Hash>,
    /// `None` while the transaction is still pending
    #[serde(default, with = "quantity::opt")]
    pub block_number: Option<u64>,
}

impl EthTransaction {
    pub fn is_pending(&self) -> bool {
        self.block_number.is_none()
    }
}

/// Receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: Hash,
    #[serde(with = "quantity")]
    pub block_number: u64,
    pub block_hash: Hash,
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
    /// 1 = success, 0 = reverted
    #[serde(with = "quantity")]
    pub status: u64,
    pub gas_used: U256,
    #[serde(default)]
    pub effective_gas_price: Option<U256>,
    #[serde(default)]
    pub contract_address: Option<Address>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status == 1
    }
}

/// Fields of `eth_getBlockByNumber` the client uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    #[serde(with = "quantity")]
    pub number: u64,
    #[serde(default)]
    pub hash: Option<Hash>,
    #[serde(with = "quantity")]
    pub timestamp: u64,
    #[serde(default)]
    pub base_fee_per_gas: Option<U256>,
}

/// Call object for `eth_estimateGas`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
}

/// Result of `Filecoin.Version`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LotusVersion {
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "APIVersion")]
    pub api_version: u64,
    #[serde(rename = "BlockDelay")]
    pub block_delay: u64,
}
