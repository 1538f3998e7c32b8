//! # GLIF RPC
//!
//! JSON-RPC 2.0 clients for a Lotus node.
//!
//! - [`EthClient`]: the `eth_*` namespace served on `/rpc/v1`
//! - [`LotusClient`]: the `Filecoin.*` methods needed to map message CIDs
//!   to Ethereum transaction hashes
//!
//! Both share one [`RpcTransport`], which owns the HTTP client, the optional
//! bearer token and the request id counter.

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod eth;
pub mod lotus;
pub mod transport;
pub mod types;

pub use config::RpcConfig;
pub use error::RpcError;
pub use eth::EthClient;
pub use lotus::LotusClient;
pub use transport::RpcTransport;
pub use types::{
    BlockHeader, BlockTag, CallRequest, EthTransaction, LotusVersion, TransactionReceipt,
};
