//! Adapters: JSON-RPC chain access and local key signing.

pub mod rpc;
pub mod signer;

pub use rpc::RpcChainProvider;
