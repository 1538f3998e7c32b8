//! # GLIF Primitives
//!
//! Value types shared by every crate in the client workspace.
//!
//! ## Contents
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `types` | `Address`, `Hash`, `U256`, hex `Bytes` |
//! | `quantity` | serde helpers for JSON-RPC hex quantities |
//! | `units` | FIL / attoFIL conversion and formatting |
//! | `network` | Filecoin networks (mainnet, calibration) |
//! | `filaddr` | Filecoin address parsing and Ethereum mapping |
//! | `txid` | User-supplied transaction references (hash or CID) |

#![warn(clippy::all)]

pub mod errors;
pub mod filaddr;
pub mod network;
pub mod quantity;
pub mod txid;
pub mod types;
pub mod units;

pub use errors::PrimitivesError;
pub use filaddr::{parse_address, FilAddress, EAM_NAMESPACE};
pub use network::Network;
pub use txid::TxId;
pub use types::{Address, Bytes, Hash, U256};
pub use units::{format_fil, format_nano_fil, parse_fil, ATTO_PER_FIL};
