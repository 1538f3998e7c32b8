//! # GLIF Wallet
//!
//! Local secp256k1 keys and their encrypted storage.
//!
//! ## Modules
//!
//! - `signer`: [`LocalSigner`], recoverable signatures over 32-byte digests
//! - `keystore`: [`Keystore`], a directory of Web3 Secret Storage v3 files
//!   plus an `accounts.toml` index of account names
//! - `migrate`: one-shot import of the plaintext `keys.toml` used by older
//!   clients
//! - `roles`: the account names the pool agent expects
//!
//! ## Security
//!
//! - Secret keys are erased when a [`LocalSigner`] is dropped
//! - Key files are encrypted with scrypt + AES-128-CTR
//! - The keystore directory is created with mode 0700 on unix

#![warn(clippy::all)]

pub mod errors;
pub mod keystore;
pub mod migrate;
pub mod roles;
pub mod signer;

pub use errors::WalletError;
pub use keystore::{AccountEntry, Keystore};
pub use migrate::{migrate_legacy, MigrationOptions, MigrationReport};
pub use roles::AgentRole;
pub use signer::{recover_address, LocalSigner, RecoverableSignature};
