//! Wallet error types.

use glif_primitives::Address;
use thiserror::Error;

/// Keystore and signing errors.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Account name outside `[A-Za-z0-9_-]{1,64}`
    #[error("Invalid account name '{0}': use 1-64 letters, digits, '-' or '_'")]
    InvalidName(String),

    /// Account not present in the index
    #[error("Account '{0}' not found")]
    AccountNotFound(String),

    /// Name already taken
    #[error("Account '{0}' already exists")]
    AccountExists(String),

    /// Name already bound to a different key
    #[error("Account '{name}' already holds {existing:?}, refusing to replace it with {incoming:?}")]
    NameConflict {
        name: String,
        existing: Address,
        incoming: Address,
    },

    /// Decryption failed the MAC check
    #[error("Wrong passphrase")]
    WrongPassphrase,

    /// Empty passphrases are not accepted
    #[error("Passphrase must not be empty")]
    EmptyPassphrase,

    /// Decrypted key does not belong to the indexed address
    #[error("Key file holds {actual:?} but the index expects {expected:?}")]
    AddressMismatch { expected: Address, actual: Address },

    /// Private key bytes are not a valid secp256k1 scalar
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Signature could not be produced or recovered
    #[error("Signature error: {0}")]
    Signature(String),

    /// Key file encryption or decryption failure
    #[error("Keystore error: {0}")]
    Keystore(String),

    /// `accounts.toml` could not be read or written
    #[error("Account index error: {0}")]
    Index(String),

    /// Legacy `keys.toml` is malformed
    #[error("Legacy key file error: {0}")]
    Legacy(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<eth_keystore::KeystoreError> for WalletError {
    fn from(err: eth_keystore::KeystoreError) -> Self {
        match err {
            eth_keystore::KeystoreError::MacMismatch => WalletError::WrongPassphrase,
            other => WalletError::Keystore(other.to_string()),
        }
    }
}
