//! # Encrypted Keystore
//!
//! A directory of Web3 Secret Storage v3 key files plus `accounts.toml`,
//! which maps account names to addresses and key files:
//!
//! ```toml
//! [accounts.owner]
//! address = "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23"
//! file = "UTC--2024-05-01T12-00-00.000000000Z--2c7536e3605d9c16a7a3d7b1898e529396a65c23"
//! ```
//!
//! Several names may point at the same key file.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use glif_primitives::Address;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::{LocalSigner, WalletError};

/// Index file name inside the keystore directory.
pub const INDEX_FILE: &str = "accounts.toml";

const MAX_NAME_LEN: usize = 64;

/// One named account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEntry {
    #[serde(skip)]
    pub name: String,
    pub address: Address,
    /// Key file name, relative to the keystore directory
    pub file: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountIndex {
    #[serde(default)]
    accounts: BTreeMap<String, AccountEntry>,
}

/// Handle to a keystore directory.
#[derive(Debug, Clone)]
pub struct Keystore {
    dir: PathBuf,
}

impl Keystore {
    /// Open `dir`, creating it (mode 0700 on unix) if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, WalletError> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            restrict_permissions(&dir, 0o700)?;
            tracing::debug!(dir = %dir.display(), "Created keystore directory");
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Generate a key, encrypt it under `passphrase` and record it as `name`.
    pub fn create(&self, name: &str, passphrase: &str) -> Result<Address, WalletError> {
        let signer = LocalSigner::generate();
        self.import(name, &signer, passphrase)
    }

    /// Encrypt `signer` under `passphrase` and record it as `name`.
    ///
    /// If another account already holds the same address its key file is
    /// reused, and `passphrase` must unlock it.
    pub fn import(
        &self,
        name: &str,
        signer: &LocalSigner,
        passphrase: &str,
    ) -> Result<Address, WalletError> {
        validate_name(name)?;
        if passphrase.is_empty() {
            return Err(WalletError::EmptyPassphrase);
        }

        let mut index = self.load_index()?;
        if index.accounts.contains_key(name) {
            return Err(WalletError::AccountExists(name.to_string()));
        }

        let address = signer.address();
        let shared = index
            .accounts
            .values()
            .find(|entry| entry.address == address)
            .map(|entry| entry.file.clone());

        let file = match shared {
            Some(file) => {
                self.decrypt_file(&file, address, passphrase)?;
                file
            }
            None => self.write_key_file(signer, passphrase)?,
        };

        index.accounts.insert(
            name.to_string(),
            AccountEntry {
                name: name.to_string(),
                address,
                file,
            },
        );
        self.save_index(&index)?;

        tracing::info!(name, address = ?address, "Account stored");
        Ok(address)
    }

    /// Check that [`import`](Self::import) of `signer` under `passphrase`
    /// would not fail on an existing key file for the same address.
    pub fn check_import(&self, signer: &LocalSigner, passphrase: &str) -> Result<(), WalletError> {
        if passphrase.is_empty() {
            return Err(WalletError::EmptyPassphrase);
        }
        let address = signer.address();
        let index = self.load_index()?;
        if let Some(entry) = index.accounts.values().find(|entry| entry.address == address) {
            self.decrypt_file(&entry.file, address, passphrase)?;
        }
        Ok(())
    }

    /// Decrypt the key for `name`.
    pub fn unlock(&self, name: &str, passphrase: &str) -> Result<LocalSigner, WalletError> {
        let entry = self.entry(name)?;
        self.decrypt_file(&entry.file, entry.address, passphrase)
    }

    /// Decrypt the key for `name` and return it as hex.
    pub fn export(&self, name: &str, passphrase: &str) -> Result<String, WalletError> {
        Ok(self.unlock(name, passphrase)?.to_hex())
    }

    /// Forget `name`; its key file is deleted once no other name uses it.
    pub fn remove(&self, name: &str) -> Result<AccountEntry, WalletError> {
        let mut index = self.load_index()?;
        let entry = index
            .accounts
            .remove(name)
            .ok_or_else(|| WalletError::AccountNotFound(name.to_string()))?;
        self.save_index(&index)?;

        let still_used = index.accounts.values().any(|e| e.file == entry.file);
        if !still_used {
            let path = self.dir.join(&entry.file);
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }

        tracing::info!(name, address = ?entry.address, "Account removed");
        Ok(entry)
    }

    /// All accounts, sorted by name.
    pub fn list(&self) -> Result<Vec<AccountEntry>, WalletError> {
        Ok(self.load_index()?.accounts.into_values().collect())
    }

    /// Address recorded for `name`.
    pub fn address_of(&self, name: &str) -> Result<Address, WalletError> {
        Ok(self.entry(name)?.address)
    }

    /// Recorded entry for `name`, if any.
    pub fn get(&self, name: &str) -> Result<Option<AccountEntry>, WalletError> {
        Ok(self.load_index()?.accounts.remove(name))
    }

    fn entry(&self, name: &str) -> Result<AccountEntry, WalletError> {
        self.get(name)?
            .ok_or_else(|| WalletError::AccountNotFound(name.to_string()))
    }

    fn decrypt_file(
        &self,
        file: &str,
        expected: Address,
        passphrase: &str,
    ) -> Result<LocalSigner, WalletError> {
        let mut secret = eth_keystore::decrypt_key(self.dir.join(file), passphrase)?;
        let signer = LocalSigner::from_bytes(&secret);
        secret.zeroize();
        let signer = signer?;

        if signer.address() != expected {
            return Err(WalletError::AddressMismatch {
                expected,
                actual: signer.address(),
            });
        }
        Ok(signer)
    }

    fn write_key_file(&self, signer: &LocalSigner, passphrase: &str) -> Result<String, WalletError> {
        let file = key_file_name(signer.address());
        let mut secret = signer.to_bytes();
        let result = eth_keystore::encrypt_key(
            &self.dir,
            &mut rand::thread_rng(),
            secret,
            passphrase,
            Some(file.as_str()),
        );
        secret.zeroize();
        result?;

        restrict_permissions(&self.dir.join(&file), 0o600)?;
        Ok(file)
    }

    fn load_index(&self) -> Result<AccountIndex, WalletError> {
        let path = self.dir.join(INDEX_FILE);
        if !path.exists() {
            return Ok(AccountIndex::default());
        }
        let content = fs::read_to_string(&path)?;
        let mut index: AccountIndex = toml::from_str(&content)
            .map_err(|e| WalletError::Index(format!("{}: {e}", path.display())))?;
        for (name, entry) in index.accounts.iter_mut() {
            entry.name = name.clone();
        }
        Ok(index)
    }

    fn save_index(&self, index: &AccountIndex) -> Result<(), WalletError> {
        let content = toml::to_string_pretty(index).map_err(|e| WalletError::Index(e.to_string()))?;
        let tmp = self.dir.join(format!(".{INDEX_FILE}.tmp"));
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        restrict_permissions(&tmp, 0o600)?;
        fs::rename(&tmp, self.dir.join(INDEX_FILE))?;
        Ok(())
    }
}

/// Check `name` against `[A-Za-z0-9_-]{1,64}`.
pub fn validate_name(name: &str) -> Result<(), WalletError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(WalletError::InvalidName(name.to_string()))
    }
}

/// geth-style key file name: `UTC--<timestamp>--<address>`.
fn key_file_name(address: Address) -> String {
    format!(
        "UTC--{}--{}",
        Utc::now().format("%Y-%m-%dT%H-%M-%S%.9fZ"),
        hex::encode(address)
    )
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) -> Result<(), WalletError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) -> Result<(), WalletError> {
    Ok(())
}
