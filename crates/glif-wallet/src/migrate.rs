//! Import of the plaintext `keys.toml` written by older clients.
//!
//! ```toml
//! owner = "0x4c08..."
//! operator = "5b1c..."
//! ```
//!
//! Entries may also sit under a `[keys]` table, alongside or instead of
//! top-level entries. Every key is checked against the keystore before
//! anything is written, so a conflicting name or a passphrase that cannot
//! open a shared key file leaves both files untouched.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use zeroize::Zeroizing;

use crate::keystore::validate_name;
use crate::{Keystore, LocalSigner, WalletError};

/// Table older clients used to group keys under.
const KEYS_TABLE: &str = "keys";

/// Migration switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct MigrationOptions {
    /// Leave the plaintext file in place after a successful migration
    pub keep_legacy: bool,
}

/// What a migration did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Names written to the keystore
    pub migrated: Vec<String>,
    /// Names already present with the same address
    pub skipped: Vec<String>,
    /// Whether the plaintext file was wiped and deleted
    pub legacy_removed: bool,
}

/// Move every key in `legacy_path` into `keystore` under `passphrase`.
///
/// A missing legacy file is not an error; the report is empty.
pub fn migrate_legacy(
    legacy_path: &Path,
    keystore: &Keystore,
    passphrase: &str,
    opts: MigrationOptions,
) -> Result<MigrationReport, WalletError> {
    if !legacy_path.exists() {
        tracing::debug!(path = %legacy_path.display(), "No legacy key file");
        return Ok(MigrationReport::default());
    }
    if passphrase.is_empty() {
        return Err(WalletError::EmptyPassphrase);
    }

    let content = Zeroizing::new(fs::read_to_string(legacy_path)?);
    let entries = parse_legacy(&content)?;
    let expected = entries.len();

    // Plan first: conflicts must surface before any key file is written.
    let mut pending = Vec::new();
    let mut checked = HashSet::new();
    let mut report = MigrationReport::default();
    for (name, signer) in entries {
        match keystore.get(&name)? {
            Some(existing) if existing.address == signer.address() => report.skipped.push(name),
            Some(existing) => {
                return Err(WalletError::NameConflict {
                    name,
                    existing: existing.address,
                    incoming: signer.address(),
                })
            }
            None => {
                if checked.insert(signer.address()) {
                    keystore.check_import(&signer, passphrase)?;
                }
                pending.push((name, signer));
            }
        }
    }

    for (name, signer) in pending {
        keystore.import(&name, &signer, passphrase)?;
        report.migrated.push(name);
    }

    let accounted = report.migrated.len() + report.skipped.len();
    if accounted != expected {
        return Err(WalletError::Legacy(format!(
            "{accounted} of {expected} keys migrated, legacy file kept"
        )));
    }

    if !opts.keep_legacy {
        wipe_file(legacy_path)?;
        report.legacy_removed = true;
    }

    tracing::info!(
        migrated = report.migrated.len(),
        skipped = report.skipped.len(),
        legacy_removed = report.legacy_removed,
        "Legacy keys migrated"
    );
    Ok(report)
}

fn parse_legacy(content: &str) -> Result<Vec<(String, LocalSigner)>, WalletError> {
    let mut table: toml::Table =
        toml::from_str(content).map_err(|e| WalletError::Legacy(e.to_string()))?;

    // A `keys` string is an ordinary entry; only a table is unwrapped.
    let nested = if matches!(table.get(KEYS_TABLE), Some(toml::Value::Table(_))) {
        match table.remove(KEYS_TABLE) {
            Some(toml::Value::Table(keys)) => keys,
            _ => toml::Table::new(),
        }
    } else {
        toml::Table::new()
    };
    for (name, value) in nested {
        if table.contains_key(&name) {
            return Err(WalletError::Legacy(format!(
                "entry '{name}' appears both at top level and under [{KEYS_TABLE}]"
            )));
        }
        table.insert(name, value);
    }

    let mut entries = Vec::new();
    for (name, value) in table {
        let key = Zeroizing::new(match value {
            toml::Value::String(s) => s,
            other => {
                return Err(WalletError::Legacy(format!(
                    "entry '{name}' must be a hex string, found {}",
                    other.type_str()
                )))
            }
        });
        if key.trim().is_empty() {
            continue;
        }
        validate_name(&name)?;
        let signer = LocalSigner::from_hex(&key)
            .map_err(|e| WalletError::Legacy(format!("entry '{name}': {e}")))?;
        entries.push((name, signer));
    }
    Ok(entries)
}

/// Overwrite with zeros, flush, then delete.
fn wipe_file(path: &Path) -> Result<(), WalletError> {
    let len = fs::metadata(path)?.len() as usize;
    {
        let mut file = fs::OpenOptions::new().write(true).open(path)?;
        file.write_all(&vec![0u8; len])?;
        file.sync_all()?;
    }
    fs::remove_file(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_and_nested() {
        let flat = "owner = \"0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318\"\nrequest = \"\"\n";
        let entries = parse_legacy(flat).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "owner");

        let nested = "[keys]\noperator = \"4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318\"\n";
        let entries = parse_legacy(nested).unwrap();
        assert_eq!(entries[0].0, "operator");
    }

    #[test]
    fn test_parse_merges_top_level_and_keys_table() {
        let mixed = "owner = \"0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318\"\n[keys]\noperator = \"8da4ef21b864d2cc526dbdb2a120bd2874c36c9d0a1fb7f8c63d7f7a8b41de8f\"\n";
        let names: Vec<String> = parse_legacy(mixed)
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["operator".to_string(), "owner".to_string()]);

        let duplicate = "owner = \"0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318\"\n[keys]\nowner = \"8da4ef21b864d2cc526dbdb2a120bd2874c36c9d0a1fb7f8c63d7f7a8b41de8f\"\n";
        assert!(matches!(parse_legacy(duplicate), Err(WalletError::Legacy(_))));
    }

    #[test]
    fn test_parse_keeps_string_named_keys() {
        let entries = parse_legacy(
            "keys = \"0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318\"\n",
        )
        .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "keys");
    }

    #[test]
    fn test_parse_rejects_bad_entries() {
        assert!(matches!(parse_legacy("owner = 5"), Err(WalletError::Legacy(_))));
        assert!(matches!(parse_legacy("owner = \"0x1234\""), Err(WalletError::Legacy(_))));
    }
}
