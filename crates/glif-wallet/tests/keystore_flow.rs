//! Keystore and migration behavior against a real temporary directory.

use std::fs;

use glif_wallet::{
    migrate_legacy, Keystore, LocalSigner, MigrationOptions, WalletError,
};
use tempfile::TempDir;

const KEY_A: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
const KEY_B: &str = "0x8da4ef21b864d2cc526dbdb2a120bd2874c36c9d0a1fb7f8c63d7f7a8b41de8f";
const PASS: &str = "correct horse";

fn keystore() -> (TempDir, Keystore) {
    let dir = TempDir::new().unwrap();
    let keystore = Keystore::open(dir.path().join("keystore")).unwrap();
    (dir, keystore)
}

#[test]
fn test_create_unlock_export() {
    let (_dir, keystore) = keystore();

    let address = keystore.create("owner", PASS).unwrap();
    assert_eq!(keystore.address_of("owner").unwrap(), address);

    let signer = keystore.unlock("owner", PASS).unwrap();
    assert_eq!(signer.address(), address);

    let exported = keystore.export("owner", PASS).unwrap();
    assert_eq!(LocalSigner::from_hex(&exported).unwrap().address(), address);
}

#[test]
fn test_wrong_passphrase() {
    let (_dir, keystore) = keystore();
    keystore.create("owner", PASS).unwrap();

    let err = keystore.unlock("owner", "wrong").unwrap_err();
    assert!(matches!(err, WalletError::WrongPassphrase));
}

#[test]
fn test_names_unique_and_validated() {
    let (_dir, keystore) = keystore();
    keystore.create("owner", PASS).unwrap();

    assert!(matches!(
        keystore.create("owner", PASS),
        Err(WalletError::AccountExists(_))
    ));
    assert!(matches!(
        keystore.create("bad name", PASS),
        Err(WalletError::InvalidName(_))
    ));
    assert!(matches!(
        keystore.create("operator", ""),
        Err(WalletError::EmptyPassphrase)
    ));
}

#[test]
fn test_shared_key_file() {
    let (_dir, keystore) = keystore();
    let signer = LocalSigner::from_hex(KEY_A).unwrap();

    keystore.import("owner", &signer, PASS).unwrap();
    keystore.import("operator", &signer, PASS).unwrap();

    let accounts = keystore.list().unwrap();
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0].file, accounts[1].file);
    assert_eq!(accounts[0].name, "operator");

    // Removing one name keeps the file for the other.
    keystore.remove("owner").unwrap();
    assert_eq!(
        keystore.unlock("operator", PASS).unwrap().address(),
        signer.address()
    );

    let removed = keystore.remove("operator").unwrap();
    assert!(!keystore.dir().join(&removed.file).exists());
    assert!(matches!(
        keystore.unlock("operator", PASS),
        Err(WalletError::AccountNotFound(_))
    ));
}

#[test]
fn test_address_mismatch_detected() {
    let (_dir, keystore) = keystore();
    let a = LocalSigner::from_hex(KEY_A).unwrap();
    let b = LocalSigner::from_hex(KEY_B).unwrap();
    keystore.import("owner", &a, PASS).unwrap();
    keystore.import("operator", &b, PASS).unwrap();

    // Point "owner" at operator's key file.
    let index_path = keystore.dir().join("accounts.toml");
    let accounts = keystore.list().unwrap();
    let index = fs::read_to_string(&index_path).unwrap();
    let tampered = index.replace(&accounts[1].file, &accounts[0].file);
    fs::write(&index_path, tampered).unwrap();

    let err = keystore.unlock("owner", PASS).unwrap_err();
    assert!(matches!(err, WalletError::AddressMismatch { .. }));
}

#[cfg(unix)]
#[test]
fn test_directory_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, keystore) = keystore();
    let mode = fs::metadata(keystore.dir()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o700);
}

#[test]
fn test_migrate_legacy_is_idempotent() {
    let (dir, keystore) = keystore();
    let legacy = dir.path().join("keys.toml");
    fs::write(
        &legacy,
        format!("owner = \"{KEY_A}\"\noperator = \"{KEY_B}\"\nrequest = \"\"\n"),
    )
    .unwrap();

    let report = migrate_legacy(&legacy, &keystore, PASS, MigrationOptions::default()).unwrap();
    assert_eq!(report.migrated, vec!["operator".to_string(), "owner".to_string()]);
    assert!(report.skipped.is_empty());
    assert!(report.legacy_removed);
    assert!(!legacy.exists());

    let again = migrate_legacy(&legacy, &keystore, PASS, MigrationOptions::default()).unwrap();
    assert!(again.migrated.is_empty());
    assert!(!again.legacy_removed);

    assert_eq!(
        keystore.unlock("owner", PASS).unwrap().address(),
        LocalSigner::from_hex(KEY_A).unwrap().address()
    );
}

#[test]
fn test_migrate_skips_existing_and_keeps_legacy() {
    let (dir, keystore) = keystore();
    keystore
        .import("owner", &LocalSigner::from_hex(KEY_A).unwrap(), PASS)
        .unwrap();

    let legacy = dir.path().join("keys.toml");
    fs::write(&legacy, format!("owner = \"{KEY_A}\"\n")).unwrap();

    let report = migrate_legacy(
        &legacy,
        &keystore,
        PASS,
        MigrationOptions { keep_legacy: true },
    )
    .unwrap();
    assert_eq!(report.skipped, vec!["owner".to_string()]);
    assert!(report.migrated.is_empty());
    assert!(legacy.exists());
}

#[test]
fn test_migrate_conflict_writes_nothing() {
    let (dir, keystore) = keystore();
    keystore
        .import("owner", &LocalSigner::from_hex(KEY_A).unwrap(), PASS)
        .unwrap();

    let legacy = dir.path().join("keys.toml");
    let content = format!("aaa = \"{KEY_B}\"\nowner = \"{KEY_B}\"\n");
    fs::write(&legacy, &content).unwrap();

    let err = migrate_legacy(&legacy, &keystore, PASS, MigrationOptions::default()).unwrap_err();
    assert!(matches!(err, WalletError::NameConflict { .. }));

    // "aaa" sorts first but must not have been written.
    assert!(keystore.get("aaa").unwrap().is_none());
    assert_eq!(fs::read_to_string(&legacy).unwrap(), content);
}

#[test]
fn test_migrate_mixed_layout_keeps_every_key() {
    let (dir, keystore) = keystore();
    let legacy = dir.path().join("keys.toml");
    fs::write(
        &legacy,
        format!("owner = \"{KEY_A}\"\n[keys]\noperator = \"{KEY_B}\"\n"),
    )
    .unwrap();

    let report = migrate_legacy(&legacy, &keystore, PASS, MigrationOptions::default()).unwrap();
    assert_eq!(report.migrated, vec!["operator".to_string(), "owner".to_string()]);
    assert!(report.legacy_removed);

    assert_eq!(
        keystore.unlock("owner", PASS).unwrap().address(),
        LocalSigner::from_hex(KEY_A).unwrap().address()
    );
    assert_eq!(
        keystore.unlock("operator", PASS).unwrap().address(),
        LocalSigner::from_hex(KEY_B).unwrap().address()
    );
}

#[test]
fn test_migrate_entry_named_keys() {
    let (dir, keystore) = keystore();
    let legacy = dir.path().join("keys.toml");
    fs::write(&legacy, format!("keys = \"{KEY_A}\"\n")).unwrap();

    let report = migrate_legacy(&legacy, &keystore, PASS, MigrationOptions::default()).unwrap();
    assert_eq!(report.migrated, vec!["keys".to_string()]);
    assert_eq!(
        keystore.address_of("keys").unwrap(),
        LocalSigner::from_hex(KEY_A).unwrap().address()
    );
}

#[test]
fn test_migrate_duplicate_across_layouts_keeps_file() {
    let (dir, keystore) = keystore();
    let legacy = dir.path().join("keys.toml");
    let content = format!("owner = \"{KEY_A}\"\n[keys]\nowner = \"{KEY_B}\"\n");
    fs::write(&legacy, &content).unwrap();

    let err = migrate_legacy(&legacy, &keystore, PASS, MigrationOptions::default()).unwrap_err();
    assert!(matches!(err, WalletError::Legacy(_)));
    assert!(keystore.list().unwrap().is_empty());
    assert_eq!(fs::read_to_string(&legacy).unwrap(), content);
}

#[test]
fn test_migrate_shared_key_wrong_passphrase_writes_nothing() {
    let (dir, keystore) = keystore();
    keystore
        .import("zzz", &LocalSigner::from_hex(KEY_B).unwrap(), "other")
        .unwrap();

    let legacy = dir.path().join("keys.toml");
    let content = format!("aaa = \"{KEY_A}\"\nbbb = \"{KEY_B}\"\n");
    fs::write(&legacy, &content).unwrap();

    let err = migrate_legacy(&legacy, &keystore, PASS, MigrationOptions::default()).unwrap_err();
    assert!(matches!(err, WalletError::WrongPassphrase));

    assert!(keystore.get("aaa").unwrap().is_none());
    assert!(keystore.get("bbb").unwrap().is_none());
    assert_eq!(fs::read_to_string(&legacy).unwrap(), content);
}
