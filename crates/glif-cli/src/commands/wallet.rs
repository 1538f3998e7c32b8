//! `glif wallet ...`

use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use glif_primitives::{format_fil, Address, FilAddress, Network};
use glif_wallet::{migrate_legacy, AgentRole, LocalSigner, MigrationOptions};
use zeroize::Zeroizing;

use crate::cli::WalletCommand;
use crate::context::{glif_home, Context};

/// Legacy plaintext key file, relative to `~/.glif`.
const LEGACY_KEYS_FILE: &str = "keys.toml";

pub async fn run(ctx: &Context, cmd: WalletCommand) -> Result<()> {
    match cmd {
        WalletCommand::New { name } => {
            let passphrase = ctx.passphrase()?;
            let address = ctx
                .keystore()?
                .create(&name, &passphrase)
                .with_context(|| format!("Failed to create account '{name}'"))?;
            println!("{}", account_line(&name, &address, ctx.network()));
        }
        WalletCommand::List => {
            let keystore = ctx.keystore()?;
            let accounts = keystore.list().context("Failed to read account index")?;
            if accounts.is_empty() {
                println!("No accounts in {}", keystore.dir().display());
            }
            for account in accounts {
                println!("{}", account_line(&account.name, &account.address, ctx.network()));
            }
        }
        WalletCommand::Import { name, key_file } => {
            let key_hex = Zeroizing::new(
                fs::read_to_string(&key_file)
                    .with_context(|| format!("Failed to read {}", key_file.display()))?,
            );
            let signer = LocalSigner::from_hex(&key_hex).context("Invalid private key")?;
            let passphrase = ctx.passphrase()?;
            let address = ctx
                .keystore()?
                .import(&name, &signer, &passphrase)
                .with_context(|| format!("Failed to import account '{name}'"))?;
            println!("{}", account_line(&name, &address, ctx.network()));
        }
        WalletCommand::Export { name } => {
            let passphrase = ctx.passphrase()?;
            let key = Zeroizing::new(
                ctx.keystore()?
                    .export(&name, &passphrase)
                    .with_context(|| format!("Failed to export account '{name}'"))?,
            );
            println!("{}", key.as_str());
        }
        WalletCommand::Remove { name } => {
            let entry = ctx
                .keystore()?
                .remove(&name)
                .with_context(|| format!("Failed to remove account '{name}'"))?;
            println!("Removed {} ({:?})", name, entry.address);
        }
        WalletCommand::Balance { name } => {
            let keystore = ctx.keystore()?;
            let accounts = match name {
                Some(name) => {
                    let address = keystore
                        .address_of(&name)
                        .with_context(|| format!("Unknown account '{name}'"))?;
                    vec![(name, address)]
                }
                None => keystore
                    .list()
                    .context("Failed to read account index")?
                    .into_iter()
                    .map(|entry| (entry.name, entry.address))
                    .collect(),
            };

            let provider = ctx.provider()?;
            for (name, address) in accounts {
                let balance = provider
                    .eth()
                    .get_balance(address)
                    .await
                    .with_context(|| format!("Failed to fetch balance of {address:?}"))?;
                println!("{name}\t{} FIL", format_fil(balance));
            }
        }
        WalletCommand::Migrate {
            legacy_file,
            keep_legacy,
        } => {
            let legacy_path = match legacy_file {
                Some(path) => path,
                None => default_legacy_file()?,
            };
            let passphrase = ctx.passphrase()?;
            let report = migrate_legacy(
                &legacy_path,
                &ctx.keystore()?,
                &passphrase,
                MigrationOptions { keep_legacy },
            )
            .with_context(|| format!("Failed to migrate {}", legacy_path.display()))?;

            if report.migrated.is_empty() && report.skipped.is_empty() {
                println!("Nothing to migrate from {}", legacy_path.display());
            }
            for name in &report.migrated {
                println!("Migrated {name}");
            }
            for name in &report.skipped {
                println!("Skipped {name} (already in keystore)");
            }
            if report.legacy_removed {
                println!("Removed {}", legacy_path.display());
            }
        }
    }
    Ok(())
}

fn default_legacy_file() -> Result<PathBuf> {
    Ok(glif_home()?.join(LEGACY_KEYS_FILE))
}

/// `name  0x...  f410f...`, with the agent role marked when the name is one.
fn account_line(name: &str, address: &Address, network: Network) -> String {
    let fil = FilAddress::from_eth_address(address).encode(network);
    match AgentRole::from_account_name(name) {
        Some(role) => format!("{name}\t{address:?}\t{fil}\t[{role}]"),
        None => format!("{name}\t{address:?}\t{fil}"),
    }
}
