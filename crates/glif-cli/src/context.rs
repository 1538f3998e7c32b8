//! Shared command state: keystore, passphrase and node access.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context as _, Result};
use glif_primitives::Network;
use glif_rpc::RpcConfig;
use glif_tx::{ChainProvider, RpcChainProvider};
use glif_wallet::{Keystore, LocalSigner};
use zeroize::Zeroizing;

use crate::cli::GlobalArgs;

/// Passphrase environment variable.
pub const PASSPHRASE_ENV: &str = "GLIF_PASSPHRASE";

/// Resolved settings for one invocation.
pub struct Context {
    args: GlobalArgs,
}

impl Context {
    pub fn new(args: GlobalArgs) -> Self {
        Self { args }
    }

    pub fn network(&self) -> Network {
        self.args.network
    }

    /// `--keystore-dir`, or `~/.glif/keystore`.
    pub fn keystore_dir(&self) -> Result<PathBuf> {
        match &self.args.keystore_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(glif_home()?.join("keystore")),
        }
    }

    pub fn keystore(&self) -> Result<Keystore> {
        let dir = self.keystore_dir()?;
        Keystore::open(&dir).with_context(|| format!("Failed to open keystore {}", dir.display()))
    }

    /// Passphrase from `--passphrase-file` or `GLIF_PASSPHRASE`.
    pub fn passphrase(&self) -> Result<Zeroizing<String>> {
        resolve_passphrase(
            self.args.passphrase_file.as_deref(),
            std::env::var(PASSPHRASE_ENV).ok().map(Zeroizing::new),
        )
    }

    /// Decrypt the key stored as `name`.
    pub fn signer(&self, name: &str) -> Result<LocalSigner> {
        let passphrase = self.passphrase()?;
        self.keystore()?
            .unlock(name, &passphrase)
            .with_context(|| format!("Failed to unlock account '{name}'"))
    }

    pub fn rpc_config(&self) -> RpcConfig {
        RpcConfig {
            eth_url: self.args.eth_rpc_url.clone(),
            lotus_url: self
                .args
                .lotus_rpc_url
                .clone()
                .unwrap_or_else(|| self.args.eth_rpc_url.clone()),
            lotus_token: self.args.lotus_token.clone(),
            timeout: Duration::from_secs(self.args.rpc_timeout),
        }
    }

    pub fn provider(&self) -> Result<Arc<RpcChainProvider>> {
        let config = self.rpc_config();
        config.validate().context("Invalid RPC settings")?;
        Ok(Arc::new(
            RpcChainProvider::from_config(&config).context("Failed to build RPC clients")?,
        ))
    }

    /// Fail if the node serves a different chain than `--network`.
    pub async fn check_network<P: ChainProvider>(&self, provider: &P) -> Result<()> {
        let chain_id = provider
            .chain_id()
            .await
            .context("Failed to query chain id")?;
        let expected = self.network().chain_id();
        if chain_id != expected {
            bail!(
                "Node reports chain id {chain_id} but --network {} expects {expected}",
                self.network()
            );
        }
        Ok(())
    }
}

/// `~/.glif`.
pub fn glif_home() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Cannot determine home directory")?;
    Ok(home.join(".glif"))
}

/// File wins over the environment; only the first line of the file is used.
pub fn resolve_passphrase(
    file: Option<&Path>,
    env_value: Option<Zeroizing<String>>,
) -> Result<Zeroizing<String>> {
    let passphrase = match (file, env_value) {
        (Some(path), _) => {
            let content = Zeroizing::new(
                fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
            );
            Zeroizing::new(content.lines().next().unwrap_or_default().to_string())
        }
        (None, Some(value)) => value,
        (None, None) => bail!("No passphrase: set {PASSPHRASE_ENV} or pass --passphrase-file"),
    };
    if passphrase.is_empty() {
        bail!("Passphrase is empty");
    }
    Ok(passphrase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_passphrase_from_file_first_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hunter2\nignored").unwrap();

        let passphrase = resolve_passphrase(Some(file.path()), None).unwrap();
        assert_eq!(passphrase.as_str(), "hunter2");
    }

    #[test]
    fn test_file_wins_over_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "from-file").unwrap();

        let passphrase =
            resolve_passphrase(Some(file.path()), Some(Zeroizing::new("from-env".into()))).unwrap();
        assert_eq!(passphrase.as_str(), "from-file");
    }

    #[test]
    fn test_missing_or_empty_passphrase() {
        assert!(resolve_passphrase(None, None).is_err());
        assert!(resolve_passphrase(None, Some(Zeroizing::new(String::new()))).is_err());
        assert_eq!(
            resolve_passphrase(None, Some(Zeroizing::new("env".into())))
                .unwrap()
                .as_str(),
            "env"
        );
    }
}
