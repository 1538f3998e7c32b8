//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use glif_primitives::Network;
use glif_rpc::config::DEFAULT_RPC_URL;
use glif_tx::REPLACE_BY_FEE_DEFAULT;

/// GLIF Pools command-line client
#[derive(Parser, Debug)]
#[command(name = "glif")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Endpoint, keystore and network settings shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Ethereum JSON-RPC endpoint
    #[arg(long, env = "GLIF_ETH_RPC_URL", default_value = DEFAULT_RPC_URL, global = true)]
    pub eth_rpc_url: String,

    /// Lotus JSON-RPC endpoint (defaults to the Ethereum endpoint)
    #[arg(long, env = "GLIF_LOTUS_RPC_URL", global = true)]
    pub lotus_rpc_url: Option<String>,

    /// Lotus API token
    #[arg(long, env = "GLIF_LOTUS_TOKEN", hide_env_values = true, global = true)]
    pub lotus_token: Option<String>,

    /// Keystore directory [default: ~/.glif/keystore]
    #[arg(long, env = "GLIF_KEYSTORE_DIR", global = true)]
    pub keystore_dir: Option<PathBuf>,

    /// Filecoin network (mainnet or calibnet)
    #[arg(long, env = "GLIF_NETWORK", default_value = "mainnet", global = true)]
    pub network: Network,

    /// Read the keystore passphrase from this file instead of GLIF_PASSPHRASE
    #[arg(long, global = true)]
    pub passphrase_file: Option<PathBuf>,

    /// RPC request timeout in seconds
    #[arg(long, default_value = "30", global = true)]
    pub rpc_timeout: u64,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage keys in the encrypted keystore
    #[command(subcommand)]
    Wallet(WalletCommand),

    /// Send, replace and track transactions
    #[command(subcommand)]
    Tx(TxCommand),
}

#[derive(Subcommand, Debug)]
pub enum WalletCommand {
    /// Generate a new key
    New {
        /// Account name (owner, operator, request, ...)
        name: String,
    },

    /// List accounts
    List,

    /// Import a hex private key from a file
    Import {
        name: String,

        /// File containing the hex private key
        #[arg(long)]
        key_file: PathBuf,
    },

    /// Print an account's private key
    Export { name: String },

    /// Remove an account
    Remove { name: String },

    /// Show balances (all accounts when no name is given)
    Balance { name: Option<String> },

    /// Move keys from the plaintext keys.toml into the keystore
    Migrate {
        /// Legacy key file [default: ~/.glif/keys.toml]
        #[arg(long)]
        legacy_file: Option<PathBuf>,

        /// Leave the legacy file in place
        #[arg(long)]
        keep_legacy: bool,
    },
}

impl WalletCommand {
    pub fn name(&self) -> &'static str {
        match self {
            WalletCommand::New { .. } => "wallet_new",
            WalletCommand::List => "wallet_list",
            WalletCommand::Import { .. } => "wallet_import",
            WalletCommand::Export { .. } => "wallet_export",
            WalletCommand::Remove { .. } => "wallet_remove",
            WalletCommand::Balance { .. } => "wallet_balance",
            WalletCommand::Migrate { .. } => "wallet_migrate",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum TxCommand {
    /// Send FIL
    Send {
        /// Sending account name
        #[arg(long)]
        from: String,

        /// Recipient (0x, f410 or f0 address)
        #[arg(long)]
        to: String,

        /// Amount in FIL
        #[arg(long)]
        value: String,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Resend a pending transaction with higher fees
    SpeedUp(ReplaceArgs),

    /// Replace a pending transaction with an empty self-transfer
    Cancel(ReplaceArgs),

    /// Wait for a transaction receipt
    Wait {
        /// Transaction hash or message CID
        tx: String,

        #[command(flatten)]
        wait: WaitArgs,
    },
}

impl TxCommand {
    pub fn name(&self) -> &'static str {
        match self {
            TxCommand::Send { .. } => "tx_send",
            TxCommand::SpeedUp(_) => "tx_speed_up",
            TxCommand::Cancel(_) => "tx_cancel",
            TxCommand::Wait { .. } => "tx_wait",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ReplaceArgs {
    /// Transaction hash or message CID
    pub tx: String,

    /// Account that sent the transaction
    #[arg(long)]
    pub from: String,

    /// Fee bump in percent (at least 110)
    #[arg(long, default_value_t = REPLACE_BY_FEE_DEFAULT)]
    pub ratio: u64,

    /// Refuse to pay a max fee per gas above this many attoFIL
    #[arg(long)]
    pub max_fee: Option<String>,

    /// Explicit priority fee per gas in attoFIL
    #[arg(long)]
    pub priority_fee: Option<String>,

    /// Gas limit for the cancel transfer
    #[arg(long)]
    pub gas_limit: Option<u64>,

    #[command(flatten)]
    pub wait: WaitArgs,
}

#[derive(Args, Debug, Clone)]
pub struct WaitArgs {
    /// Return after broadcasting
    #[arg(long)]
    pub no_wait: bool,

    /// Give up waiting after this many seconds
    #[arg(long, default_value = "600")]
    pub timeout: u64,

    /// Blocks to wait after inclusion
    #[arg(long, default_value = "1")]
    pub confirmations: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("glif").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_wallet_commands_parse() {
        let cli = parse(&["wallet", "import", "owner", "--key-file", "/tmp/k"]);
        match cli.command {
            Command::Wallet(WalletCommand::Import { name, key_file }) => {
                assert_eq!(name, "owner");
                assert_eq!(key_file, PathBuf::from("/tmp/k"));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = parse(&["wallet", "migrate", "--keep-legacy"]);
        assert!(matches!(
            cli.command,
            Command::Wallet(WalletCommand::Migrate { keep_legacy: true, legacy_file: None })
        ));
    }

    #[test]
    fn test_replace_defaults() {
        let cli = parse(&["tx", "speed-up", "0xabc", "--from", "owner"]);
        match cli.command {
            Command::Tx(TxCommand::SpeedUp(args)) => {
                assert_eq!(args.ratio, REPLACE_BY_FEE_DEFAULT);
                assert_eq!(args.from, "owner");
                assert!(args.max_fee.is_none());
                assert!(!args.wait.no_wait);
                assert_eq!(args.wait.timeout, 600);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&[
            "tx",
            "send",
            "--from",
            "owner",
            "--to",
            "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23",
            "--value",
            "1.5",
            "--network",
            "calibnet",
            "--no-wait",
            "-vv",
        ]);
        assert_eq!(cli.global.network, Network::Calibration);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Command::Tx(TxCommand::Send { ref wait, .. }) if wait.no_wait
        ));
    }

    #[test]
    fn test_unknown_network_rejected() {
        let result = Cli::try_parse_from(["glif", "--network", "devnet", "wallet", "list"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_command_names() {
        let cli = parse(&["tx", "wait", "0xabc"]);
        match cli.command {
            Command::Tx(cmd) => assert_eq!(cmd.name(), "tx_wait"),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
