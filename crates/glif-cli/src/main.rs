//! glif: command-line client for GLIF Pools.
//!
//! Manages the encrypted keystore and sends, replaces and tracks FEVM
//! transactions against a Lotus node.
//!
//! ## Usage
//!
//! ```bash
//! # Create the agent's owner key
//! GLIF_PASSPHRASE=... glif wallet new owner
//!
//! # Pay 1.5 FIL and wait for the receipt
//! glif tx send --from owner --to f410f... --value 1.5
//!
//! # Bump a stuck transaction by 25%
//! glif tx speed-up 0xabc... --from owner
//! ```

mod cli;
mod commands;
mod context;

use anyhow::{Context as _, Result};
use clap::Parser;
use glif_telemetry::{init_telemetry, op_span, TelemetryConfig};
use tracing::Instrument;

use cli::{Cli, Command};
use context::Context;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _telemetry = init_telemetry(TelemetryConfig::from_env().with_verbosity(cli.verbose))
        .context("Failed to initialize logging")?;

    let ctx = Context::new(cli.global);

    match cli.command {
        Command::Wallet(cmd) => {
            let span = op_span!(cmd.name());
            commands::wallet::run(&ctx, cmd).instrument(span).await
        }
        Command::Tx(cmd) => {
            let span = op_span!(cmd.name());
            commands::tx::run(&ctx, cmd).instrument(span).await
        }
    }
}
