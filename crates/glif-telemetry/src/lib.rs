//! # GLIF Telemetry
//!
//! Structured logging for the client.
//!
//! Command output goes to stdout; everything emitted through `tracing` goes
//! to stderr so it never mixes with results a script may be parsing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use glif_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GLIF_LOG_LEVEL` / `RUST_LOG` | `warn` | Filter directive |
//! | `GLIF_JSON_LOGS` | `false` | One JSON object per line |
//! | `GLIF_LOG_TARGETS` | `false` | Include module targets |

mod config;
mod subscriber;

pub use config::TelemetryConfig;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter '{directive}': {reason}")]
    InvalidFilter { directive: String, reason: String },

    #[error("A global tracing subscriber is already installed")]
    AlreadyInitialized,
}

/// Install the global subscriber described by `config`.
///
/// Returns a guard to hold for the lifetime of the process.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    subscriber::install(&config)?;
    tracing::debug!(
        level = %config.log_level,
        json = config.json_logs,
        "Telemetry initialized"
    );
    Ok(TelemetryGuard { _config: config })
}

/// Keeps telemetry alive; logs shutdown when dropped.
pub struct TelemetryGuard {
    _config: TelemetryConfig,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::trace!("Shutting down telemetry");
    }
}

/// Span tagged with the client operation being run.
///
/// ```rust,ignore
/// let _span = glif_telemetry::op_span!("speed_up", from = %address).entered();
/// ```
#[macro_export]
macro_rules! op_span {
    ($op:expr) => {
        tracing::info_span!("op", op = $op)
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info_span!("op", op = $op, $($field)*)
    };
}

/// Log a transaction event with standard fields.
#[macro_export]
macro_rules! log_tx_event {
    ($level:ident, $msg:expr, $tx_hash:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            tx_hash = ?$tx_hash,
            $($($field)*,)?
            $msg
        )
    };
}
