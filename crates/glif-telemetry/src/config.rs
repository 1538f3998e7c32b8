//! Telemetry configuration from environment variables.

use std::env;

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Filter directive (`warn`, `glif_tx=debug`, ...)
    pub log_level: String,

    /// Emit JSON lines instead of human-readable output
    pub json_logs: bool,

    /// Include the module target in each line
    pub show_targets: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json_logs: false,
            show_targets: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// - `GLIF_LOG_LEVEL` or `RUST_LOG`: filter (default: warn)
    /// - `GLIF_JSON_LOGS`: JSON output (default: false)
    /// - `GLIF_LOG_TARGETS`: show targets (default: false)
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("GLIF_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "warn".to_string()),

            json_logs: env::var("GLIF_JSON_LOGS")
                .map(|v| is_truthy(&v))
                .unwrap_or(false),

            show_targets: env::var("GLIF_LOG_TARGETS")
                .map(|v| is_truthy(&v))
                .unwrap_or(false),
        }
    }

    /// Raise the filter for `-v` flags: 1 = info, 2 = debug, 3+ = trace.
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        let level = match verbose {
            0 => return self,
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        self.log_level = level.to_string();
        self
    }
}

fn is_truthy(v: &str) -> bool {
    v.eq_ignore_ascii_case("true") || v == "1"
}
