//! Log output configuration.

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

/// Log line encoding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines with ANSI colors.
    #[default]
    Pretty,
    /// One JSON object per line, for log collectors.
    Json,
}

/// Telemetry configuration options.
///
/// The log level comes from `RUST_LOG` and defaults to `info`.
#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log line encoding.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    #[serde(default)]
    pub log_format: LogFormat,
}
