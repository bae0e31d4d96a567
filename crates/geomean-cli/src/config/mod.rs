//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── server: ServerConfig            # Host, port, timeouts
//! ├── telemetry: TelemetryConfig      # Log format
//! ├── pipeline: PipelineConfig        # Output name, scale, description
//! ├── reqwest: ReqwestConfig          # HTTP timeout, user agent
//! ├── credentials: CredentialsConfig  # Project, credential discovery
//! ├── earthengine: EarthEngineConfig  # API base URL, export file format
//! └── object: ObjectConfig            # Storage request timeout
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! geomean --project my-project --port 8080
//! GOOGLE_CLOUD_PROJECT=my-project PORT=8080 geomean
//! ```

mod provider;
mod server;
mod telemetry;

use std::process;

use anyhow::Context;
use clap::Parser;
use geomean_core::PipelineConfig;
use geomean_earthengine::EarthEngineConfig;
use geomean_object::ObjectConfig;
use geomean_reqwest::{CredentialsConfig, ReqwestConfig};
pub use provider::GoogleSessionProvider;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;
pub use telemetry::{LogFormat, TelemetryConfig};

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "geomean")]
#[command(about = "Ingests a bucket into Earth Engine and exports the mean image")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// Log output configuration.
    #[clap(flatten)]
    pub telemetry: TelemetryConfig,

    /// Pipeline output settings.
    #[clap(flatten)]
    pub pipeline: PipelineConfig,

    /// Shared HTTP client settings.
    #[clap(flatten)]
    pub reqwest: ReqwestConfig,

    /// Ambient credential discovery.
    #[clap(flatten)]
    pub credentials: CredentialsConfig,

    /// Earth Engine API settings.
    #[clap(flatten)]
    pub earthengine: EarthEngineConfig,

    /// Cloud Storage settings.
    #[clap(flatten)]
    pub object: ObjectConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before parsing so that clap's `env` fallbacks
    /// see its values.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.pipeline
            .validate()
            .context("invalid pipeline configuration")?;
        self.earthengine
            .validate()
            .context("invalid Earth Engine configuration")?;
        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();
        self.server.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            output_name = %self.pipeline.output_name,
            scale = self.pipeline.scale,
            description = %self.pipeline.description,
            "Pipeline configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            project = ?self.credentials.explicit_project(),
            credentials_file = ?self.credentials.credentials_file,
            metadata_host = %self.credentials.effective_metadata_host(),
            earthengine_url = %self.earthengine.base_url,
            file_format = %self.earthengine.file_format,
            http_timeout_secs = self.reqwest.effective_timeout().as_secs(),
            storage_timeout_secs = self.object.effective_timeout().as_secs(),
            "Google Cloud configuration"
        );
    }

    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_reproduce_fixed_export_settings() {
        let cli = Cli::parse_from(["geomean"]);
        assert_eq!(cli.pipeline.output_name, "mean_image");
        assert_eq!(cli.pipeline.scale, 30.0);
        assert_eq!(cli.pipeline.description, "Mean Image Export");
        assert_eq!(cli.telemetry.log_format, LogFormat::Pretty);
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::parse_from([
            "geomean",
            "--port",
            "9090",
            "--output-name",
            "composite",
            "--export-scale",
            "10",
            "--log-format",
            "json",
        ]);

        assert_eq!(cli.server.port, 9090);
        assert_eq!(cli.pipeline.output_name, "composite");
        assert_eq!(cli.pipeline.scale, 10.0);
        assert_eq!(cli.telemetry.log_format, LogFormat::Json);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_scale() {
        let cli = Cli::parse_from(["geomean", "--export-scale", "0"]);
        assert!(cli.validate().is_err());
    }
}
