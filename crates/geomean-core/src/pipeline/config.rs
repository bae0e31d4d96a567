//! Pipeline configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default object name prefix of the exported mean image.
pub const DEFAULT_OUTPUT_NAME: &str = "mean_image";

/// Default ground sample distance of the export, in platform units per pixel.
pub const DEFAULT_SCALE: f64 = 30.0;

/// Default description attached to export tasks.
pub const DEFAULT_DESCRIPTION: &str = "Mean Image Export";

/// Settings for the ingest-and-average pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct PipelineConfig {
    /// Object name prefix of the exported mean image.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "GEOMEAN_OUTPUT_NAME", default_value = DEFAULT_OUTPUT_NAME)
    )]
    #[serde(default = "default_output_name")]
    pub output_name: String,

    /// Ground sample distance of the export, in platform units per pixel.
    #[cfg_attr(
        feature = "config",
        arg(long = "export-scale", env = "GEOMEAN_EXPORT_SCALE", default_value_t = DEFAULT_SCALE)
    )]
    #[serde(default = "default_scale")]
    pub scale: f64,

    /// Description attached to export tasks.
    #[cfg_attr(
        feature = "config",
        arg(long = "export-description", env = "GEOMEAN_EXPORT_DESCRIPTION", default_value = DEFAULT_DESCRIPTION)
    )]
    #[serde(default = "default_description")]
    pub description: String,
}

fn default_output_name() -> String {
    DEFAULT_OUTPUT_NAME.to_owned()
}

fn default_scale() -> f64 {
    DEFAULT_SCALE
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_owned()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_name: default_output_name(),
            scale: default_scale(),
            description: default_description(),
        }
    }
}

impl PipelineConfig {
    /// Sets the output name prefix.
    pub fn with_output_name(mut self, output_name: impl Into<String>) -> Self {
        self.output_name = output_name.into();
        self
    }

    /// Sets the export scale.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.output_name.trim().is_empty() {
            return Err(Error::configuration().with_message("output name cannot be empty"));
        }

        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(Error::configuration()
                .with_message(format!("export scale must be positive, got {}", self.scale)));
        }

        if self.description.trim().is_empty() {
            return Err(Error::configuration().with_message("export description cannot be empty"));
        }

        Ok(())
    }
}
