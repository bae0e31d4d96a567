//! Earth Engine client configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Default base URL of the Earth Engine REST API.
pub const DEFAULT_BASE_URL: &str = "https://earthengine.googleapis.com/v1";

/// Default export file format.
pub const DEFAULT_FILE_FORMAT: &str = "GEO_TIFF";

/// Configuration for the Earth Engine REST client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct EarthEngineConfig {
    /// Base URL of the Earth Engine REST API
    #[cfg_attr(
        feature = "config",
        arg(long = "earthengine-url", env = "EARTHENGINE_URL", default_value = DEFAULT_BASE_URL)
    )]
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// File format of exported images
    #[cfg_attr(
        feature = "config",
        arg(long = "export-file-format", env = "EXPORT_FILE_FORMAT", default_value = DEFAULT_FILE_FORMAT)
    )]
    #[serde(default = "default_file_format")]
    pub file_format: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_file_format() -> String {
    DEFAULT_FILE_FORMAT.to_owned()
}

impl Default for EarthEngineConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            file_format: default_file_format(),
        }
    }
}

impl EarthEngineConfig {
    /// Sets the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the export file format.
    pub fn with_file_format(mut self, file_format: impl Into<String>) -> Self {
        self.file_format = file_format.into();
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| Error::InvalidConfig(format!("invalid base URL '{}': {e}", self.base_url)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidConfig(format!(
                "base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.file_format.trim().is_empty() {
            return Err(Error::InvalidConfig("export file format cannot be empty".into()));
        }

        Ok(())
    }

    /// Returns the URL of a project-scoped method, e.g. `image:import`.
    pub fn method_url(&self, project: &str, method: &str) -> String {
        format!(
            "{}/projects/{project}/{method}",
            self.base_url.trim_end_matches('/')
        )
    }
}
