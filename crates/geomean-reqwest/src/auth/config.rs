//! Credential discovery configuration.

use std::path::PathBuf;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default host of the compute metadata server.
pub const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";

/// File name of the gcloud application default credentials.
pub const WELL_KNOWN_FILE: &str = "application_default_credentials.json";

/// Where ambient credentials and the default project are looked up.
///
/// Every field is optional; unset fields fall back to the standard
/// application default credentials locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct CredentialsConfig {
    /// Project that owns ingested assets and runs tasks
    #[cfg_attr(feature = "config", arg(long = "project", env = "GOOGLE_CLOUD_PROJECT"))]
    #[serde(default)]
    pub project: Option<String>,

    /// Service account key or authorized user credentials file
    #[cfg_attr(
        feature = "config",
        arg(long = "credentials-file", env = "GOOGLE_APPLICATION_CREDENTIALS")
    )]
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,

    /// gcloud configuration directory holding the well-known credentials file
    #[cfg_attr(
        feature = "config",
        arg(long = "gcloud-config-dir", env = "CLOUDSDK_CONFIG")
    )]
    #[serde(default)]
    pub gcloud_config_dir: Option<PathBuf>,

    /// Host (and optional port) of the compute metadata server
    #[cfg_attr(
        feature = "config",
        arg(long = "metadata-host", env = "GCE_METADATA_HOST", default_value = DEFAULT_METADATA_HOST)
    )]
    #[serde(default = "default_metadata_host")]
    pub metadata_host: String,
}

fn default_metadata_host() -> String {
    DEFAULT_METADATA_HOST.to_owned()
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            project: None,
            credentials_file: None,
            gcloud_config_dir: None,
            metadata_host: default_metadata_host(),
        }
    }
}

impl CredentialsConfig {
    /// Sets the project override.
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Sets the explicit credentials file.
    pub fn with_credentials_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    /// Sets the gcloud configuration directory.
    pub fn with_gcloud_config_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.gcloud_config_dir = Some(path.into());
        self
    }

    /// Sets the metadata server host.
    pub fn with_metadata_host(mut self, host: impl Into<String>) -> Self {
        self.metadata_host = host.into();
        self
    }

    /// Returns the explicitly configured project, if any.
    ///
    /// `GCLOUD_PROJECT` is honored as a legacy alias of `GOOGLE_CLOUD_PROJECT`.
    pub fn explicit_project(&self) -> Option<String> {
        self.project
            .clone()
            .or_else(|| std::env::var("GCLOUD_PROJECT").ok())
            .map(|project| project.trim().to_owned())
            .filter(|project| !project.is_empty())
    }

    /// Returns the path of the gcloud well-known credentials file.
    pub fn well_known_file(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.gcloud_config_dir {
            return Some(dir.join(WELL_KNOWN_FILE));
        }

        #[cfg(windows)]
        let base = std::env::var_os("APPDATA").map(|dir| PathBuf::from(dir).join("gcloud"));
        #[cfg(not(windows))]
        let base = std::env::var_os("HOME").map(|dir| PathBuf::from(dir).join(".config/gcloud"));

        base.map(|dir| dir.join(WELL_KNOWN_FILE))
    }

    /// Returns the effective metadata host, using default if empty.
    pub fn effective_metadata_host(&self) -> &str {
        let host = self.metadata_host.trim();
        if host.is_empty() {
            DEFAULT_METADATA_HOST
        } else {
            host
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_file_prefers_config_dir() {
        let config = CredentialsConfig::default().with_gcloud_config_dir("/etc/gcloud");
        assert_eq!(
            config.well_known_file(),
            Some(PathBuf::from("/etc/gcloud/application_default_credentials.json"))
        );
    }

    #[test]
    fn explicit_project_is_trimmed() {
        let config = CredentialsConfig::default().with_project(" demo ");
        assert_eq!(config.explicit_project().as_deref(), Some("demo"));
    }

    #[test]
    fn blank_metadata_host_uses_default() {
        let config = CredentialsConfig::default().with_metadata_host("");
        assert_eq!(config.effective_metadata_host(), DEFAULT_METADATA_HOST);
    }
}
