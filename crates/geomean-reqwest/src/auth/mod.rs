//! Ambient Google credentials (application default credentials).
//!
//! Credentials are looked up in this order:
//!
//! 1. the file named by `GOOGLE_APPLICATION_CREDENTIALS`,
//! 2. the gcloud well-known file,
//! 3. the compute metadata server.
//!
//! The default project comes from the explicit configuration first, then
//! from the credentials file, then from the metadata server.

mod config;
mod file;
mod metadata;
mod token;

use std::path::{Path, PathBuf};

use geomean_core::ProjectId;

pub use self::config::{CredentialsConfig, DEFAULT_METADATA_HOST, WELL_KNOWN_FILE};
pub use self::file::{AuthorizedUser, CredentialsFile, DEFAULT_TOKEN_URI, ServiceAccountKey};
pub use self::metadata::MetadataServer;
pub use self::token::AccessToken;
use crate::{Error, ReqwestClient, Result};

/// Tracing target for credential discovery.
pub const TRACING_TARGET_AUTH: &str = "geomean_reqwest::auth";

/// OAuth scopes requested for every token.
pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/cloud-platform",
    "https://www.googleapis.com/auth/earthengine",
];

/// Where credentials were found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// A credentials file on disk.
    File {
        /// Path the file was read from.
        path: PathBuf,
        /// Parsed file contents.
        credentials: CredentialsFile,
    },
    /// The compute metadata server.
    Metadata,
}

/// An access token together with the project it is used for.
#[derive(Debug, Clone)]
pub struct GoogleCredentials {
    /// Bearer token for Earth Engine and Cloud Storage.
    pub token: AccessToken,
    /// Default project.
    pub project: ProjectId,
}

/// Resolves application default credentials.
#[derive(Debug, Clone)]
pub struct GoogleAuth {
    client: ReqwestClient,
    config: CredentialsConfig,
    metadata: MetadataServer,
}

impl GoogleAuth {
    /// Creates a resolver using `client` for every token request.
    pub fn new(client: ReqwestClient, config: CredentialsConfig) -> Self {
        let metadata = MetadataServer::new(client.clone(), config.effective_metadata_host());
        Self {
            client,
            config,
            metadata,
        }
    }

    /// Returns the discovery configuration.
    pub fn config(&self) -> &CredentialsConfig {
        &self.config
    }

    /// Finds the first available credential source.
    pub async fn discover(&self) -> Result<CredentialSource> {
        if let Some(path) = &self.config.credentials_file {
            // An explicitly named file must exist.
            let credentials = read_credentials(path).await?.ok_or_else(|| Error::Io {
                path: path.clone(),
                source: std::io::ErrorKind::NotFound.into(),
            })?;
            return Ok(CredentialSource::File {
                path: path.clone(),
                credentials,
            });
        }

        if let Some(path) = self.config.well_known_file()
            && let Some(credentials) = read_credentials(&path).await?
        {
            return Ok(CredentialSource::File { path, credentials });
        }

        if self.metadata.is_available().await {
            return Ok(CredentialSource::Metadata);
        }

        Err(Error::MissingCredentials)
    }

    /// Resolves a token and the default project.
    pub async fn authenticate(&self) -> geomean_core::Result<GoogleCredentials> {
        let source = self.discover().await?;

        let token = match &source {
            CredentialSource::File { path, credentials } => {
                tracing::info!(
                    target: TRACING_TARGET_AUTH,
                    path = %path.display(),
                    kind = credentials.kind(),
                    "Using credentials file"
                );

                match credentials {
                    CredentialsFile::ServiceAccount(key) => {
                        token::service_account_token(&self.client, key).await?
                    }
                    CredentialsFile::AuthorizedUser(user) => {
                        token::authorized_user_token(&self.client, user).await?
                    }
                }
            }
            CredentialSource::Metadata => {
                tracing::info!(
                    target: TRACING_TARGET_AUTH,
                    "Using metadata server credentials"
                );
                self.metadata.token().await?
            }
        };

        let project = self.resolve_project(&source).await?;
        tracing::debug!(
            target: TRACING_TARGET_AUTH,
            project = %project,
            expires_at = ?token.expires_at(),
            "Resolved application default credentials"
        );

        let project = ProjectId::new(project)
            .map_err(|e| e.with_kind(geomean_core::ErrorKind::Configuration))?;

        Ok(GoogleCredentials { token, project })
    }

    async fn resolve_project(&self, source: &CredentialSource) -> Result<String> {
        if let Some(project) = self.config.explicit_project() {
            return Ok(project);
        }

        match source {
            CredentialSource::File { credentials, .. } => credentials
                .project_id()
                .map(str::to_owned)
                .ok_or(Error::MissingProject),
            CredentialSource::Metadata => self.metadata.project_id().await,
        }
    }
}

/// Reads a credentials file, returning `None` when it does not exist.
async fn read_credentials(path: &Path) -> Result<Option<CredentialsFile>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => CredentialsFile::from_slice(&bytes).map(Some),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(Error::Io {
            path: path.to_owned(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;
    use crate::ReqwestConfig;

    fn auth(config: CredentialsConfig) -> GoogleAuth {
        // Port 9 is discard; nothing answers there.
        let config = config.with_metadata_host("127.0.0.1:9");
        GoogleAuth::new(ReqwestClient::new(ReqwestConfig::new(1)).unwrap(), config)
    }

    fn authorized_user() -> String {
        json!({
            "type": "authorized_user",
            "client_id": "id",
            "client_secret": "secret",
            "refresh_token": "refresh",
            "quota_project_id": "from-file"
        })
        .to_string()
    }

    #[tokio::test]
    async fn explicit_file_wins_over_well_known_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(WELL_KNOWN_FILE), "{\"type\":\"service_account\"}").unwrap();

        let mut explicit = tempfile::NamedTempFile::new().unwrap();
        explicit.write_all(authorized_user().as_bytes()).unwrap();

        let config = CredentialsConfig::default()
            .with_credentials_file(explicit.path())
            .with_gcloud_config_dir(dir.path());
        let source = auth(config).discover().await.unwrap();

        let CredentialSource::File { path, credentials } = source else {
            panic!("expected a credentials file");
        };
        assert_eq!(path, explicit.path());
        assert_eq!(credentials.kind(), "authorized_user");
    }

    #[tokio::test]
    async fn falls_back_to_well_known_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(WELL_KNOWN_FILE), authorized_user()).unwrap();

        let config = CredentialsConfig::default().with_gcloud_config_dir(dir.path());
        let source = auth(config).discover().await.unwrap();
        assert!(matches!(source, CredentialSource::File { .. }));
    }

    #[tokio::test]
    async fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = CredentialsConfig::default()
            .with_credentials_file(dir.path().join("missing.json"))
            .with_gcloud_config_dir(dir.path());

        let error = auth(config).discover().await.unwrap_err();
        assert!(matches!(error, Error::Io { .. }));
    }

    #[tokio::test]
    async fn malformed_credentials_file_fails_authentication() {
        let dir = tempfile::tempdir().unwrap();
        let mut explicit = tempfile::NamedTempFile::new().unwrap();
        explicit.write_all(b"{ not json").unwrap();

        let config = CredentialsConfig::default()
            .with_credentials_file(explicit.path())
            .with_gcloud_config_dir(dir.path());

        let error = auth(config).authenticate().await.unwrap_err();
        assert_eq!(error.kind(), geomean_core::ErrorKind::Authentication);
        assert!(error.source.is_some());
    }

    #[tokio::test]
    async fn missing_credentials_fail_authentication() {
        let dir = tempfile::tempdir().unwrap();
        let config = CredentialsConfig::default().with_gcloud_config_dir(dir.path());

        let error = auth(config).authenticate().await.unwrap_err();
        assert_eq!(error.kind(), geomean_core::ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn nothing_found_without_metadata_server() {
        let dir = tempfile::tempdir().unwrap();
        let config = CredentialsConfig::default().with_gcloud_config_dir(dir.path());

        let error = auth(config).discover().await.unwrap_err();
        assert!(matches!(error, Error::MissingCredentials));
    }

    #[tokio::test]
    async fn explicit_project_overrides_file_project() {
        let source = CredentialSource::File {
            path: PathBuf::from("adc.json"),
            credentials: CredentialsFile::from_slice(authorized_user().as_bytes()).unwrap(),
        };

        let config = CredentialsConfig::default().with_project("explicit");
        assert_eq!(auth(config).resolve_project(&source).await.unwrap(), "explicit");
    }
}
