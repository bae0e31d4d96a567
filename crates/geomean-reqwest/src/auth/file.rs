//! Credential file formats.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};

/// Default OAuth 2.0 token endpoint.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_owned()
}

/// Contents of an application default credentials file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsFile {
    /// A service account key (`"type": "service_account"`).
    ServiceAccount(ServiceAccountKey),
    /// A gcloud user login (`"type": "authorized_user"`).
    AuthorizedUser(AuthorizedUser),
}

impl CredentialsFile {
    /// Parses a credentials file, dispatching on its `type` member.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        match kind.as_str() {
            "service_account" => Ok(Self::ServiceAccount(serde_json::from_value(value)?)),
            "authorized_user" => Ok(Self::AuthorizedUser(serde_json::from_value(value)?)),
            _ => Err(Error::UnsupportedCredentials(kind)),
        }
    }

    /// Returns the project recorded in the file, if any.
    pub fn project_id(&self) -> Option<&str> {
        match self {
            Self::ServiceAccount(key) => key.project_id.as_deref(),
            Self::AuthorizedUser(user) => user.quota_project_id.as_deref(),
        }
    }

    /// Returns the `type` name of the file.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ServiceAccount(_) => "service_account",
            Self::AuthorizedUser(_) => "authorized_user",
        }
    }
}

/// A service account key file.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceAccountKey {
    /// Service account email, used as the assertion issuer.
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// Key id, sent as the JWT `kid` header.
    #[serde(default)]
    pub private_key_id: Option<String>,
    /// Token endpoint the assertion is exchanged at.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    /// Project that owns the service account.
    #[serde(default)]
    pub project_id: Option<String>,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

/// A gcloud user login file.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AuthorizedUser {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Project billed for quota, used as the default project.
    #[serde(default)]
    pub quota_project_id: Option<String>,
}

impl fmt::Debug for AuthorizedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizedUser")
            .field("client_id", &self.client_id)
            .field("quota_project_id", &self.quota_project_id)
            .finish_non_exhaustive()
    }
}
