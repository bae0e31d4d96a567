//! Internal error types for geomean-reqwest.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for geomean-reqwest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Internal error type for geomean-reqwest operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Credential file could not be read.
    #[error("cannot read credentials file {}: {source}", path.display())]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Signing the service account assertion failed.
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    /// The token endpoint rejected the grant.
    #[error("token endpoint returned {status}: {body}")]
    TokenEndpoint {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },
    /// The credential file has a type this crate cannot use.
    #[error("unsupported credentials type '{0}'")]
    UnsupportedCredentials(String),
    /// No credential source was found.
    #[error("no application default credentials found")]
    MissingCredentials,
    /// No project id was configured or discoverable.
    #[error("no default project found")]
    MissingProject,
}

impl From<Error> for geomean_core::Error {
    /// Every failure here happens while a session is being set up, so it maps
    /// to `Authentication`, except a missing project which is `Configuration`.
    /// Transport and parse failures keep their detail in the source only.
    fn from(err: Error) -> Self {
        let message = match &err {
            Error::Reqwest(e) if e.is_timeout() => "Credential request timed out".to_owned(),
            Error::Reqwest(_) => "Credential request failed".to_owned(),
            Error::Serde(_) => "Malformed credentials".to_owned(),
            other => other.to_string(),
        };

        let error = match &err {
            Error::MissingProject => geomean_core::Error::configuration(),
            _ => geomean_core::Error::authentication(),
        };

        error.with_message(message).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use geomean_core::ErrorKind;

    use super::*;

    #[test]
    fn credential_failures_are_authentication_errors() {
        let error: geomean_core::Error = Error::MissingCredentials.into();
        assert_eq!(error.kind(), ErrorKind::Authentication);

        let error: geomean_core::Error = Error::TokenEndpoint {
            status: 400,
            body: "invalid_grant".into(),
        }
        .into();
        assert_eq!(error.kind(), ErrorKind::Authentication);
        assert!(error.to_string().contains("invalid_grant"));
    }

    #[test]
    fn malformed_credentials_are_authentication_errors() {
        let source = serde_json::from_str::<serde_json::Value>("{ not json").unwrap_err();
        let error: geomean_core::Error = Error::Serde(source).into();
        assert_eq!(error.kind(), ErrorKind::Authentication);
        assert_eq!(error.message.as_deref(), Some("Malformed credentials"));
        assert!(error.source.is_some());
    }

    #[tokio::test]
    async fn transport_failures_are_authentication_errors() {
        // Port 9 is discard; nothing answers there.
        let source = reqwest::Client::new()
            .get("http://127.0.0.1:9/token")
            .send()
            .await
            .unwrap_err();

        let error: geomean_core::Error = Error::Reqwest(source).into();
        assert_eq!(error.kind(), ErrorKind::Authentication);
        assert_eq!(error.message.as_deref(), Some("Credential request failed"));
        assert!(error.source.is_some());
    }

    #[test]
    fn missing_project_is_configuration_error() {
        let error: geomean_core::Error = Error::MissingProject.into();
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }
}
