//! Error types for the Earth Engine client.

use geomean_core::ErrorKind;
use thiserror::Error;

/// Result type alias for Earth Engine operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by the Earth Engine client.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// A body could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The API answered with an error status.
    #[error("Earth Engine API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },
    /// The client configuration is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Converts into a pipeline error of the given stage kind.
    ///
    /// Transport and decoding failures keep their detail in the source; the
    /// message only names what went wrong.
    pub fn into_stage(self, stage: ErrorKind) -> geomean_core::Error {
        let message = match &self {
            Self::Http(e) if e.is_timeout() => "Earth Engine request timed out".to_owned(),
            Self::Http(_) => "Earth Engine request failed".to_owned(),
            Self::Serde(_) => "Malformed Earth Engine response".to_owned(),
            other => other.to_string(),
        };

        geomean_core::Error::new(stage)
            .with_message(message)
            .with_source(self)
    }
}

impl From<Error> for geomean_core::Error {
    /// Used while a session is set up.
    fn from(err: Error) -> Self {
        let stage = match &err {
            Error::InvalidConfig(_) => ErrorKind::Configuration,
            _ => ErrorKind::Authentication,
        };
        err.into_stage(stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_take_stage_kind() {
        let error = Error::Api {
            status: 400,
            message: "Asset already exists".into(),
        }
        .into_stage(ErrorKind::Ingestion);

        assert_eq!(error.kind(), ErrorKind::Ingestion);
        assert!(error.to_string().contains("Asset already exists"));
    }

    #[tokio::test]
    async fn transport_failures_take_stage_kind() {
        // Port 9 is discard; nothing answers there.
        let source = reqwest::Client::new()
            .post("http://127.0.0.1:9/v1/projects/p/image:export")
            .send()
            .await
            .unwrap_err();

        let error = Error::Http(source).into_stage(ErrorKind::Export);
        assert_eq!(error.kind(), ErrorKind::Export);
        assert_eq!(error.message.as_deref(), Some("Earth Engine request failed"));
        assert!(error.source.is_some());
    }

    #[test]
    fn decode_failures_take_stage_kind() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = Error::Serde(source).into_stage(ErrorKind::Ingestion);
        assert_eq!(error.kind(), ErrorKind::Ingestion);
    }

    #[test]
    fn config_errors_stay_configuration() {
        let error: geomean_core::Error = Error::InvalidConfig("bad".into()).into();
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }
}
