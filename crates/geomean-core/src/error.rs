//! Structured error handling for pipeline operations.

use hipstr::HipStr;
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur while running the pipeline.
///
/// The first five variants mirror the stages an invocation passes through;
/// the rest classify transport and input problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Credential resolution or session setup failed.
    Authentication,
    /// Listing the bucket failed.
    Storage,
    /// The imagery platform rejected an ingestion.
    Ingestion,
    /// The image collection could not be reduced.
    Aggregation,
    /// Region resolution or export submission failed.
    Export,
    /// Input validation failed.
    InvalidInput,
    /// Configuration error.
    Configuration,
    /// Network-related error occurred.
    NetworkError,
    /// Timeout occurred.
    Timeout,
    /// Serialization/deserialization error.
    Serialization,
    /// External service error.
    ExternalError,
    /// Unknown error occurred.
    #[default]
    Unknown,
}

/// Structured error type with classification and context tracking.
#[must_use]
#[derive(Debug, Error)]
#[error("[{kind}]{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Primary error message.
    pub message: Option<HipStr<'static>>,
    /// Underlying source error, if any.
    #[source]
    pub source: Option<BoxedError>,
    /// Additional context information.
    pub context: Option<HipStr<'static>>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
            context: None,
        }
    }

    /// Creates a new error from a source error.
    pub fn from_source(kind: ErrorKind, source: impl Into<BoxedError>) -> Self {
        Self {
            kind,
            message: None,
            source: Some(source.into()),
            context: None,
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<HipStr<'static>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the source of the error.
    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds context to the error.
    pub fn with_context(mut self, context: impl Into<HipStr<'static>>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Replaces the kind, keeping message, source and context.
    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Creates a new authentication error.
    pub fn authentication() -> Self {
        Self::new(ErrorKind::Authentication)
    }

    /// Creates a new storage error.
    pub fn storage() -> Self {
        Self::new(ErrorKind::Storage)
    }

    /// Creates a new ingestion error.
    pub fn ingestion() -> Self {
        Self::new(ErrorKind::Ingestion)
    }

    /// Creates a new aggregation error.
    pub fn aggregation() -> Self {
        Self::new(ErrorKind::Aggregation)
    }

    /// Creates a new export error.
    pub fn export() -> Self {
        Self::new(ErrorKind::Export)
    }

    /// Creates a new invalid input error.
    pub fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput)
    }

    /// Creates a new configuration error.
    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    /// Creates a new serialization error.
    pub fn serialization() -> Self {
        Self::new(ErrorKind::Serialization)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::from_source(ErrorKind::Serialization, error).with_message("Invalid JSON payload")
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::from_source(ErrorKind::Unknown, error).with_message("I/O operation failed")
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_error_new() {
        let error = Error::new(ErrorKind::Unknown);
        assert_eq!(error.kind, ErrorKind::Unknown);
        assert!(error.message.is_none());
        assert!(error.source.is_none());
        assert!(error.context.is_none());
    }

    #[test]
    fn test_error_builder_pattern() {
        let error = Error::ingestion()
            .with_message("asset rejected")
            .with_context("projects/p/assets/a");

        assert_eq!(error.kind, ErrorKind::Ingestion);
        assert_eq!(error.message.as_deref(), Some("asset rejected"));
        assert_eq!(error.context.as_deref(), Some("projects/p/assets/a"));
    }

    #[test]
    fn test_error_display() {
        let error = Error::export().with_message("quota exceeded");

        let display_str = error.to_string();
        assert_eq!(display_str, "[export]: quota exceeded");
    }

    #[test]
    fn test_error_display_without_message() {
        assert_eq!(Error::storage().to_string(), "[storage]");
    }

    #[test]
    fn test_with_kind_keeps_source() {
        let source = std::io::Error::other("socket closed");
        let error = Error::from_source(ErrorKind::NetworkError, source)
            .with_message("request failed")
            .with_kind(ErrorKind::Ingestion);

        assert_eq!(error.kind(), ErrorKind::Ingestion);
        assert!(error.source.is_some());
        assert_eq!(error.message.as_deref(), Some("request failed"));
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = Error::from(json_error);

        assert_eq!(error.kind, ErrorKind::Serialization);
        assert!(error.source.is_some());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!(
            ErrorKind::from_str("authentication").unwrap(),
            ErrorKind::Authentication
        );
        assert_eq!(ErrorKind::from_str("export").unwrap(), ErrorKind::Export);
        assert!(ErrorKind::from_str("invalid").is_err());
        assert_eq!(ErrorKind::default(), ErrorKind::Unknown);
        assert_eq!(Error::aggregation().kind_str(), "aggregation");
    }
}
