//! Server error types.

use std::io;

use thiserror::Error;

/// Result type for server operations.
pub type Result<T, E = ServerError> = std::result::Result<T, E>;

/// Errors raised while starting or running the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Server configuration is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to bind to the specified address.
    #[error("Failed to bind to {address}: {source}")]
    BindError {
        address: String,
        #[source]
        source: io::Error,
    },

    /// Runtime server error.
    #[error("Runtime error: {0}")]
    Runtime(#[source] io::Error),
}

impl ServerError {
    /// Returns a human-readable suggestion for resolving the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        let err = match self {
            Self::InvalidConfig(_) => return Some("Run with --help to see valid ranges"),
            Self::BindError { source, .. } | Self::Runtime(source) => source,
        };

        match err.kind() {
            io::ErrorKind::PermissionDenied => {
                Some("Try using a port above 1024 or run with appropriate privileges")
            }
            io::ErrorKind::AddrInUse => {
                Some("The port is already in use. Try a different port or stop the conflicting service")
            }
            io::ErrorKind::AddrNotAvailable => {
                Some("The address is not available. Check network interface configuration")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_errors_carry_suggestions() {
        let error = ServerError::BindError {
            address: "127.0.0.1:8080".into(),
            source: io::ErrorKind::AddrInUse.into(),
        };

        assert!(error.to_string().contains("127.0.0.1:8080"));
        assert!(error.suggestion().unwrap().contains("already in use"));
    }

    #[test]
    fn unknown_runtime_errors_have_no_suggestion() {
        let error = ServerError::Runtime(io::Error::other("boom"));
        assert!(error.suggestion().is_none());
    }
}
