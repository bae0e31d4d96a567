//! Conversion from pipeline errors to HTTP errors.

use geomean_core::ErrorKind as PipelineErrorKind;

use super::http_error::{Error, ErrorKind};

/// Tracing target for pipeline error conversions.
const TRACING_TARGET: &str = "geomean_server::handler::error";

impl From<geomean_core::Error> for Error<'static> {
    /// Only rejected trigger events carry their detail to the caller; stage
    /// failures are logged in full and answered with the stage name alone.
    fn from(error: geomean_core::Error) -> Self {
        match error.kind() {
            PipelineErrorKind::InvalidInput => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Rejected trigger event"
                );

                ErrorKind::BadRequest
                    .with_message("Invalid trigger event")
                    .with_context(error.to_string())
            }
            kind => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    error_kind = %kind,
                    source = ?std::error::Error::source(&error),
                    "Pipeline failed"
                );

                ErrorKind::InternalServerError
                    .with_message(format!("Pipeline failed during {}", stage(kind)))
            }
        }
    }
}

fn stage(kind: PipelineErrorKind) -> &'static str {
    match kind {
        PipelineErrorKind::Authentication | PipelineErrorKind::Configuration => "session setup",
        PipelineErrorKind::Storage => "listing",
        PipelineErrorKind::Ingestion => "ingestion",
        PipelineErrorKind::Aggregation => "aggregation",
        PipelineErrorKind::Export => "export",
        _ => "processing",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_is_bad_request() {
        let error: Error = geomean_core::Error::invalid_input()
            .with_message("event has an empty bucket name")
            .into();

        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert!(error.context().unwrap().contains("empty bucket name"));
    }

    #[test]
    fn stage_failures_are_internal_errors() {
        let error: Error = geomean_core::Error::ingestion()
            .with_message("asset rejected")
            .into();

        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.message(), Some("Pipeline failed during ingestion"));
    }

    #[test]
    fn stage_failures_hide_internal_detail() {
        let error: Error = geomean_core::Error::authentication()
            .with_message("token endpoint returned 400: invalid_grant")
            .into();

        assert_eq!(error.message(), Some("Pipeline failed during session setup"));
        assert!(error.context().is_none());
        assert!(!error.to_string().contains("invalid_grant"));
    }
}
