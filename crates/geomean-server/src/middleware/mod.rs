//! Middleware for `axum::Router`.
//!
//! - recovery: request timeouts, handler panics and middleware errors
//! - observability: request ids and tracing spans

mod observability;
mod recovery;

pub use observability::{REQUEST_ID_HEADER, RouterObservabilityExt};
pub use recovery::{DEFAULT_REQUEST_TIMEOUT_SECS, RecoveryConfig, RouterRecoveryExt};
