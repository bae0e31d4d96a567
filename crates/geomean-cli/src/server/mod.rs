//! HTTP server startup and lifecycle management.

mod error;
mod http_server;
mod lifecycle;
mod shutdown;

use axum::Router;

pub use self::error::{Result, ServerError};
use self::http_server::serve_http;
use crate::config::ServerConfig;

/// Starts the HTTP server and blocks until it shuts down.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(app: Router, config: ServerConfig) -> Result<()> {
    serve_http(app, config).await
}
