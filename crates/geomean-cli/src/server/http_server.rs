//! HTTP server startup.

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::server::lifecycle::serve_with_shutdown;
use crate::server::shutdown::{TriggerDrain, wait_for_signal};
use crate::server::{Result, ServerError};
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Binds the configured address and serves `app` until a shutdown signal.
///
/// After the signal, in-flight requests get the shutdown timeout to
/// complete; the server then stops regardless.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the address cannot be
/// bound, or the server fails while running.
pub async fn serve_http(app: Router, server_config: ServerConfig) -> Result<()> {
    if let Err(validation_error) = server_config.validate() {
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            error = %validation_error,
            "Invalid server configuration"
        );

        return Err(ServerError::InvalidConfig(validation_error.to_string()));
    }

    let server_addr = server_config.server_addr();
    let listener = TcpListener::bind(server_addr).await.map_err(|source| {
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            addr = %server_addr,
            error = %source,
            "Failed to bind to address"
        );

        ServerError::BindError {
            address: server_addr.to_string(),
            source,
        }
    })?;

    let shutdown_timeout = server_config.shutdown_timeout();
    let drain = TriggerDrain::new(shutdown_timeout);
    let signal = drain.begin_after(wait_for_signal());

    serve_with_shutdown(&server_config, || async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(signal);

        tokio::select! {
            result = server.into_future() => result,
            () = drain.closed() => {
                tracing::warn!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    timeout_secs = shutdown_timeout.as_secs(),
                    "Drain window closed, abandoning running triggers"
                );
                Ok(())
            }
        }
    })
    .await
}
