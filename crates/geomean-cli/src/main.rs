#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;
mod telemetry;

use std::process;

use anyhow::Context;
use axum::Router;
use geomean_server::handler::routes;
use geomean_server::middleware::{RouterObservabilityExt, RouterRecoveryExt};
use geomean_server::service::ServiceState;

use crate::config::{Cli, GoogleSessionProvider};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "geomean_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "geomean_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "geomean_cli::config";
pub const TRACING_TARGET_SESSION: &str = "geomean_cli::session";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing(&cli.telemetry)?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting geomean"
    );

    cli.log();
    cli.validate()?;

    let provider = GoogleSessionProvider::new(&cli).context("failed to create session provider")?;
    let state = ServiceState::from_provider(provider, cli.pipeline.clone());
    let router = create_router(state, &cli);

    server::serve(router, cli.server)
        .await
        .context("server terminated abnormally")?;

    Ok(())
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery (outermost): catches panics and enforces timeouts
/// 2. Observability: request ids and tracing spans
/// 3. Routes (innermost): trigger and health handlers
fn create_router(state: ServiceState, cli: &Cli) -> Router {
    routes(state)
        .with_observability()
        .with_recovery(&cli.server.recovery())
}
