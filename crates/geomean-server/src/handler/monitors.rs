//! Health check endpoint.

use axum::Json;
use axum::routing::{Router, get};
use serde::Serialize;

use crate::service::ServiceState;

/// Body of a health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_status() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Returns a [`Router`] with the health route.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health", get(health_status))
}
