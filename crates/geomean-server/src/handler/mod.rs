//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust,ignore
//! use geomean_core::{Pipeline, PipelineConfig};
//! use geomean_server::handler::routes;
//! use geomean_server::middleware::{RouterObservabilityExt, RouterRecoveryExt};
//! use geomean_server::service::ServiceState;
//!
//! let state = ServiceState::new(Pipeline::new(provider, PipelineConfig::default()));
//! let router = routes(state)
//!     .with_default_recovery()
//!     .with_observability();
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod error;
mod monitors;
mod trigger;

use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, ErrorResponse, Result};
pub use crate::handler::monitors::HealthResponse;
use crate::service::ServiceState;

#[inline]
async fn fallback() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with all routes.
pub fn routes(state: ServiceState) -> Router {
    Router::new()
        .merge(trigger::routes())
        .merge(monitors::routes())
        .fallback(fallback)
        .with_state(state)
}

#[cfg(test)]
mod test {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use geomean_core::mock::{MockPlatform, MockSessionProvider, MockStorage};
    use geomean_core::{Pipeline, PipelineConfig};
    use serde_json::{Value, json};

    use crate::handler::routes;
    use crate::service::ServiceState;

    /// Returns a new [`TestServer`] over the given fakes.
    fn create_test_server(
        storage: MockStorage,
        platform: MockPlatform,
    ) -> anyhow::Result<(TestServer, MockSessionProvider)> {
        let provider = MockSessionProvider::new("p", storage, platform)?;
        let pipeline = Pipeline::new(provider.clone(), PipelineConfig::default());
        let server = TestServer::new(routes(ServiceState::new(pipeline)))?;
        Ok((server, provider))
    }

    fn imgs() -> MockStorage {
        MockStorage::default().with_objects("imgs", ["a.tif", "b.tif"])
    }

    #[tokio::test]
    async fn health_is_ok() -> anyhow::Result<()> {
        let (server, provider) = create_test_server(imgs(), MockPlatform::default())?;

        let response = server.get("/health").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "healthy");
        assert_eq!(provider.opened(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn binary_mode_event_runs_pipeline() -> anyhow::Result<()> {
        let platform = MockPlatform::default();
        let (server, provider) = create_test_server(imgs(), platform.clone())?;

        let response = server
            .post("/")
            .add_header("ce-id", "evt-1")
            .add_header("ce-type", "google.cloud.storage.object.v1.finalized")
            .add_header("ce-subject", "objects/b.tif")
            .json(&json!({ "bucket": "imgs", "name": "b.tif" }))
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["bucket"], "imgs");
        assert_eq!(body["ingested"][0]["source"], "gs://imgs/a.tif");
        assert_eq!(body["ingested"][1]["assetId"], "projects/p/assets/b");
        assert_eq!(body["export"]["destination"], "gs://imgs/mean_image");

        assert_eq!(provider.opened(), 1);
        assert_eq!(platform.ingestions().len(), 2);
        assert_eq!(platform.means(), [2]);
        assert_eq!(platform.exports().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn structured_mode_event_runs_pipeline() -> anyhow::Result<()> {
        let platform = MockPlatform::default();
        let (server, _) = create_test_server(imgs(), platform.clone())?;

        let response = server
            .post("/")
            .json(&json!({
                "specversion": "1.0",
                "id": "evt-2",
                "type": "google.cloud.storage.object.v1.finalized",
                "source": "//storage.googleapis.com/projects/_/buckets/imgs",
                "subject": "objects/a.tif",
                "time": "2024-05-01T12:00:00Z",
                "data": { "bucket": "imgs", "name": "a.tif" }
            }))
            .await;

        response.assert_status_ok();
        assert_eq!(platform.exports().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn background_event_runs_pipeline() -> anyhow::Result<()> {
        let platform = MockPlatform::default();
        let (server, _) = create_test_server(imgs(), platform.clone())?;

        let response = server
            .post("/")
            .json(&json!({
                "data": { "bucket": "imgs", "name": "a.tif" },
                "context": {
                    "eventId": "evt-3",
                    "eventType": "google.storage.object.finalize",
                    "resource": { "name": "projects/_/buckets/imgs/objects/a.tif" }
                }
            }))
            .await;

        response.assert_status_ok();
        assert_eq!(platform.ingestions().len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn empty_bucket_skips_export() -> anyhow::Result<()> {
        let storage = MockStorage::default().with_objects("imgs", Vec::<&str>::new());
        let platform = MockPlatform::default();
        let (server, _) = create_test_server(storage, platform.clone())?;

        let response = server.post("/").json(&json!({ "bucket": "imgs" })).await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["ingested"], json!([]));
        assert!(body.get("export").is_none());
        assert!(platform.means().is_empty());
        assert!(platform.exports().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn missing_bucket_is_bad_request() -> anyhow::Result<()> {
        let (server, provider) = create_test_server(imgs(), MockPlatform::default())?;

        let response = server
            .post("/")
            .json(&json!({ "name": "a.tif" }))
            .expect_failure()
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["name"], "bad_request");
        assert_eq!(provider.opened(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn empty_body_is_bad_request() -> anyhow::Result<()> {
        let (server, _) = create_test_server(imgs(), MockPlatform::default())?;

        let response = server.post("/").expect_failure().await;
        response.assert_status(StatusCode::BAD_REQUEST);

        Ok(())
    }

    #[tokio::test]
    async fn failed_ingestion_is_internal_error() -> anyhow::Result<()> {
        let platform = MockPlatform::default().with_failing_source("gs://imgs/b.tif");
        let (server, _) = create_test_server(imgs(), platform.clone())?;

        let response = server
            .post("/")
            .json(&json!({ "bucket": "imgs" }))
            .expect_failure()
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.json::<Value>();
        assert_eq!(body["name"], "internal_server_error");
        assert_eq!(body["message"], "Pipeline failed during ingestion");
        assert!(body.get("context").is_none());

        assert_eq!(platform.ingestions().len(), 1);
        assert!(platform.exports().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn failed_authentication_is_internal_error() -> anyhow::Result<()> {
        let provider = MockSessionProvider::new("p", imgs(), MockPlatform::default())?
            .with_failing_authentication();
        let pipeline = Pipeline::new(provider, PipelineConfig::default());
        let server = TestServer::new(routes(ServiceState::new(pipeline)))?;

        let response = server
            .post("/")
            .json(&json!({ "bucket": "imgs" }))
            .expect_failure()
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.json::<Value>()["message"],
            "Pipeline failed during session setup"
        );

        Ok(())
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() -> anyhow::Result<()> {
        let (server, _) = create_test_server(imgs(), MockPlatform::default())?;

        let response = server.get("/missing").expect_failure().await;
        response.assert_status_not_found();

        Ok(())
    }
}
