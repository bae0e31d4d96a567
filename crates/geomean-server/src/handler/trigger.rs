//! Storage trigger endpoint.
//!
//! Accepts CloudEvents in binary mode (metadata in `ce-*` headers) and in
//! structured mode, as well as legacy background-function payloads. See
//! [`Trigger::from_slice`] for the accepted bodies.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{Router, post};
use geomean_core::{Pipeline, PipelineSummary, Trigger, TriggerContext};
use jiff::Timestamp;

use crate::handler::Result;
use crate::service::ServiceState;

/// Tracing target for trigger handling.
const TRACING_TARGET: &str = "geomean_server::handler::trigger";

const HEADER_ID: &str = "ce-id";
const HEADER_TYPE: &str = "ce-type";
const HEADER_TIME: &str = "ce-time";
const HEADER_SUBJECT: &str = "ce-subject";
const HEADER_SOURCE: &str = "ce-source";

/// Runs the pipeline for one storage event.
#[tracing::instrument(skip_all)]
async fn handle_trigger(
    State(pipeline): State<Pipeline>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PipelineSummary>> {
    let trigger = Trigger::from_slice(&body)?.with_context(context_from_headers(&headers));

    tracing::info!(
        target: TRACING_TARGET,
        bucket = %trigger.event.bucket,
        object = ?trigger.event.name,
        event_id = ?trigger.context.event_id,
        event_type = ?trigger.context.event_type,
        "Trigger received"
    );

    let report = pipeline.run(&trigger).await?;

    tracing::info!(
        target: TRACING_TARGET,
        bucket = %report.bucket,
        ingested = report.ingested.len(),
        exported = report.export.is_some(),
        "Trigger processed"
    );

    Ok(Json(report.summary()))
}

/// Reads CloudEvents binary-mode metadata.
fn context_from_headers(headers: &HeaderMap) -> TriggerContext {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };

    let timestamp = header(HEADER_TIME).and_then(|time| match time.parse::<Timestamp>() {
        Ok(timestamp) => Some(timestamp),
        Err(error) => {
            tracing::debug!(
                target: TRACING_TARGET,
                time = %time,
                error = %error,
                "Ignoring unparsable event time"
            );
            None
        }
    });

    TriggerContext {
        event_id: header(HEADER_ID),
        event_type: header(HEADER_TYPE),
        timestamp,
        resource: header(HEADER_SUBJECT).or_else(|| header(HEADER_SOURCE)),
    }
}

/// Returns a [`Router`] with the trigger route.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/", post(handle_trigger))
}
