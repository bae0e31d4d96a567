//! The ingest-and-average pipeline.
//!
//! One invocation runs four stages against a [`Session`]:
//!
//! 1. [`discover`](Pipeline::discover) streams the bucket's objects,
//! 2. [`ingest`](Pipeline::ingest) registers each object as an image asset,
//! 3. [`aggregate`](Pipeline::aggregate) reduces the handles to their mean,
//! 4. [`export`](Pipeline::export) writes the mean back to the bucket.
//!
//! Ingestion and export tasks are started and never awaited. The mean may
//! therefore be composed over assets that are still being ingested.

mod config;
mod report;

use std::fmt;
use std::sync::Arc;

use futures::stream::BoxStream;
use futures::TryStreamExt;

pub use self::config::{DEFAULT_DESCRIPTION, DEFAULT_OUTPUT_NAME, DEFAULT_SCALE, PipelineConfig};
pub use self::report::{IngestedAsset, IngestedSummary, PipelineReport, PipelineSummary};
use crate::{
    AssetId, ExportRequest, ExportTask, Image, IngestionRequest, Result, Session, SessionProvider,
    StorageObject, TRACING_TARGET_PIPELINE, Trigger,
};

/// Runs the ingest-and-average pipeline once per trigger.
#[derive(Clone)]
pub struct Pipeline {
    provider: Arc<dyn SessionProvider>,
    config: PipelineConfig,
}

impl Pipeline {
    /// Creates a pipeline that opens sessions from `provider`.
    pub fn new(provider: impl SessionProvider + 'static, config: PipelineConfig) -> Self {
        Self::from_shared(Arc::new(provider), config)
    }

    /// Creates a pipeline from an already shared provider.
    pub fn from_shared(provider: Arc<dyn SessionProvider>, config: PipelineConfig) -> Self {
        Self { provider, config }
    }

    /// Returns the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Handles one trigger: opens a session and processes the event's bucket.
    ///
    /// The session lives until this call returns.
    pub async fn run(&self, trigger: &Trigger) -> Result<PipelineReport> {
        trigger.event.validate()?;

        tracing::info!(
            target: TRACING_TARGET_PIPELINE,
            bucket = %trigger.event.bucket,
            object = ?trigger.event.name,
            event_id = ?trigger.context.event_id,
            event_type = ?trigger.context.event_type,
            "handling storage trigger"
        );

        let session = self.provider.open_session().await?;
        self.run_with_session(&session, &trigger.event.bucket).await
    }

    /// Processes `bucket` with an already opened session.
    pub async fn run_with_session(&self, session: &Session, bucket: &str) -> Result<PipelineReport> {
        let ingested: Vec<IngestedAsset> = self
            .discover(session, bucket)
            .and_then(|object| self.ingest(session, object))
            .try_collect()
            .await?;

        let images = ingested.iter().map(|asset| asset.image.clone()).collect();
        let Some(mean) = self.aggregate(session, images)? else {
            tracing::info!(
                target: TRACING_TARGET_PIPELINE,
                bucket = %bucket,
                "bucket is empty, nothing to export"
            );

            return Ok(PipelineReport {
                bucket: bucket.to_owned(),
                ingested,
                export: None,
            });
        };

        let export = self.export(session, &mean, bucket).await?;
        Ok(PipelineReport {
            bucket: bucket.to_owned(),
            ingested,
            export: Some(export),
        })
    }

    /// Streams every object currently in `bucket`.
    ///
    /// The stream is lazy; each call starts a fresh listing.
    pub fn discover<'a>(
        &self,
        session: &'a Session,
        bucket: &'a str,
    ) -> BoxStream<'a, Result<StorageObject>> {
        session.storage().list_objects(bucket)
    }

    /// Starts ingesting `object` and returns a handle to its asset.
    ///
    /// The handle is returned as soon as the platform accepts the task.
    pub async fn ingest(&self, session: &Session, object: StorageObject) -> Result<IngestedAsset> {
        let title = object.title().to_owned();
        let source_uri = object.source_uri();
        let asset_id = AssetId::new(session.project(), &title);

        tracing::info!(
            target: TRACING_TARGET_PIPELINE,
            title = %title,
            source = %source_uri,
            "Ingesting {title} from {source_uri}"
        );

        let platform = session.platform();
        let request = IngestionRequest::single_source(asset_id.clone(), source_uri);
        let task_id = platform.new_task_id().await?;
        let task = platform.start_ingestion(&task_id, &request).await?;

        tracing::debug!(
            target: TRACING_TARGET_PIPELINE,
            asset_id = %asset_id,
            task_id = %task.task_id,
            operation = ?task.operation,
            "ingestion task started"
        );

        Ok(IngestedAsset {
            image: Image::load(&asset_id),
            object,
            title,
            asset_id,
            task_id: task.task_id,
        })
    }

    /// Composes the mean of `images`, or returns `None` when there are none.
    pub fn aggregate(&self, session: &Session, images: Vec<Image>) -> Result<Option<Image>> {
        if images.is_empty() {
            return Ok(None);
        }

        tracing::debug!(
            target: TRACING_TARGET_PIPELINE,
            images = images.len(),
            "composing mean image"
        );

        session.platform().mean(images).map(Some)
    }

    /// Starts exporting `mean` into `bucket`, clipped to its own bounds.
    pub async fn export(&self, session: &Session, mean: &Image, bucket: &str) -> Result<ExportTask> {
        let platform = session.platform();
        let region = platform.bounds(mean).await?;

        let request = ExportRequest {
            image: mean.clone(),
            description: self.config.description.clone(),
            bucket: bucket.to_owned(),
            file_name_prefix: self.config.output_name.clone(),
            scale: self.config.scale,
            region,
        };

        let destination = request.destination();
        tracing::info!(
            target: TRACING_TARGET_PIPELINE,
            destination = %destination,
            scale = request.scale,
            "Exporting mean image to {destination}"
        );

        let task_id = platform.new_task_id().await?;
        let task = platform.start_export(&task_id, &request).await?;

        tracing::debug!(
            target: TRACING_TARGET_PIPELINE,
            task_id = %task.task_id,
            operation = ?task.operation,
            "export task started"
        );

        Ok(task)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
