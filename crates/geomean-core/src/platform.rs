//! Imagery platform collaborator trait and its request types.

use serde::{Deserialize, Serialize};

use crate::image::{Image, ImageCollection, Region};
use crate::{AssetId, Error, Result, TaskId};

/// Request to ingest one storage object as an image asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionRequest {
    /// Destination asset.
    pub asset_id: AssetId,
    /// Source file URIs (`gs://bucket/object`).
    pub source_uris: Vec<String>,
    /// Whether an existing asset at `asset_id` may be replaced.
    pub allow_overwrite: bool,
}

impl IngestionRequest {
    /// Creates a request for a single source file, permitting overwrite.
    pub fn single_source(asset_id: AssetId, source_uri: impl Into<String>) -> Self {
        Self {
            asset_id,
            source_uris: vec![source_uri.into()],
            allow_overwrite: true,
        }
    }
}

/// Handle returned when an ingestion task has been started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionTask {
    /// Task id used as the submission's request id.
    pub task_id: TaskId,
    /// Name of the long-running operation, when the platform returned one.
    pub operation: Option<String>,
}

/// Request to export an image into a storage bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    /// Image to export.
    pub image: Image,
    /// Human-readable task description.
    pub description: String,
    /// Destination bucket.
    pub bucket: String,
    /// Object name prefix inside the bucket.
    pub file_name_prefix: String,
    /// Ground sample distance in platform units per pixel.
    pub scale: f64,
    /// Region the export is clipped to.
    pub region: Region,
}

impl ExportRequest {
    /// Returns the `gs://<bucket>/<prefix>` destination.
    pub fn destination(&self) -> String {
        crate::object::storage_uri(&self.bucket, &self.file_name_prefix)
    }
}

/// Handle returned when an export task has been started.
///
/// The pipeline never polls it; completion happens on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTask {
    /// Task id used as the submission's request id.
    pub task_id: TaskId,
    /// Name of the long-running operation, when the platform returned one.
    pub operation: Option<String>,
    /// `gs://<bucket>/<prefix>` destination of the export.
    pub destination: String,
}

/// Remote geospatial-imagery platform operations used by the pipeline.
#[async_trait::async_trait]
pub trait ImageryPlatform: Send + Sync {
    /// Allocates an identifier for a new task.
    async fn new_task_id(&self) -> Result<TaskId> {
        Ok(TaskId::generate())
    }

    /// Starts ingesting the request's sources into its asset.
    ///
    /// Returns as soon as the task is accepted; ingestion runs remotely.
    async fn start_ingestion(
        &self,
        task_id: &TaskId,
        request: &IngestionRequest,
    ) -> Result<IngestionTask>;

    /// Composes the pixel-wise mean of `images`.
    ///
    /// The result is a lazy handle; no remote call is made by default.
    fn mean(&self, images: Vec<Image>) -> Result<Image> {
        if images.is_empty() {
            return Err(Error::aggregation().with_message("cannot reduce an empty collection"));
        }

        Ok(ImageCollection::from_images(images).mean())
    }

    /// Resolves the bounding polygon of the image's geometry.
    ///
    /// This is a blocking remote computation.
    async fn bounds(&self, image: &Image) -> Result<Region>;

    /// Starts exporting an image to storage.
    ///
    /// Returns as soon as the task is accepted; export runs remotely.
    async fn start_export(&self, task_id: &TaskId, request: &ExportRequest) -> Result<ExportTask>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProjectId;

    struct ComposeOnly;

    #[async_trait::async_trait]
    impl ImageryPlatform for ComposeOnly {
        async fn start_ingestion(
            &self,
            _task_id: &TaskId,
            _request: &IngestionRequest,
        ) -> Result<IngestionTask> {
            Err(Error::ingestion())
        }

        async fn bounds(&self, _image: &Image) -> Result<Region> {
            Err(Error::export())
        }

        async fn start_export(
            &self,
            _task_id: &TaskId,
            _request: &ExportRequest,
        ) -> Result<ExportTask> {
            Err(Error::export())
        }
    }

    #[test]
    fn default_mean_rejects_empty_input() {
        let error = ComposeOnly.mean(Vec::new()).unwrap_err();
        assert_eq!(error.kind(), crate::ErrorKind::Aggregation);
    }

    #[test]
    fn default_mean_composes_collection() {
        let project = ProjectId::new("p").unwrap();
        let image = Image::load(&AssetId::new(&project, "a"));
        let mean = ComposeOnly.mean(vec![image]).unwrap();
        assert_eq!(mean.expression().function(), Some("ImageCollection.reduce"));
    }

    #[tokio::test]
    async fn default_task_ids_are_fresh() {
        let first = ComposeOnly.new_task_id().await.unwrap();
        let second = ComposeOnly.new_task_id().await.unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn single_source_request_allows_overwrite() {
        let project = ProjectId::new("p").unwrap();
        let request =
            IngestionRequest::single_source(AssetId::new(&project, "a"), "gs://imgs/a.tif");
        assert!(request.allow_overwrite);
        assert_eq!(request.source_uris, ["gs://imgs/a.tif"]);
    }
}
