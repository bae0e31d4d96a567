//! [`ImageryPlatform`] implementation over the REST API.

use geomean_core::{
    ErrorKind, ExportRequest, ExportTask, Image, ImageryPlatform, IngestionRequest, IngestionTask,
    Region, TaskId,
};

use crate::wire::{
    ComputeValueRequest, ComputeValueResponse, EeExpression, ExportImageRequest,
    ImportImageRequest, Operation,
};
use crate::{EarthEngineClient, TRACING_TARGET_CLIENT};

#[async_trait::async_trait]
impl ImageryPlatform for EarthEngineClient {
    async fn start_ingestion(
        &self,
        task_id: &TaskId,
        request: &IngestionRequest,
    ) -> geomean_core::Result<IngestionTask> {
        let body = ImportImageRequest::new(task_id, request);
        let operation: Operation = self
            .post("image:import", &body)
            .await
            .map_err(|e| e.into_stage(ErrorKind::Ingestion))?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            asset_id = %request.asset_id,
            operation = ?operation.name,
            "Ingestion accepted"
        );

        Ok(IngestionTask {
            task_id: task_id.clone(),
            operation: operation.name,
        })
    }

    async fn bounds(&self, image: &Image) -> geomean_core::Result<Region> {
        let bounds = image.geometry().bounds();
        let body = ComputeValueRequest {
            expression: EeExpression::from(bounds.expression()),
        };

        let response: ComputeValueResponse = self
            .post("value:compute", &body)
            .await
            .map_err(|e| e.into_stage(ErrorKind::Export))?;

        Region::from_geojson(response.result).map_err(|e| e.with_kind(ErrorKind::Export))
    }

    async fn start_export(
        &self,
        task_id: &TaskId,
        request: &ExportRequest,
    ) -> geomean_core::Result<ExportTask> {
        let body = ExportImageRequest::new(task_id, request, &self.config().file_format);
        let operation: Operation = self
            .post("image:export", &body)
            .await
            .map_err(|e| e.into_stage(ErrorKind::Export))?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            destination = %request.destination(),
            operation = ?operation.name,
            "Export accepted"
        );

        Ok(ExportTask {
            task_id: task_id.clone(),
            operation: operation.name,
            destination: request.destination(),
        })
    }
}
