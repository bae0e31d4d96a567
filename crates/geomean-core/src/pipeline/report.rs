use serde::Serialize;

use crate::{AssetId, ExportTask, Image, StorageObject, TaskId};

/// One storage object registered as an image asset.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedAsset {
    /// The source object.
    pub object: StorageObject,
    /// Title derived from the object name.
    pub title: String,
    /// Asset the object was ingested into.
    pub asset_id: AssetId,
    /// Ingestion task id.
    pub task_id: TaskId,
    /// Lazy handle to the (possibly still ingesting) asset.
    pub image: Image,
}

/// Outcome of one pipeline invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    /// Bucket the invocation processed.
    pub bucket: String,
    /// Every object ingested, in listing order.
    pub ingested: Vec<IngestedAsset>,
    /// The started export, absent when the bucket was empty.
    pub export: Option<ExportTask>,
}

impl PipelineReport {
    /// Returns whether no objects were found.
    pub fn is_empty(&self) -> bool {
        self.ingested.is_empty()
    }

    /// Returns a serializable summary of the report.
    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            bucket: self.bucket.clone(),
            ingested: self
                .ingested
                .iter()
                .map(|asset| IngestedSummary {
                    source: asset.object.source_uri(),
                    asset_id: asset.asset_id.clone(),
                    task_id: asset.task_id.clone(),
                })
                .collect(),
            export: self.export.clone(),
        }
    }
}

/// Wire form of a [`PipelineReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSummary {
    /// Bucket the invocation processed.
    pub bucket: String,
    /// Every object ingested, in listing order.
    pub ingested: Vec<IngestedSummary>,
    /// The started export, absent when the bucket was empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportTask>,
}

/// Wire form of an [`IngestedAsset`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestedSummary {
    /// `gs://` URI of the source object.
    pub source: String,
    /// Asset the object was ingested into.
    pub asset_id: AssetId,
    /// Ingestion task id.
    pub task_id: TaskId,
}
