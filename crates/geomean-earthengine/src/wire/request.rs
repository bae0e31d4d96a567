//! Request and response bodies of the REST methods in use.

use geomean_core::{ExportRequest, Image, IngestionRequest, TaskId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::EeExpression;

/// Body of `projects.image.import`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportImageRequest {
    /// Manifest of the asset to create.
    pub image_manifest: ImageManifest,
    /// Client-chosen id making the submission idempotent.
    pub request_id: String,
    /// Whether an existing asset may be replaced.
    pub overwrite: bool,
}

impl ImportImageRequest {
    /// Builds the import body of an ingestion.
    pub fn new(task_id: &TaskId, request: &IngestionRequest) -> Self {
        Self {
            image_manifest: ImageManifest {
                name: request.asset_id.to_string(),
                tilesets: vec![Tileset {
                    sources: vec![ImageSource {
                        uris: request.source_uris.clone(),
                    }],
                }],
            },
            request_id: task_id.to_string(),
            overwrite: request.allow_overwrite,
        }
    }
}

/// Describes an image asset and its source files.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageManifest {
    /// Asset name, `projects/<project>/assets/<title>`.
    pub name: String,
    /// Tilesets making up the image.
    pub tilesets: Vec<Tileset>,
}

/// A group of source files sharing a footprint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tileset {
    /// Source files of the tileset.
    pub sources: Vec<ImageSource>,
}

/// A source file reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSource {
    /// Cloud Storage URIs of the file.
    pub uris: Vec<String>,
}

/// Body of `projects.value.compute`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputeValueRequest {
    /// Graph to evaluate.
    pub expression: EeExpression,
}

/// Response of `projects.value.compute`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComputeValueResponse {
    /// The computed value.
    #[serde(default)]
    pub result: Value,
}

/// Body of `projects.image.export`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportImageRequest {
    /// Graph of the image to export.
    pub expression: EeExpression,
    /// Human-readable task description.
    pub description: String,
    /// Output format and destination.
    pub file_export_options: FileExportOptions,
    /// Client-chosen id making the submission idempotent.
    pub request_id: String,
}

impl ExportImageRequest {
    /// Builds the export body, clipping the image to the request's region
    /// and scale.
    pub fn new(task_id: &TaskId, request: &ExportRequest, file_format: &str) -> Self {
        let image: Image = request
            .image
            .clip_to_bounds_and_scale(&request.region, request.scale);

        Self {
            expression: EeExpression::from(image.expression()),
            description: request.description.clone(),
            file_export_options: FileExportOptions {
                file_format: file_format.to_owned(),
                cloud_storage_destination: CloudStorageDestination {
                    bucket: request.bucket.clone(),
                    filename_prefix: request.file_name_prefix.clone(),
                },
            },
            request_id: task_id.to_string(),
        }
    }
}

/// Format and destination of a file export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileExportOptions {
    /// Output file format, e.g. `GEO_TIFF`.
    pub file_format: String,
    /// Destination bucket and prefix.
    pub cloud_storage_destination: CloudStorageDestination,
}

/// A Cloud Storage export destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudStorageDestination {
    /// Destination bucket.
    pub bucket: String,
    /// Object name prefix.
    pub filename_prefix: String,
}

/// A long-running operation handle.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Operation {
    /// Operation name, `projects/<project>/operations/<id>`.
    #[serde(default)]
    pub name: Option<String>,
    /// Whether the operation already finished.
    #[serde(default)]
    pub done: bool,
}

/// Error body returned by the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorBody {
    /// The error status.
    pub error: ErrorStatus,
}

/// A `google.rpc.Status`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorStatus {
    /// HTTP-equivalent code.
    #[serde(default)]
    pub code: u16,
    /// Developer-facing message.
    #[serde(default)]
    pub message: String,
    /// Canonical status name, e.g. `INVALID_ARGUMENT`.
    #[serde(default)]
    pub status: Option<String>,
}
