//! JSON wire types of the Earth Engine REST API.

mod expression;
mod request;

pub use expression::{EeExpression, ValueNode};
pub use request::{
    CloudStorageDestination, ComputeValueRequest, ComputeValueResponse, ErrorBody, ErrorStatus,
    ExportImageRequest, FileExportOptions, ImageManifest, ImageSource, ImportImageRequest,
    Operation, Tileset,
};
