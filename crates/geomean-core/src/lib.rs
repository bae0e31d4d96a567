#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

//! # Geomean Core
//!
//! Domain types and the ingest-and-average pipeline, independent of any
//! concrete storage or imagery backend. Backends plug in through the
//! [`ObjectLister`] and [`ImageryPlatform`] traits, and a
//! [`SessionProvider`] hands out one authenticated [`Session`] per
//! invocation.

/// Tracing target for pipeline stages.
pub const TRACING_TARGET_PIPELINE: &str = "geomean_core::pipeline";

mod asset;
mod error;
mod event;
mod object;
mod platform;
mod session;
mod storage;

pub mod image;
pub mod pipeline;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;

pub use asset::{AssetId, ProjectId, TaskId};
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use event::{Trigger, TriggerContext, TriggerEvent};
pub use image::{Expression, Geometry, Image, ImageCollection, Region};
pub use object::{STORAGE_SCHEME, StorageObject, storage_uri};
pub use pipeline::{IngestedAsset, Pipeline, PipelineConfig, PipelineReport, PipelineSummary};
pub use platform::{ExportRequest, ExportTask, ImageryPlatform, IngestionRequest, IngestionTask};
pub use session::{Session, SessionProvider};
pub use storage::ObjectLister;
