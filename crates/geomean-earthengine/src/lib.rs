#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for Earth Engine client operations.
pub const TRACING_TARGET_CLIENT: &str = "geomean_earthengine::client";

mod client;
mod config;
mod error;
mod platform;

pub mod wire;

pub use crate::client::EarthEngineClient;
pub use crate::config::{DEFAULT_BASE_URL, DEFAULT_FILE_FORMAT, EarthEngineConfig};
pub use crate::error::{Error, Result};
