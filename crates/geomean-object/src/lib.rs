#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for storage listing.
pub const TRACING_TARGET: &str = "geomean_object::lister";

mod config;
mod lister;

pub use crate::config::{DEFAULT_STORAGE_TIMEOUT_SECS, ObjectConfig};
pub use crate::lister::GcsLister;
