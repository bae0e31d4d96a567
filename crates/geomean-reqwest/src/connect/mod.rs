//! Reqwest client module.
//!
//! This module provides the HTTP client shared by every remote call the
//! pipeline makes.

mod client;
mod config;

pub use client::{ReqwestClient, TRACING_TARGET};
pub use config::{DEFAULT_TIMEOUT_SECS, ReqwestConfig};
