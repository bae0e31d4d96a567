#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

//! # Example
//!
//! ```rust,ignore
//! use geomean_reqwest::{CredentialsConfig, GoogleAuth, ReqwestClient, ReqwestConfig};
//!
//! let client = ReqwestClient::new(ReqwestConfig::default())?;
//! let auth = GoogleAuth::new(client, CredentialsConfig::default());
//!
//! let credentials = auth.authenticate().await?;
//! println!("project: {}", credentials.project);
//! ```

mod auth;
mod connect;
mod error;

pub use crate::auth::{
    AccessToken, AuthorizedUser, CredentialSource, CredentialsConfig, CredentialsFile,
    DEFAULT_METADATA_HOST, DEFAULT_TOKEN_URI, GoogleAuth, GoogleCredentials, MetadataServer,
    SCOPES, ServiceAccountKey, TRACING_TARGET_AUTH, WELL_KNOWN_FILE,
};
pub use crate::connect::{DEFAULT_TIMEOUT_SECS, ReqwestClient, ReqwestConfig, TRACING_TARGET};
pub use crate::error::{Error, Result};
