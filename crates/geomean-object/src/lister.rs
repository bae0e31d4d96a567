//! Bucket listing through [`object_store`]'s Google Cloud Storage backend.

use std::fmt;
use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use geomean_core::{Error, ObjectLister, Result, StorageObject};
use object_store::gcp::{GcpCredential, GoogleCloudStorage, GoogleCloudStorageBuilder};
use object_store::{ClientOptions, ObjectMeta, ObjectStore, RetryConfig, StaticCredentialProvider};

use crate::{ObjectConfig, TRACING_TARGET};

/// Lists Cloud Storage buckets with a bearer token.
///
/// The token is the one the session resolved for the imagery platform, so a
/// single ambient credential covers both collaborators.
#[derive(Clone)]
pub struct GcsLister {
    config: ObjectConfig,
    bearer: Arc<str>,
}

impl GcsLister {
    /// Creates a lister authenticating with `bearer`.
    pub fn new(config: ObjectConfig, bearer: impl Into<Arc<str>>) -> Self {
        Self {
            config,
            bearer: bearer.into(),
        }
    }

    /// Returns the lister configuration.
    pub fn config(&self) -> &ObjectConfig {
        &self.config
    }

    /// Builds a store over `bucket`.
    ///
    /// Requests are not retried.
    pub fn store(&self, bucket: &str) -> Result<GoogleCloudStorage> {
        let credentials = StaticCredentialProvider::new(GcpCredential {
            bearer: self.bearer.to_string(),
        });

        let retry = RetryConfig {
            max_retries: 0,
            ..RetryConfig::default()
        };

        GoogleCloudStorageBuilder::new()
            .with_bucket_name(bucket)
            .with_credentials(Arc::new(credentials))
            .with_client_options(ClientOptions::new().with_timeout(self.config.effective_timeout()))
            .with_retry(retry)
            .build()
            .map_err(|e| from_object_store(e, bucket))
    }
}

impl fmt::Debug for GcsLister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcsLister")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ObjectLister for GcsLister {
    fn list_objects<'a>(&'a self, bucket: &'a str) -> BoxStream<'a, Result<StorageObject>> {
        let store = match self.store(bucket) {
            Ok(store) => store,
            Err(error) => return stream::once(async move { Err(error) }).boxed(),
        };

        tracing::debug!(target: TRACING_TARGET, bucket, "Listing bucket");

        store
            .list(None)
            .map_ok(move |meta| into_object(bucket, meta))
            .map_err(move |e| from_object_store(e, bucket))
            .inspect_err(move |error| {
                tracing::warn!(target: TRACING_TARGET, bucket, error = %error, "Listing failed");
            })
            .boxed()
    }
}

fn into_object(bucket: &str, meta: ObjectMeta) -> StorageObject {
    StorageObject::new(bucket, meta.location.to_string())
}

/// Converts an [`object_store::Error`] into a storage error.
pub(crate) fn from_object_store(error: object_store::Error, bucket: &str) -> Error {
    Error::storage()
        .with_message(format!("cannot list bucket '{bucket}'"))
        .with_context(error.to_string())
        .with_source(error)
}

#[cfg(test)]
mod tests {
    use geomean_core::ErrorKind;
    use object_store::path::Path;

    use super::*;

    #[test]
    fn builds_store_offline() {
        let lister = GcsLister::new(ObjectConfig::default(), "token");
        assert!(lister.store("imgs").is_ok());
        assert!(!format!("{lister:?}").contains("token"));
    }

    #[test]
    fn maps_listing_entries() {
        let meta = ObjectMeta {
            location: Path::from("scenes/site_42.tif"),
            last_modified: Default::default(),
            size: 1024,
            e_tag: None,
            version: None,
        };

        let object = into_object("imgs", meta);
        assert_eq!(object.source_uri(), "gs://imgs/scenes/site_42.tif");
        assert_eq!(object.title(), "scenes/site_42");
    }

    #[test]
    fn store_errors_are_storage_errors() {
        let error = from_object_store(
            object_store::Error::NotFound {
                path: "imgs".into(),
                source: "missing".into(),
            },
            "imgs",
        );
        assert_eq!(error.kind(), ErrorKind::Storage);
    }
}
