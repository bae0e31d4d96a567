//! Objects discovered in the triggering bucket.

use serde::{Deserialize, Serialize};

/// URI scheme of Cloud Storage source paths.
pub const STORAGE_SCHEME: &str = "gs";

/// A single object listed from a storage bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageObject {
    /// Bucket that holds the object.
    pub bucket: String,
    /// Full object name, including any `/`-separated prefix.
    pub name: String,
}

impl StorageObject {
    /// Creates a new storage object reference.
    pub fn new(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            name: name.into(),
        }
    }

    /// Returns the `gs://<bucket>/<name>` source path.
    pub fn source_uri(&self) -> String {
        storage_uri(&self.bucket, &self.name)
    }

    /// Returns the human-readable title: the name without its final extension.
    ///
    /// Everything from the last `.` onwards is dropped; a name without any
    /// `.` is returned whole.
    pub fn title(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map_or(self.name.as_str(), |(stem, _)| stem)
    }
}

/// Formats a `gs://<bucket>/<name>` path.
pub fn storage_uri(bucket: &str, name: &str) -> String {
    format!("{STORAGE_SCHEME}://{bucket}/{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_strips_final_extension() {
        assert_eq!(StorageObject::new("imgs", "site_42.tif").title(), "site_42");
        assert_eq!(StorageObject::new("imgs", "scene.v2.tif").title(), "scene.v2");
        assert_eq!(StorageObject::new("imgs", "2024/a.tif").title(), "2024/a");
    }

    #[test]
    fn title_without_extension_is_whole_name() {
        assert_eq!(StorageObject::new("imgs", "mean_image").title(), "mean_image");
    }

    #[test]
    fn source_uri_joins_bucket_and_name() {
        let object = StorageObject::new("imgs", "a.tif");
        assert_eq!(object.source_uri(), "gs://imgs/a.tif");
        assert_eq!(storage_uri("imgs", "mean_image"), "gs://imgs/mean_image");
    }
}
