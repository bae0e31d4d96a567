//! Identifiers for projects, image assets and remote tasks.

use derive_more::{AsRef, Display};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Cloud project that owns the ingested assets and runs the remote tasks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, AsRef, Serialize, Deserialize)]
#[as_ref(str)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Creates a project id, rejecting empty or path-like values.
    pub fn new(project: impl Into<String>) -> Result<Self> {
        let project = project.into();
        let trimmed = project.trim();

        if trimmed.is_empty() {
            return Err(Error::configuration().with_message("project id must not be empty"));
        }

        if trimmed.contains('/') {
            return Err(Error::configuration()
                .with_message("project id must not contain '/'")
                .with_context(project));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the project id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Path of an image asset on the imagery platform.
///
/// Always of the form `projects/<project>/assets/<title>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, AsRef, Serialize, Deserialize)]
#[as_ref(str)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    /// Builds the asset id for `title` under `project`.
    pub fn new(project: &ProjectId, title: &str) -> Self {
        Self(format!("projects/{project}/assets/{title}"))
    }

    /// Returns the asset id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the trailing title segment.
    pub fn title(&self) -> &str {
        self.0
            .split_once("/assets/")
            .map_or(self.0.as_str(), |(_, title)| title)
    }
}

/// Identifier of a remote task, used as the request id of the submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, AsRef, Serialize, Deserialize)]
#[as_ref(str)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Allocates a fresh random task id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the task id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_id_is_deterministic() {
        let project = ProjectId::new("p").unwrap();
        let first = AssetId::new(&project, "t");
        let second = AssetId::new(&project, "t");

        assert_eq!(first.as_str(), "projects/p/assets/t");
        assert_eq!(first, second);
        assert_eq!(first.title(), "t");
    }

    #[test]
    fn asset_title_keeps_nested_segments() {
        let project = ProjectId::new("earth").unwrap();
        let asset = AssetId::new(&project, "2024/site_42");
        assert_eq!(asset.as_str(), "projects/earth/assets/2024/site_42");
        assert_eq!(asset.title(), "2024/site_42");
    }

    #[test]
    fn project_id_rejects_invalid_values() {
        assert!(ProjectId::new("").is_err());
        assert!(ProjectId::new("   ").is_err());
        assert!(ProjectId::new("a/b").is_err());
        assert_eq!(ProjectId::new(" my-proj ").unwrap().as_str(), "my-proj");
    }

    #[test]
    fn generated_task_ids_are_unique() {
        let first = TaskId::generate();
        let second = TaskId::generate();
        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 36);
    }
}
