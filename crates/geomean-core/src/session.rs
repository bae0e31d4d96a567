//! Per-invocation sessions over the two remote collaborators.

use std::fmt;
use std::sync::Arc;

use crate::{ImageryPlatform, ObjectLister, ProjectId, Result};

/// Authenticated access to storage and the imagery platform.
///
/// A session is opened once per invocation and dropped when the invocation
/// ends; nothing in it is shared process-wide.
#[derive(Clone)]
pub struct Session {
    project: ProjectId,
    storage: Arc<dyn ObjectLister>,
    platform: Arc<dyn ImageryPlatform>,
}

impl Session {
    /// Creates a session from its parts.
    pub fn new(
        project: ProjectId,
        storage: impl ObjectLister + 'static,
        platform: impl ImageryPlatform + 'static,
    ) -> Self {
        Self {
            project,
            storage: Arc::new(storage),
            platform: Arc::new(platform),
        }
    }

    /// Returns the project the session is scoped to.
    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    /// Returns the storage collaborator.
    pub fn storage(&self) -> &dyn ObjectLister {
        self.storage.as_ref()
    }

    /// Returns the imagery platform collaborator.
    pub fn platform(&self) -> &dyn ImageryPlatform {
        self.platform.as_ref()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("project", &self.project)
            .finish_non_exhaustive()
    }
}

/// Opens sessions: resolves credentials and connects both collaborators.
#[async_trait::async_trait]
pub trait SessionProvider: Send + Sync {
    /// Authenticates and returns a session for one invocation.
    async fn open_session(&self) -> Result<Session>;
}
