//! Storage collaborator trait.

use futures::stream::BoxStream;

use crate::{Result, StorageObject};

/// Lists the objects held in a storage bucket.
///
/// Implementations return a lazy stream: pages are fetched as the caller
/// polls, and calling [`list_objects`](Self::list_objects) again restarts the
/// enumeration from the beginning.
pub trait ObjectLister: Send + Sync {
    /// Streams every object in `bucket`, in the order the backend returns them.
    fn list_objects<'a>(&'a self, bucket: &'a str) -> BoxStream<'a, Result<StorageObject>>;
}
