//! In-memory fakes of the pipeline's collaborators.
//!
//! The fakes record every call they receive so tests can assert on the
//! number and shape of remote operations without any network access.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! geomean-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use geomean_core::mock::{MockPlatform, MockSessionProvider, MockStorage};
//! use geomean_core::{Pipeline, PipelineConfig, Trigger, TriggerEvent};
//!
//! let storage = MockStorage::default().with_objects("imgs", ["a.tif", "b.tif"]);
//! let platform = MockPlatform::default();
//! let provider = MockSessionProvider::new("demo", storage, platform.clone())?;
//!
//! let pipeline = Pipeline::new(provider, PipelineConfig::default());
//! let report = pipeline.run(&Trigger::from(TriggerEvent::for_bucket("imgs"))).await?;
//!
//! assert_eq!(report.ingested.len(), 2);
//! assert_eq!(platform.exports().len(), 1);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::stream::{self, BoxStream, StreamExt};

use crate::image::{Expression, Image, ImageCollection, Region};
use crate::{
    Error, ExportRequest, ExportTask, ImageryPlatform, IngestionRequest, IngestionTask, ObjectLister,
    ProjectId, Result, Session, SessionProvider, StorageObject, TaskId,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory bucket listing.
#[derive(Debug, Clone, Default)]
pub struct MockStorage {
    inner: Arc<StorageState>,
}

#[derive(Debug, Default)]
struct StorageState {
    buckets: Mutex<BTreeMap<String, Vec<String>>>,
    failing: Mutex<BTreeSet<String>>,
    listings: AtomicUsize,
}

impl MockStorage {
    /// Adds objects to `bucket`, in listing order.
    pub fn with_objects<I, S>(self, bucket: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lock(&self.inner.buckets)
            .entry(bucket.to_owned())
            .or_default()
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Makes listing `bucket` fail with a storage error.
    pub fn with_failing_bucket(self, bucket: &str) -> Self {
        lock(&self.inner.failing).insert(bucket.to_owned());
        self
    }

    /// Returns how many listings were started.
    pub fn listings(&self) -> usize {
        self.inner.listings.load(Ordering::SeqCst)
    }
}

impl ObjectLister for MockStorage {
    fn list_objects<'a>(&'a self, bucket: &'a str) -> BoxStream<'a, Result<StorageObject>> {
        self.inner.listings.fetch_add(1, Ordering::SeqCst);

        if lock(&self.inner.failing).contains(bucket) {
            let error = Error::storage().with_message(format!("cannot list bucket '{bucket}'"));
            return stream::once(async move { Err(error) }).boxed();
        }

        let names = lock(&self.inner.buckets)
            .get(bucket)
            .cloned()
            .unwrap_or_default();

        stream::iter(names)
            .map(move |name| Ok(StorageObject::new(bucket, name)))
            .boxed()
    }
}

/// Recording fake of the imagery platform.
///
/// Ingested assets can be given pixel values through
/// [`with_raster`](Self::with_raster); [`evaluate`](Self::evaluate) then
/// computes any composed image numerically.
#[derive(Debug, Clone, Default)]
pub struct MockPlatform {
    inner: Arc<PlatformState>,
}

#[derive(Debug, Default)]
struct PlatformState {
    ingestions: Mutex<Vec<IngestionRequest>>,
    means: Mutex<Vec<usize>>,
    bounds: Mutex<Vec<Image>>,
    exports: Mutex<Vec<ExportRequest>>,
    rasters: Mutex<BTreeMap<String, Vec<f64>>>,
    failing_sources: Mutex<BTreeSet<String>>,
    region: Mutex<Option<Region>>,
    fail_bounds: Mutex<bool>,
    fail_export: Mutex<bool>,
}

impl MockPlatform {
    /// Assigns pixel values to the asset ingested from `source_uri`.
    pub fn with_raster(self, source_uri: &str, pixels: impl Into<Vec<f64>>) -> Self {
        lock(&self.inner.rasters).insert(source_uri.to_owned(), pixels.into());
        self
    }

    /// Makes ingesting `source_uri` fail with an ingestion error.
    pub fn with_failing_source(self, source_uri: &str) -> Self {
        lock(&self.inner.failing_sources).insert(source_uri.to_owned());
        self
    }

    /// Sets the region returned by [`bounds`](ImageryPlatform::bounds).
    pub fn with_region(self, region: Region) -> Self {
        *lock(&self.inner.region) = Some(region);
        self
    }

    /// Makes bounds resolution fail with an export error.
    pub fn with_failing_bounds(self) -> Self {
        *lock(&self.inner.fail_bounds) = true;
        self
    }

    /// Makes export submission fail with an export error.
    pub fn with_failing_export(self) -> Self {
        *lock(&self.inner.fail_export) = true;
        self
    }

    /// Returns the region [`bounds`](ImageryPlatform::bounds) resolves to.
    pub fn region(&self) -> Region {
        lock(&self.inner.region)
            .clone()
            .unwrap_or_else(|| Region::rectangle(-122.5, 37.5, -122.0, 38.0))
    }

    /// Returns every accepted ingestion, in submission order.
    pub fn ingestions(&self) -> Vec<IngestionRequest> {
        lock(&self.inner.ingestions).clone()
    }

    /// Returns the input size of every mean composition.
    pub fn means(&self) -> Vec<usize> {
        lock(&self.inner.means).clone()
    }

    /// Returns every image whose bounds were resolved.
    pub fn bounds_calls(&self) -> Vec<Image> {
        lock(&self.inner.bounds).clone()
    }

    /// Returns every accepted export, in submission order.
    pub fn exports(&self) -> Vec<ExportRequest> {
        lock(&self.inner.exports).clone()
    }

    /// Computes the pixel values of `image`.
    ///
    /// Supports asset loads, mean reductions over image lists, and clipping
    /// (which leaves pixels unchanged).
    pub fn evaluate(&self, image: &Image) -> Result<Vec<f64>> {
        self.evaluate_expression(image.expression())
    }

    fn evaluate_expression(&self, expression: &Expression) -> Result<Vec<f64>> {
        match expression.function() {
            Some("Image.load") => {
                let asset_id = Image::from_expression(expression.clone())
                    .asset_id()
                    .map(str::to_owned)
                    .ok_or_else(|| Error::invalid_input().with_message("image load without id"))?;
                self.asset_pixels(&asset_id)
            }
            Some("Image.clipToBoundsAndScale") => {
                let input = expression
                    .argument("input")
                    .ok_or_else(|| Error::invalid_input().with_message("clip without input"))?;
                self.evaluate_expression(input)
            }
            Some("ImageCollection.reduce") => {
                let reducer = expression.argument("reducer").and_then(Expression::function);
                if reducer != Some("Reducer.mean") {
                    return Err(Error::aggregation().with_message("unsupported reducer"));
                }

                let images = expression
                    .argument("collection")
                    .and_then(|collection| collection.argument("images"))
                    .and_then(Expression::as_array)
                    .ok_or_else(|| Error::aggregation().with_message("reduce without images"))?;

                let rasters = images
                    .iter()
                    .map(|image| self.evaluate_expression(image))
                    .collect::<Result<Vec<_>>>()?;
                pixel_mean(&rasters)
            }
            other => Err(Error::invalid_input()
                .with_message(format!("cannot evaluate function {other:?}"))),
        }
    }

    fn asset_pixels(&self, asset_id: &str) -> Result<Vec<f64>> {
        let source = lock(&self.inner.ingestions)
            .iter()
            .rev()
            .find(|request| request.asset_id.as_str() == asset_id)
            .and_then(|request| request.source_uris.first().cloned())
            .ok_or_else(|| {
                Error::invalid_input().with_message(format!("asset '{asset_id}' was never ingested"))
            })?;

        lock(&self.inner.rasters)
            .get(&source)
            .cloned()
            .ok_or_else(|| Error::invalid_input().with_message(format!("no raster for '{source}'")))
    }
}

fn pixel_mean(rasters: &[Vec<f64>]) -> Result<Vec<f64>> {
    let Some(first) = rasters.first() else {
        return Err(Error::aggregation().with_message("cannot reduce an empty collection"));
    };

    if rasters.iter().any(|raster| raster.len() != first.len()) {
        return Err(Error::aggregation().with_message("rasters differ in size"));
    }

    let count = rasters.len() as f64;
    Ok((0..first.len())
        .map(|pixel| rasters.iter().map(|raster| raster[pixel]).sum::<f64>() / count)
        .collect())
}

#[async_trait::async_trait]
impl ImageryPlatform for MockPlatform {
    async fn start_ingestion(
        &self,
        task_id: &TaskId,
        request: &IngestionRequest,
    ) -> Result<IngestionTask> {
        let failing = lock(&self.inner.failing_sources);
        if let Some(source) = request.source_uris.iter().find(|uri| failing.contains(*uri)) {
            return Err(Error::ingestion().with_message(format!("cannot ingest '{source}'")));
        }
        drop(failing);

        lock(&self.inner.ingestions).push(request.clone());
        Ok(IngestionTask {
            task_id: task_id.clone(),
            operation: Some(format!("operations/{task_id}")),
        })
    }

    fn mean(&self, images: Vec<Image>) -> Result<Image> {
        lock(&self.inner.means).push(images.len());
        if images.is_empty() {
            return Err(Error::aggregation().with_message("cannot reduce an empty collection"));
        }

        Ok(ImageCollection::from_images(images).mean())
    }

    async fn bounds(&self, image: &Image) -> Result<Region> {
        lock(&self.inner.bounds).push(image.clone());
        if *lock(&self.inner.fail_bounds) {
            return Err(Error::export().with_message("cannot resolve image bounds"));
        }

        Ok(self.region())
    }

    async fn start_export(&self, task_id: &TaskId, request: &ExportRequest) -> Result<ExportTask> {
        if *lock(&self.inner.fail_export) {
            return Err(Error::export().with_message("export quota exceeded"));
        }

        lock(&self.inner.exports).push(request.clone());
        Ok(ExportTask {
            task_id: task_id.clone(),
            operation: Some(format!("operations/{task_id}")),
            destination: request.destination(),
        })
    }
}

/// Hands out sessions over fixed fakes.
#[derive(Debug, Clone)]
pub struct MockSessionProvider {
    project: ProjectId,
    storage: MockStorage,
    platform: MockPlatform,
    failing: bool,
    opened: Arc<AtomicUsize>,
}

impl MockSessionProvider {
    /// Creates a provider whose sessions use `storage` and `platform`.
    pub fn new(project: &str, storage: MockStorage, platform: MockPlatform) -> Result<Self> {
        Ok(Self {
            project: ProjectId::new(project)?,
            storage,
            platform,
            failing: false,
            opened: Arc::default(),
        })
    }

    /// Makes opening a session fail with an authentication error.
    pub fn with_failing_authentication(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Returns how many sessions were opened.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SessionProvider for MockSessionProvider {
    async fn open_session(&self) -> Result<Session> {
        if self.failing {
            return Err(Error::authentication().with_message("no ambient credentials found"));
        }

        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Session::new(
            self.project.clone(),
            self.storage.clone(),
            self.platform.clone(),
        ))
    }
}
