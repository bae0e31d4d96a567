//! Application state and dependency injection.

use geomean_core::{Pipeline, PipelineConfig, SessionProvider};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    pipeline: Pipeline,
}

impl ServiceState {
    /// Creates state around an already configured pipeline.
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    /// Creates state whose pipeline opens sessions from `provider`.
    pub fn from_provider(provider: impl SessionProvider + 'static, config: PipelineConfig) -> Self {
        Self::new(Pipeline::new(provider, config))
    }

    /// Returns the pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(pipeline: Pipeline);
