//! # Application State
//!
//! Shared state for the Axum application: the record lifecycle façade
//! behind an `Arc`, generic over the compute provider so the same
//! routes serve the mock in tests and a real capability in production.

use std::sync::Arc;

use crs_compute::ConfidentialCompute;

use crate::service::RecordLifecycleApi;

/// Shared application state passed to all route handlers.
pub struct AppState<P> {
    /// The record lifecycle façade.
    pub api: Arc<RecordLifecycleApi<P>>,
}

// Manual impl: `P` itself need not be `Clone`, only the `Arc` is cloned.
impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
        }
    }
}

impl<P: ConfidentialCompute> AppState<P> {
    /// Wrap a façade as application state.
    pub fn new(api: RecordLifecycleApi<P>) -> Self {
        Self { api: Arc::new(api) }
    }
}
