//! # crs-cli — Command Handlers
//!
//! Subcommand implementations for the `crs` binary. Each module owns its
//! clap args struct and an async `run()` entry point; `main.rs` only
//! parses and dispatches.

pub mod demo;
pub mod serve;

use std::sync::Arc;

use crs_api::{AppState, RecordLifecycleApi};
use crs_compute::{AccessContext, MockConfidentialCompute};
use crs_protocol::VerificationCoordinator;
use crs_store::RecordStore;

/// Access context the in-process stack encrypts and decrypts under.
const SERVICE_CONTEXT: &str = "crs-service";

/// Assemble the in-process stack around a given provider.
pub fn assemble(
    provider: MockConfidentialCompute,
) -> Arc<RecordLifecycleApi<MockConfidentialCompute>> {
    let coordinator = VerificationCoordinator::new(
        Arc::new(RecordStore::new()),
        Arc::new(provider),
        AccessContext::for_verification(SERVICE_CONTEXT),
    );
    Arc::new(RecordLifecycleApi::new(coordinator))
}

/// Wrap an assembled façade as Axum application state.
pub fn app_state(
    api: Arc<RecordLifecycleApi<MockConfidentialCompute>>,
) -> AppState<MockConfidentialCompute> {
    AppState { api }
}
