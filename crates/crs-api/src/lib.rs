//! # crs-api — Stakeholder-Facing Surface
//!
//! The record lifecycle façade and its Axum HTTP routes.
//!
//! ## API Surface
//!
//! | Route                              | Operation                       |
//! |------------------------------------|---------------------------------|
//! | `POST /v1/records`                 | Create a confidential record    |
//! | `GET  /v1/records`                 | List records (filtered)         |
//! | `GET  /v1/records/{id}`            | Get one record                  |
//! | `POST /v1/records/{id}/verification` | Request decrypt-and-verify   |
//! | `GET  /health/live`, `/health/ready` | Probes (unauthenticated)     |
//! | `GET  /openapi.json`               | OpenAPI spec                    |
//!
//! ## Crate Policy
//!
//! - No business logic in route handlers — they translate wire shapes
//!   and delegate to [`RecordLifecycleApi`].
//! - All errors map to structured JSON bodies via [`ApiError`], which
//!   distinguishes retryable provider outages (503) from integrity
//!   concerns (502/500) and caller mistakes (404/409/422).
//! - Generic over the compute provider: the same router serves the mock
//!   in tests and a real capability in production.

pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod service;
pub mod state;

use axum::routing::get;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crs_compute::ConfidentialCompute;

pub use error::ApiError;
pub use service::RecordLifecycleApi;
pub use state::AppState;

/// Assemble the full application router.
pub fn app<P: ConfidentialCompute + 'static>(state: AppState<P>) -> Router {
    Router::new()
        .merge(routes::records::router::<P>())
        .merge(routes::health::router())
        .route("/openapi.json", get(openapi_json))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// GET /openapi.json — the assembled OpenAPI spec.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi::ApiDoc::openapi())
}
