//! # Health Probes
//!
//! Kubernetes-style liveness and readiness endpoints. Unauthenticated
//! and state-agnostic; the store and mock provider have no warm-up
//! phase, so readiness follows liveness.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

/// Build the health router for any application state.
pub fn router<S: Clone + Send + Sync + 'static>() -> Router<S> {
    Router::new()
        .route("/health/live", get(live))
        .route("/health/ready", get(ready))
}

/// GET /health/live — process is up.
async fn live() -> Json<serde_json::Value> {
    Json(json!({ "status": "live" }))
}

/// GET /health/ready — ready to serve traffic.
async fn ready() -> Json<serde_json::Value> {
    Json(json!({ "status": "ready" }))
}
