//! # Record Lifecycle API
//!
//! Routes:
//! - POST /v1/records — create a confidential record
//! - GET  /v1/records — list records (owner/status/tag filter)
//! - GET  /v1/records/{id} — get one record
//! - POST /v1/records/{id}/verification — request decrypt-and-verify
//!
//! Handlers hold no business logic; they translate between wire shapes
//! and the [`RecordLifecycleApi`](crate::service::RecordLifecycleApi)
//! façade.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crs_compute::ConfidentialCompute;
use crs_core::{LifecycleTag, OwnerId, PublicAttributes, RecordId};
use crs_store::{Record, RecordFilter, RecordStatus};

use crate::error::ApiError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

// ─── Wire Types ──────────────────────────────────────────────────────

/// Request to create a confidential record.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRecordRequest {
    /// Caller-assigned record identifier; generated when omitted.
    #[serde(default)]
    pub record_id: Option<Uuid>,
    /// Identity of the record owner.
    pub owner_id: String,
    /// Short display name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Logistics stage tag: MANUFACTURED, IN_TRANSIT, or DELIVERED.
    pub tag: String,
    /// The confidential value; encrypted before it reaches the store.
    pub secret_value: u64,
}

impl Validate for CreateRecordRequest {
    fn validate(&self) -> Result<(), crs_core::FieldError> {
        if self.owner_id.trim().is_empty() {
            return Err(crs_core::FieldError::new("owner_id", "must not be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(crs_core::FieldError::new("name", "must not be empty"));
        }
        Ok(())
    }
}

/// One record as returned by the API. The clear value appears only once
/// the record is VERIFIED.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordResponse {
    pub record_id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub tag: String,
    pub status: String,
    pub ciphertext_handle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clear_value: Option<u64>,
    pub version: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Record> for RecordResponse {
    fn from(record: Record) -> Self {
        Self {
            record_id: *record.id.as_uuid(),
            owner_id: record.owner.to_string(),
            name: record.public_attributes.name,
            description: record.public_attributes.description,
            tag: record.public_attributes.tag.to_string(),
            status: record.status.to_string(),
            ciphertext_handle: record.ciphertext_handle.to_string(),
            clear_value: record.clear_value,
            version: record.version,
            created_at: record.created_at.to_iso8601(),
            updated_at: record.updated_at.to_iso8601(),
        }
    }
}

/// Query-string filter for the list route.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListRecordsQuery {
    /// Only records owned by this identity.
    pub owner: Option<String>,
    /// Only records in this lifecycle state.
    pub status: Option<String>,
    /// Only records with this logistics tag.
    pub tag: Option<String>,
}

impl ListRecordsQuery {
    fn into_filter(self) -> Result<RecordFilter, ApiError> {
        let owner = self.owner.map(OwnerId::new).transpose()?;
        let status = self
            .status
            .map(|s| s.parse::<RecordStatus>())
            .transpose()?;
        let tag = self.tag.map(|s| s.parse::<LifecycleTag>()).transpose()?;
        Ok(RecordFilter { owner, status, tag })
    }
}

/// Record list response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordListResponse {
    pub records: Vec<RecordResponse>,
    pub count: usize,
}

/// Result of a verification request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerificationResponse {
    pub record_id: Uuid,
    /// The authoritative decrypted value.
    pub clear_value: u64,
    /// COMMITTED, ALREADY_VERIFIED, or OBSERVED_COMMIT.
    pub outcome: String,
}

// ─── Router ──────────────────────────────────────────────────────────

/// Build the records router.
pub fn router<P: ConfidentialCompute + 'static>() -> Router<AppState<P>> {
    Router::new()
        .route(
            "/v1/records",
            post(create_record::<P>).get(list_records::<P>),
        )
        .route("/v1/records/:id", get(get_record::<P>))
        .route(
            "/v1/records/:id/verification",
            post(request_verification::<P>),
        )
}

// ─── Handlers ────────────────────────────────────────────────────────

/// POST /v1/records — create a confidential record.
#[utoipa::path(
    post,
    path = "/v1/records",
    request_body = CreateRecordRequest,
    responses(
        (status = 201, description = "Record created", body = RecordResponse),
        (status = 409, description = "Record id already exists", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid field", body = crate::error::ErrorBody),
    ),
    tag = "records"
)]
async fn create_record<P: ConfidentialCompute + 'static>(
    State(state): State<AppState<P>>,
    body: Result<Json<CreateRecordRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RecordResponse>), ApiError> {
    let req = extract_validated_json(body)?;

    let owner = OwnerId::new(req.owner_id)?;
    let tag: LifecycleTag = req.tag.parse()?;
    let attributes = PublicAttributes {
        name: req.name,
        description: req.description,
        tag,
    };
    let id = RecordId(req.record_id.unwrap_or_else(Uuid::new_v4));

    let id = state
        .api
        .create(id, owner, attributes, req.secret_value)
        .await?;
    let record = state.api.get(&id)?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// GET /v1/records — list records.
#[utoipa::path(
    get,
    path = "/v1/records",
    params(ListRecordsQuery),
    responses(
        (status = 200, description = "Matching records", body = RecordListResponse),
        (status = 422, description = "Invalid filter", body = crate::error::ErrorBody),
    ),
    tag = "records"
)]
async fn list_records<P: ConfidentialCompute + 'static>(
    State(state): State<AppState<P>>,
    Query(query): Query<ListRecordsQuery>,
) -> Result<Json<RecordListResponse>, ApiError> {
    let filter = query.into_filter()?;
    let records: Vec<RecordResponse> = state
        .api
        .list(&filter)
        .into_iter()
        .map(RecordResponse::from)
        .collect();
    let count = records.len();
    Ok(Json(RecordListResponse { records, count }))
}

/// GET /v1/records/{id} — get one record.
#[utoipa::path(
    get,
    path = "/v1/records/{id}",
    params(("id" = Uuid, Path, description = "Record id")),
    responses(
        (status = 200, description = "Record found", body = RecordResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "records"
)]
async fn get_record<P: ConfidentialCompute + 'static>(
    State(state): State<AppState<P>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecordResponse>, ApiError> {
    let record = state.api.get(&RecordId(id))?;
    Ok(Json(record.into()))
}

/// POST /v1/records/{id}/verification — request decrypt-and-verify.
///
/// Idempotent: once any caller's verification commits, every later call
/// returns the identical clear value.
#[utoipa::path(
    post,
    path = "/v1/records/{id}/verification",
    params(("id" = Uuid, Path, description = "Record id")),
    responses(
        (status = 200, description = "Verified clear value", body = VerificationResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 502, description = "Proof rejected or provider error", body = crate::error::ErrorBody),
        (status = 503, description = "Provider unavailable, retry later", body = crate::error::ErrorBody),
    ),
    tag = "records"
)]
async fn request_verification<P: ConfidentialCompute + 'static>(
    State(state): State<AppState<P>>,
    Path(id): Path<Uuid>,
) -> Result<Json<VerificationResponse>, ApiError> {
    let record_id = RecordId(id);
    let outcome = state.api.request_verification(&record_id).await?;
    Ok(Json(VerificationResponse {
        record_id: id,
        clear_value: outcome.clear_value,
        outcome: outcome.kind.to_string(),
    }))
}
