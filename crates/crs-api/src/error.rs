//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps the domain taxonomy onto HTTP so clients can distinguish
//! "try again" (503) from "already handled upstream" (502, integrity
//! concern) from caller mistakes (404/409/422). Internal faults are
//! logged with full context and returned masked.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crs_compute::{DecryptError, EncryptError};
use crs_core::FieldError;
use crs_protocol::VerificationError;

/// Structured JSON error response body.
///
/// Every non-2xx response uses this format.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. `"VALIDATION_ERROR"`).
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Whether retrying the identical request later can succeed.
    pub retryable: bool,
    /// The offending field, present only for validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Application-level error type for the record lifecycle surface.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// A caller-supplied field failed validation (422, per-field).
    #[error(transparent)]
    Validation(#[from] FieldError),

    /// The request body could not be parsed (422).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Record identifier collision on create (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The confidential-compute provider rejected an encryption (502).
    #[error("encryption failed: {0}")]
    Encryption(#[from] EncryptError),

    /// A verification request failed; status mapping depends on the
    /// inner class (see [`VerificationError`]).
    #[error(transparent)]
    Verification(#[from] VerificationError),
}

impl ApiError {
    /// HTTP status, machine-readable code, and retryability.
    fn status_code_retryable(&self) -> (StatusCode, &'static str, bool) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", false),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", false),
            Self::BadRequest(_) => (StatusCode::UNPROCESSABLE_ENTITY, "BAD_REQUEST", false),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT", false),
            Self::Encryption(_) => (StatusCode::BAD_GATEWAY, "ENCRYPTION_FAILED", false),
            Self::Verification(err) => match err {
                VerificationError::NotFound { .. } => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", false)
                }
                VerificationError::Decryption(inner) => match inner {
                    DecryptError::ServiceUnavailable { .. } => {
                        (StatusCode::SERVICE_UNAVAILABLE, "PROVIDER_UNAVAILABLE", true)
                    }
                    DecryptError::UnknownHandle { .. } | DecryptError::Unauthorized { .. } => {
                        (StatusCode::BAD_GATEWAY, "DECRYPTION_REJECTED", false)
                    }
                },
                // A fresh decryption round may succeed, but replaying the
                // identical request body is what `retryable` describes,
                // and that does perform a fresh round.
                VerificationError::ProofRejected { .. } => {
                    (StatusCode::BAD_GATEWAY, "PROOF_REJECTED", true)
                }
                VerificationError::MissingClearValue { .. } => {
                    (StatusCode::BAD_GATEWAY, "PROVIDER_CONTRACT_VIOLATION", false)
                }
                VerificationError::IntegrityMismatch { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTEGRITY_ANOMALY", false)
                }
                VerificationError::StoreInvariant { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", false)
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, retryable) = self.status_code_retryable();

        // Never expose internal invariant details to clients.
        let message = match &self {
            Self::Verification(VerificationError::StoreInvariant { .. }) => {
                "an internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        // Server-side visibility for operator-relevant classes.
        match &self {
            Self::Verification(VerificationError::IntegrityMismatch { .. }) => {
                tracing::error!(error = %self, "data-integrity anomaly surfaced to client")
            }
            Self::Verification(VerificationError::StoreInvariant { .. }) => {
                tracing::error!(error = %self, "store invariant violation")
            }
            Self::Verification(VerificationError::ProofRejected { .. }) => {
                tracing::warn!(error = %self, "proof rejection surfaced to client")
            }
            Self::Verification(VerificationError::Decryption(_)) | Self::Encryption(_) => {
                tracing::warn!(error = %self, "provider failure surfaced to client")
            }
            _ => {}
        }

        let field = match &self {
            Self::Validation(err) => Some(err.field.to_string()),
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                retryable,
                field,
            },
        };

        (status, Json(body)).into_response()
    }
}
