//! # Request Extraction Helpers
//!
//! JSON body extraction that folds axum's rejection and the request
//! type's own validation into the API error taxonomy, so handlers see
//! a single `Result<T, ApiError>`.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crs_core::FieldError;

use crate::error::ApiError;

/// Request types that can validate their own field constraints.
pub trait Validate {
    /// Check field constraints, reporting the first offending field.
    fn validate(&self) -> Result<(), FieldError>;
}

/// Unwrap a JSON body, mapping deserialization failures to 422 and
/// running the type's validation.
pub fn extract_validated_json<T: Validate>(
    body: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiError> {
    let Json(value) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    value.validate()?;
    Ok(value)
}
