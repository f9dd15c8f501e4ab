//! # Error Types — Core Error Hierarchy
//!
//! Errors shared by every crate in the stack. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Validation failures name the offending field so callers can report
//!   creation errors per field.
//! - Canonicalization failures carry the rejected value; they indicate a
//!   caller bug, not transient conditions, and are never retried.

use thiserror::Error;

/// Field-level validation failure for caller-supplied input.
///
/// Creation paths collect these per field rather than collapsing them
/// into a single opaque message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {field}: {reason}")]
pub struct FieldError {
    /// The rejected field, as it appears on the wire (e.g. `secret_value`).
    pub field: &'static str,
    /// Why the value was rejected.
    pub reason: String,
}

impl FieldError {
    /// Build a field error.
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Proof transcripts must contain only integers, strings, booleans,
    /// and null so the byte sequence is deterministic.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Top-level error type for core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A caller-supplied field failed validation.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Malformed identifier or timestamp input.
    #[error("parse error: {0}")]
    Parse(String),
}
