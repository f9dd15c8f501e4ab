//! # Capability Error Taxonomy
//!
//! Errors surfaced by the confidential-compute capability. Encryption
//! failures are deterministic (bad input); decryption failures split into
//! a terminal class (unknown handle, unauthorized context) and a
//! transient class (`ServiceUnavailable`) that callers may retry with
//! backoff.

use crs_core::HandleId;

/// Errors from the encryption path.
#[derive(Debug, thiserror::Error)]
pub enum EncryptError {
    /// The plaintext exceeds the provider's representable domain.
    #[error("value {value} exceeds the provider's representable bound {bound}")]
    ValueOutOfRange {
        /// The rejected plaintext value.
        value: u64,
        /// The provider's inclusive upper bound.
        bound: u64,
    },

    /// The recipient context is malformed (e.g. empty requester).
    #[error("invalid recipient context: {reason}")]
    InvalidContext {
        /// Description of the malformation.
        reason: String,
    },
}

/// Errors from the clear-value request path.
#[derive(Debug, thiserror::Error)]
pub enum DecryptError {
    /// A requested handle is unknown to the provider.
    #[error("unknown ciphertext handle: {handle}")]
    UnknownHandle {
        /// The handle that failed to resolve.
        handle: HandleId,
    },

    /// The presented context is not authorized for one of the handles.
    #[error("context {requester:?} is not authorized for the requested handles")]
    Unauthorized {
        /// The requester that was rejected.
        requester: String,
    },

    /// The provider is temporarily unable to complete the round trip.
    /// Retryable with backoff.
    #[error("confidential-compute service unavailable: {reason}")]
    ServiceUnavailable {
        /// Human-readable description of the outage.
        reason: String,
    },
}

impl DecryptError {
    /// Whether a caller may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable { .. })
    }
}
