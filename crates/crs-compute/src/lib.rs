//! # crs-compute — Confidential Compute Capability
//!
//! The consumed interface to the cryptographic backend: encrypting record
//! values into opaque handles, resolving handles to proven clear values,
//! and locally checking decryption proofs.
//!
//! The capability itself is external to this stack. This crate defines
//! the trait the rest of the stack programs against, the error taxonomy
//! that splits deterministic failures from retryable ones, and a
//! deterministic mock provider for development and tests.

pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

// ─── Trait re-exports ───────────────────────────────────────────────

pub use traits::ConfidentialCompute;

// ─── Type re-exports ────────────────────────────────────────────────

pub use types::{
    AccessContext, ClearValueBundle, DecryptionProof, EncryptedValue, InclusionProof,
};

// ─── Error re-exports ───────────────────────────────────────────────

pub use error::{DecryptError, EncryptError};

// ─── Mock provider re-exports ───────────────────────────────────────

pub use mock::MockConfidentialCompute;
