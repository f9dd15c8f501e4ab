//! # crs-core — Foundational Types
//!
//! Shared vocabulary of the Confidential Record Stack: domain identifiers,
//! UTC-only timestamps, canonical byte production for proof transcripts,
//! SHA-256 content digests, and the public attributes of a record.
//!
//! ## Crate Policy
//!
//! - No I/O, no async, no global state.
//! - Identifier namespaces are distinct newtypes.
//! - All digest input flows through [`CanonicalBytes`].

pub mod attributes;
pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

// ─── Identity re-exports ────────────────────────────────────────────

pub use identity::{HandleId, OwnerId, RecordId};

// ─── Attribute re-exports ───────────────────────────────────────────

pub use attributes::{LifecycleTag, PublicAttributes};

// ─── Canonicalization re-exports ────────────────────────────────────

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_hex, ContentDigest};

// ─── Temporal re-exports ────────────────────────────────────────────

pub use temporal::Timestamp;

// ─── Error re-exports ───────────────────────────────────────────────

pub use error::{CanonicalizationError, CoreError, FieldError};
