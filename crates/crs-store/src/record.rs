//! # Confidential Record — Versioned Lifecycle State
//!
//! Models one confidential business record: immutable creation data, the
//! owner-mutable public attributes, and the verification lifecycle.
//!
//! ## States
//!
//! ```text
//! Created ──▶ VerificationPending ──▶ Verified (terminal)
//! ```
//!
//! Status only moves forward, one step at a time. The clear value exists
//! exactly when the record is `Verified` and never changes afterwards.
//!
//! ## Design Decision
//!
//! The lifecycle is an enum with validated transitions rather than
//! typestate types. The store hands out snapshots of records whose state
//! is only known at runtime, so a compile-time state encoding would be
//! erased at the store boundary anyway; the `rank()`-based forward check
//! keeps the invariant in one place.

use serde::{Deserialize, Serialize};

use crs_core::{HandleId, OwnerId, PublicAttributes, RecordId, Timestamp};

// ─── Record Status ───────────────────────────────────────────────────

/// The verification lifecycle state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordStatus {
    /// Encrypted record exists; no verification requested yet.
    Created,
    /// At least one stakeholder has requested verification; the
    /// decryption round trip is in flight or retryable.
    VerificationPending,
    /// A proof-checked clear value has been committed (terminal).
    Verified,
}

impl RecordStatus {
    /// Position in the forward-only lifecycle order.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Created => 0,
            Self::VerificationPending => 1,
            Self::Verified => 2,
        }
    }

    /// Whether a transition to `next` is the single allowed forward step.
    ///
    /// Backward moves and skips both fail this check.
    pub fn can_advance_to(&self, next: RecordStatus) -> bool {
        next.rank() == self.rank() + 1
    }

    /// Whether this is the terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Verified)
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Created => "CREATED",
            Self::VerificationPending => "VERIFICATION_PENDING",
            Self::Verified => "VERIFIED",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for RecordStatus {
    type Err = crs_core::FieldError;

    /// Parse the `Display` form (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CREATED" => Ok(Self::Created),
            "VERIFICATION_PENDING" => Ok(Self::VerificationPending),
            "VERIFIED" => Ok(Self::Verified),
            _ => Err(crs_core::FieldError::new(
                "status",
                format!(
                    "unknown record status {s:?}; expected CREATED, VERIFICATION_PENDING, or VERIFIED"
                ),
            )),
        }
    }
}

// ─── Transition Log ──────────────────────────────────────────────────

/// One accepted status transition, as recorded on the record itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTransition {
    /// Status before the transition.
    pub from: RecordStatus,
    /// Status after the transition.
    pub to: RecordStatus,
    /// When the transition was accepted.
    pub at: Timestamp,
}

// ─── Record ──────────────────────────────────────────────────────────

/// A confidential record.
///
/// Immutable after creation: `id`, `owner`, `ciphertext_handle`,
/// `created_at`. Mutable only through the store's compare-and-set:
/// `public_attributes`, `status`, `clear_value`, `version`, `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Caller-assigned unique identifier.
    pub id: RecordId,
    /// Identity that created the record.
    pub owner: OwnerId,
    /// Non-sensitive display attributes, owner-mutable.
    pub public_attributes: PublicAttributes,
    /// Opaque reference to the encrypted value, set once at creation.
    pub ciphertext_handle: HandleId,
    /// Verification lifecycle state, forward-only.
    pub status: RecordStatus,
    /// Proof-checked decrypted value; present exactly when `Verified`.
    pub clear_value: Option<u64>,
    /// Optimistic-concurrency counter; increments by 1 per accepted
    /// mutation.
    pub version: u64,
    /// Creation time.
    pub created_at: Timestamp,
    /// Time of the last accepted mutation.
    pub updated_at: Timestamp,
    /// Ordered log of accepted status transitions.
    pub transitions: Vec<StatusTransition>,
}

impl Record {
    /// Build a fresh record in the `Created` state at version 0.
    pub fn new(
        id: RecordId,
        owner: OwnerId,
        public_attributes: PublicAttributes,
        ciphertext_handle: HandleId,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            owner,
            public_attributes,
            ciphertext_handle,
            status: RecordStatus::Created,
            clear_value: None,
            version: 0,
            created_at: now,
            updated_at: now,
            transitions: Vec::new(),
        }
    }

    /// Whether verification has committed.
    pub fn is_verified(&self) -> bool {
        self.status.is_terminal()
    }
}
