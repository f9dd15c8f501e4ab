//! # Record Store — Versioned Table with Per-Record CAS
//!
//! The single source of truth for record state. All writes after insert
//! go through [`RecordStore::compare_and_set`]; there is no other write
//! path. The table is sharded, so CAS sequences on one record are
//! linearizable while unrelated records proceed in parallel with no
//! global lock.
//!
//! The store performs no I/O and no cryptography. It validates two
//! things and nothing else: that the caller saw the current version, and
//! that the requested mutation keeps the lifecycle invariants (forward
//! single-step status moves, clear value set exactly once).

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crs_core::{LifecycleTag, OwnerId, PublicAttributes, RecordId, Timestamp};

use crate::record::{Record, RecordStatus, StatusTransition};

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from [`RecordStore::insert`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// A record with this identifier already exists.
    #[error("record {id} already exists")]
    DuplicateId {
        /// The colliding identifier.
        id: RecordId,
    },
}

/// Errors from [`RecordStore::compare_and_set`].
#[derive(Error, Debug)]
pub enum CasError {
    /// No record with this identifier.
    #[error("record {id} not found")]
    NotFound {
        /// The missing identifier.
        id: RecordId,
    },

    /// The stored version differs from the expected version.
    ///
    /// Carries the current record so the caller can decide whether the
    /// conflicting state already satisfies its goal (e.g. a racing
    /// caller finished verification first).
    #[error("version conflict on {id}: expected {expected}, stored {stored}", id = .current.id, stored = .current.version)]
    VersionConflict {
        /// The version the caller expected.
        expected: u64,
        /// The record as currently stored.
        current: Record,
    },

    /// The mutation would move status backward or skip a step.
    ///
    /// Rejected with no side effects; the stored record is unchanged.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: RecordStatus,
        /// Requested status.
        to: RecordStatus,
    },
}

// ─── Mutations ───────────────────────────────────────────────────────

/// The mutations the store accepts. Each is a pure description of the
/// target state; the store decides whether it is admissible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordMutation {
    /// `Created → VerificationPending`: claim the record for the
    /// decrypt-and-verify protocol.
    BeginVerification,
    /// `VerificationPending → Verified`: commit the proof-checked clear
    /// value. Sets `clear_value` exactly once.
    CommitVerification {
        /// The decrypted value to commit.
        clear_value: u64,
    },
    /// Replace the owner-mutable public attributes. Leaves status,
    /// handle, and clear value untouched.
    UpdateAttributes {
        /// The new attribute set.
        attributes: PublicAttributes,
    },
}

/// Apply a mutation to a snapshot, producing the successor record.
///
/// Pure: validates the lifecycle invariants and returns the new record
/// with `version + 1`, without touching the store.
fn apply_mutation(record: &Record, mutation: RecordMutation) -> Result<Record, CasError> {
    let now = Timestamp::now();
    let mut next = record.clone();
    next.version = record.version + 1;
    next.updated_at = now;

    match mutation {
        RecordMutation::BeginVerification => {
            advance_status(&mut next, RecordStatus::VerificationPending, now)?;
        }
        RecordMutation::CommitVerification { clear_value } => {
            advance_status(&mut next, RecordStatus::Verified, now)?;
            next.clear_value = Some(clear_value);
        }
        RecordMutation::UpdateAttributes { attributes } => {
            next.public_attributes = attributes;
        }
    }
    Ok(next)
}

/// Move `record` to `to`, enforcing the single-forward-step rule and
/// appending to the transition log.
fn advance_status(record: &mut Record, to: RecordStatus, at: Timestamp) -> Result<(), CasError> {
    let from = record.status;
    if !from.can_advance_to(to) {
        return Err(CasError::InvalidTransition { from, to });
    }
    record.transitions.push(StatusTransition { from, to, at });
    record.status = to;
    Ok(())
}

// ─── Filters ─────────────────────────────────────────────────────────

/// Read-side filter for [`RecordStore::list`]. Empty filter matches all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Only records owned by this identity.
    pub owner: Option<OwnerId>,
    /// Only records in this lifecycle state.
    pub status: Option<RecordStatus>,
    /// Only records with this logistics tag.
    pub tag: Option<LifecycleTag>,
}

impl RecordFilter {
    /// Whether a record passes this filter.
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(owner) = &self.owner {
            if &record.owner != owner {
                return false;
            }
        }
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(tag) = self.tag {
            if record.public_attributes.tag != tag {
                return false;
            }
        }
        true
    }
}

// ─── Store ───────────────────────────────────────────────────────────

/// In-process record table. Cheap to share behind an `Arc`; all methods
/// take `&self`.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: DashMap<RecordId, Record>,
}

impl RecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Insert a freshly created record.
    ///
    /// Records enter through [`Record::new`], so they arrive at
    /// `version = 0` in the `Created` state.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateId`] if the identifier is already present;
    /// the stored record is untouched.
    pub fn insert(&self, record: Record) -> Result<RecordId, StoreError> {
        let id = record.id;
        match self.records.entry(id) {
            Entry::Occupied(_) => Err(StoreError::DuplicateId { id }),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(id)
            }
        }
    }

    /// Read-only snapshot of one record.
    pub fn get(&self, id: &RecordId) -> Option<Record> {
        self.records.get(id).map(|r| r.clone())
    }

    /// Snapshot of all records passing the filter.
    ///
    /// Ordering is unspecified; callers sort if they need stable output.
    pub fn list(&self, filter: &RecordFilter) -> Vec<Record> {
        self.records
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of records in the table.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Atomically apply `mutation` if the stored version equals
    /// `expected_version` and the resulting transition is a single
    /// forward step.
    ///
    /// On success the stored record is replaced wholesale with the
    /// successor (version incremented by exactly 1) and the successor is
    /// returned. On any error the stored record is byte-for-byte
    /// unchanged — there is no partial update.
    ///
    /// The entry lock is held for the duration of the check-and-swap, so
    /// the accepted CAS sequence per record is a total order consistent
    /// with `version`. Different records live on independent shards.
    pub fn compare_and_set(
        &self,
        id: &RecordId,
        expected_version: u64,
        mutation: RecordMutation,
    ) -> Result<Record, CasError> {
        let mut entry = self
            .records
            .get_mut(id)
            .ok_or(CasError::NotFound { id: *id })?;

        if entry.version != expected_version {
            return Err(CasError::VersionConflict {
                expected: expected_version,
                current: entry.clone(),
            });
        }

        let next = apply_mutation(&entry, mutation)?;
        *entry = next.clone();
        Ok(next)
    }
}
