//! # crs-store — Authoritative Record Table
//!
//! The single source of truth for confidential record state.
//!
//! ## Invariants enforced here
//!
//! 1. A record identifier is inserted at most once.
//! 2. Status moves only forward, one step at a time:
//!    `Created → VerificationPending → Verified`.
//! 3. The clear value is set exactly once, by the commit transition, and
//!    never changes afterwards.
//! 4. `version` increases by exactly 1 per accepted mutation; a mutation
//!    against a stale version is rejected with the current record
//!    attached.
//!
//! All writes after insert go through [`RecordStore::compare_and_set`].
//! CAS on a single record is linearizable; different records share no
//! lock.

pub mod record;
pub mod store;

// ─── Record re-exports ──────────────────────────────────────────────

pub use record::{Record, RecordStatus, StatusTransition};

// ─── Store re-exports ───────────────────────────────────────────────

pub use store::{CasError, RecordFilter, RecordMutation, RecordStore, StoreError};
