//! # crs-protocol — Decrypt-and-Verify Protocol
//!
//! The verification coordinator: the one component allowed to move a
//! record through its lifecycle, built so that any number of independent
//! stakeholders can race a verification request and exactly one commit
//! lands.
//!
//! ## Guarantees
//!
//! - **Idempotence** — requests after the first commit return the
//!   identical clear value and leave the record untouched.
//! - **At-most-one commit** — the store's per-record CAS is the only
//!   serialization point; the first committer wins and later writers
//!   observe its value.
//! - **No commit without proof** — a clear value reaches the store only
//!   after the local proof check passes.
//! - **Abandonment safety** — dropping a request at a suspension point
//!   leaves the record in a state any later caller can complete.

pub mod coordinator;

// ─── Coordinator re-exports ─────────────────────────────────────────

pub use coordinator::{
    OutcomeKind, VerificationCoordinator, VerificationError, VerificationOutcome,
};
