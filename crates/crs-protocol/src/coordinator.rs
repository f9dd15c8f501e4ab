//! # Verification Coordinator
//!
//! Drives a single record from `Created`/`VerificationPending` to
//! `Verified` exactly once, no matter how many stakeholders request it
//! concurrently.
//!
//! ## Protocol
//!
//! ```text
//! request_verification(id)
//!   │
//!   ├─ 1. read snapshot ── Verified? ──▶ return clear value  (no crypto work)
//!   │
//!   ├─ 2. Created? CAS(version, BeginVerification)
//!   │       lost the race ──▶ re-read and re-branch
//!   │
//!   ├─ 3. request_clear_values({handle})        ← may suspend
//!   │
//!   ├─ 4. verify_proof locally ── invalid? ──▶ ProofRejected,
//!   │                                          record stays Pending
//!   │
//!   └─ 5. CAS(version, CommitVerification)
//!           lost to an earlier committer ──▶ cross-check values,
//!                                            return the committed one
//! ```
//!
//! Steps 3–5 may run in parallel for the same record across callers; the
//! store's CAS is the only serialization point. The first committed value
//! wins, and every later caller observes it. Two callers decrypting the
//! same handle must obtain the same value — if they do not, that is a
//! data-integrity anomaly and is surfaced as an error, never resolved
//! silently.
//!
//! A caller may abandon its request at any await point: the record is
//! left `Created` or `VerificationPending`, both of which a later caller
//! completes normally.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crs_compute::{AccessContext, ConfidentialCompute, DecryptError};
use crs_core::{HandleId, RecordId};
use crs_store::{CasError, Record, RecordMutation, RecordStatus, RecordStore};

// ─── Outcome ─────────────────────────────────────────────────────────

/// How a successful verification request was satisfied.
///
/// Losing the commit race is a success, not an error: the caller asked
/// for a verified clear value and got one. The kind records which path
/// delivered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    /// This call committed the verification.
    Committed,
    /// The record was already `Verified` when this call arrived; no
    /// cryptographic work was performed.
    AlreadyVerified,
    /// This call decrypted and proved, but another caller committed
    /// first; the committed value (identical to ours) is returned.
    ObservedCommit,
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Committed => "COMMITTED",
            Self::AlreadyVerified => "ALREADY_VERIFIED",
            Self::ObservedCommit => "OBSERVED_COMMIT",
        };
        f.write_str(s)
    }
}

/// Result of a successful verification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    /// The authoritative clear value of the record.
    pub clear_value: u64,
    /// Which path produced it.
    pub kind: OutcomeKind,
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from [`VerificationCoordinator::request_verification`].
#[derive(Error, Debug)]
pub enum VerificationError {
    /// No record with this identifier.
    #[error("record {id} not found")]
    NotFound {
        /// The missing identifier.
        id: RecordId,
    },

    /// The decryption round trip failed. Retryable when the inner error
    /// is the provider's transient class.
    #[error("decryption failed: {0}")]
    Decryption(#[from] DecryptError),

    /// The provider's bundle did not contain the requested handle.
    #[error("provider returned no clear value for handle {handle}")]
    MissingClearValue {
        /// The handle the bundle was missing.
        handle: HandleId,
    },

    /// The decryption proof did not check out. The record is left
    /// `VerificationPending`; a fresh decryption round may succeed, but
    /// retrying with the same proof cannot.
    #[error("decryption proof rejected for record {id} (handle {handle})")]
    ProofRejected {
        /// The record whose proof was rejected.
        id: RecordId,
        /// The handle the rejected proof covered.
        handle: HandleId,
    },

    /// Another caller committed a different clear value for the same
    /// ciphertext handle. Both derive from one ciphertext, so this
    /// should be impossible — it indicates provider or store corruption
    /// and requires investigation, not a retry.
    #[error(
        "integrity anomaly on record {id}: committed value {committed} disagrees with locally proven value {computed}"
    )]
    IntegrityMismatch {
        /// The record in question.
        id: RecordId,
        /// The value already committed to the store.
        committed: u64,
        /// The value this call decrypted and proved.
        computed: u64,
    },

    /// The store returned a state the lifecycle invariants rule out
    /// (e.g. `Verified` with no clear value). Fatal; surfaced as-is.
    #[error("record {id} violated a store invariant: {detail}")]
    StoreInvariant {
        /// The record in question.
        id: RecordId,
        /// What was observed.
        detail: String,
    },
}

impl VerificationError {
    /// Whether the caller may retry the same request later.
    ///
    /// Only provider unavailability qualifies. A rejected proof needs a
    /// fresh decryption round (which a retry of the whole request
    /// performs, but the distinction matters for backoff policy);
    /// integrity and invariant failures need a human.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Decryption(e) if e.is_retryable())
    }
}

// ─── Coordinator ─────────────────────────────────────────────────────

/// Orchestrates the decrypt-then-verify protocol against the store and
/// the confidential-compute capability.
///
/// Holds no mutable state of its own — everything shared is routed
/// through the store — so one instance (or many clones) can serve any
/// number of concurrent callers.
pub struct VerificationCoordinator<P> {
    store: Arc<RecordStore>,
    compute: Arc<P>,
    context: AccessContext,
}

impl<P> Clone for VerificationCoordinator<P> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            compute: Arc::clone(&self.compute),
            context: self.context.clone(),
        }
    }
}

impl<P: ConfidentialCompute> VerificationCoordinator<P> {
    /// Build a coordinator operating under the given access context.
    ///
    /// The context is the identity ciphertexts are encrypted for at
    /// creation time, so the same context must be used by the creation
    /// path ([`context()`](Self::context) exposes it for that purpose).
    pub fn new(store: Arc<RecordStore>, compute: Arc<P>, context: AccessContext) -> Self {
        Self {
            store,
            compute,
            context,
        }
    }

    /// The access context this coordinator decrypts under.
    pub fn context(&self) -> &AccessContext {
        &self.context
    }

    /// The store this coordinator commits to.
    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// The compute provider this coordinator consumes.
    pub fn compute(&self) -> &Arc<P> {
        &self.compute
    }

    /// Drive one record to `Verified` and return its clear value.
    ///
    /// Idempotent: once any caller has committed, every subsequent call
    /// returns the identical value without cryptographic work and
    /// without touching the record.
    pub async fn request_verification(
        &self,
        id: &RecordId,
    ) -> Result<VerificationOutcome, VerificationError> {
        // Steps 1–2: take a snapshot and either short-circuit, join an
        // in-flight verification, or claim the record ourselves.
        let record = match self.claim_or_join(id)? {
            Claim::AlreadyVerified(clear_value) => {
                tracing::debug!(record_id = %id, "verification short-circuit: already verified");
                return Ok(VerificationOutcome {
                    clear_value,
                    kind: OutcomeKind::AlreadyVerified,
                });
            }
            Claim::Pending(record) => record,
        };

        // Step 3: the decryption round trip. May suspend; concurrent
        // callers for the same record may each pay this cost.
        let handle = record.ciphertext_handle;
        let bundle = self
            .compute
            .request_clear_values(&[handle], &self.context)
            .await?;
        let clear_value = bundle
            .value_for(&handle)
            .ok_or(VerificationError::MissingClearValue { handle })?;

        // Step 4: local proof check, before anything is committed. On
        // rejection the record stays `VerificationPending` and a later
        // fresh round can complete it.
        if !self
            .compute
            .verify_proof(&bundle.proof, &bundle.values, &self.context)
        {
            tracing::warn!(
                record_id = %id,
                handle = %handle,
                provider = self.compute.provider_name(),
                "decryption proof rejected; record left pending"
            );
            return Err(VerificationError::ProofRejected { id: *id, handle });
        }

        // Step 5: commit, first-committer-wins.
        self.commit(id, record.version, clear_value)
    }

    /// Steps 1–2: resolve the record to either a short-circuit value or
    /// a `VerificationPending` snapshot this caller participates in.
    ///
    /// The loop repeats only while concurrent attribute updates keep
    /// bumping the version of a still-`Created` record out from under
    /// the claim CAS.
    fn claim_or_join(&self, id: &RecordId) -> Result<Claim, VerificationError> {
        loop {
            let record = self
                .store
                .get(id)
                .ok_or(VerificationError::NotFound { id: *id })?;

            match record.status {
                RecordStatus::Verified => {
                    return Ok(Claim::AlreadyVerified(committed_value(&record)?));
                }
                RecordStatus::VerificationPending => return Ok(Claim::Pending(record)),
                RecordStatus::Created => {
                    match self.store.compare_and_set(
                        id,
                        record.version,
                        RecordMutation::BeginVerification,
                    ) {
                        Ok(claimed) => {
                            tracing::debug!(
                                record_id = %id,
                                version = claimed.version,
                                "record claimed for verification"
                            );
                            return Ok(Claim::Pending(claimed));
                        }
                        Err(CasError::VersionConflict { current, .. }) => {
                            match current.status {
                                RecordStatus::Verified => {
                                    return Ok(Claim::AlreadyVerified(committed_value(&current)?));
                                }
                                RecordStatus::VerificationPending => {
                                    return Ok(Claim::Pending(current));
                                }
                                // An attribute update won the version; the
                                // record is still unclaimed. Try again.
                                RecordStatus::Created => continue,
                            }
                        }
                        Err(CasError::NotFound { .. }) => {
                            return Err(VerificationError::NotFound { id: *id });
                        }
                        Err(CasError::InvalidTransition { from, to }) => {
                            // Version matched but the status was not
                            // `Created` — the store broke its own contract.
                            return Err(VerificationError::StoreInvariant {
                                id: *id,
                                detail: format!(
                                    "claim CAS at matching version rejected: {from} -> {to}"
                                ),
                            });
                        }
                    }
                }
            }
        }
    }

    /// Step 5: commit the proven value, resolving commit races in favor
    /// of the first committer.
    ///
    /// The loop repeats only while attribute updates bump the version of
    /// a still-pending record between our snapshot and our CAS.
    fn commit(
        &self,
        id: &RecordId,
        mut expected_version: u64,
        clear_value: u64,
    ) -> Result<VerificationOutcome, VerificationError> {
        loop {
            match self.store.compare_and_set(
                id,
                expected_version,
                RecordMutation::CommitVerification { clear_value },
            ) {
                Ok(committed) => {
                    tracing::info!(
                        record_id = %id,
                        version = committed.version,
                        "verification committed"
                    );
                    return Ok(VerificationOutcome {
                        clear_value,
                        kind: OutcomeKind::Committed,
                    });
                }
                Err(CasError::VersionConflict { current, .. }) => match current.status {
                    RecordStatus::Verified => {
                        let committed = committed_value(&current)?;
                        if committed != clear_value {
                            tracing::error!(
                                record_id = %id,
                                committed,
                                computed = clear_value,
                                "clear-value disagreement between racing verifications"
                            );
                            return Err(VerificationError::IntegrityMismatch {
                                id: *id,
                                committed,
                                computed: clear_value,
                            });
                        }
                        tracing::debug!(
                            record_id = %id,
                            "lost commit race; observed identical committed value"
                        );
                        return Ok(VerificationOutcome {
                            clear_value: committed,
                            kind: OutcomeKind::ObservedCommit,
                        });
                    }
                    RecordStatus::VerificationPending => {
                        expected_version = current.version;
                        continue;
                    }
                    RecordStatus::Created => {
                        // Status regressed under us — the store's
                        // monotonicity invariant is broken.
                        return Err(VerificationError::StoreInvariant {
                            id: *id,
                            detail: "record regressed to CREATED during commit".to_string(),
                        });
                    }
                },
                Err(CasError::NotFound { .. }) => {
                    return Err(VerificationError::NotFound { id: *id });
                }
                Err(CasError::InvalidTransition { from, to }) => {
                    return Err(VerificationError::StoreInvariant {
                        id: *id,
                        detail: format!("commit CAS at matching version rejected: {from} -> {to}"),
                    });
                }
            }
        }
    }
}

/// Resolution of steps 1–2.
enum Claim {
    /// Short-circuit: the record is `Verified` with this value.
    AlreadyVerified(u64),
    /// Participate: the record is `VerificationPending` at this snapshot.
    Pending(Record),
}

/// Extract the clear value of a `Verified` record, surfacing the
/// invariant violation if it is absent.
fn committed_value(record: &Record) -> Result<u64, VerificationError> {
    record
        .clear_value
        .ok_or_else(|| VerificationError::StoreInvariant {
            id: record.id,
            detail: "record is VERIFIED but carries no clear value".to_string(),
        })
}
