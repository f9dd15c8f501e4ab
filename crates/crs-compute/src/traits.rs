//! # Confidential Compute Capability Trait
//!
//! The abstract interface this stack consumes for all cryptographic work:
//! producing ciphertext handles at record creation and resolving them to
//! proven clear values during verification.
//!
//! ## Suspension points
//!
//! `encrypt` and `request_clear_values` are the only operations in the
//! stack that may await an external round trip (threshold decryption,
//! human or service approval). They return `impl Future + Send` so the
//! verification coordinator can drive them from any async task. The
//! `Send + Sync` bound on the trait allows one provider instance to be
//! shared behind an `Arc` across concurrent callers.
//!
//! `verify_proof` is pure and synchronous: a fast local check that must
//! pass before any decrypted value is committed.

use std::collections::BTreeMap;
use std::future::Future;

use crs_core::HandleId;

use crate::error::{DecryptError, EncryptError};
use crate::types::{AccessContext, ClearValueBundle, DecryptionProof, EncryptedValue};

/// Abstract interface to a confidential-compute provider.
///
/// Implementations must be safe to share across concurrent verification
/// attempts; the protocol may issue overlapping `request_clear_values`
/// calls for the same handle and relies on the provider tolerating that.
pub trait ConfidentialCompute: Send + Sync {
    /// The inclusive upper bound of the provider's plaintext domain.
    ///
    /// Callers validate input against this bound before submitting;
    /// `encrypt` re-checks and fails deterministically on violation.
    fn value_bound(&self) -> u64;

    /// Human-readable name of this provider implementation
    /// (e.g. `"MockConfidentialCompute"`).
    fn provider_name(&self) -> &str;

    /// Encrypt a plaintext value for a recipient context.
    ///
    /// Returns an opaque handle usable later for decryption, plus a proof
    /// of correct encryption bound to `context`. May suspend.
    ///
    /// # Errors
    ///
    /// [`EncryptError::ValueOutOfRange`] if `value > value_bound()`;
    /// [`EncryptError::InvalidContext`] on a malformed context. Both are
    /// deterministic — retrying with the same input fails the same way.
    fn encrypt(
        &self,
        value: u64,
        context: &AccessContext,
    ) -> impl Future<Output = Result<EncryptedValue, EncryptError>> + Send;

    /// Resolve a set of handles to clear values, with a batch proof.
    ///
    /// May suspend for an external round trip. The returned bundle maps
    /// every requested handle to its clear value.
    ///
    /// # Errors
    ///
    /// [`DecryptError::UnknownHandle`] / [`DecryptError::Unauthorized`]
    /// are terminal for this request; [`DecryptError::ServiceUnavailable`]
    /// is retryable with backoff.
    fn request_clear_values(
        &self,
        handles: &[HandleId],
        context: &AccessContext,
    ) -> impl Future<Output = Result<ClearValueBundle, DecryptError>> + Send;

    /// Check a decryption proof against a set of clear values and the
    /// context the request was made under.
    ///
    /// Pure and local: no network, no suspension, no side effects. A
    /// structurally malformed proof verifies as `false`.
    fn verify_proof(
        &self,
        proof: &DecryptionProof,
        values: &BTreeMap<HandleId, u64>,
        context: &AccessContext,
    ) -> bool;
}
