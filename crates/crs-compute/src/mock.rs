//! # Mock Confidential Compute Provider
//!
//! A deterministic, in-process stand-in for the real confidential-compute
//! capability. Values are held in a plaintext vault keyed by opaque
//! handles; proofs are transparent SHA-256 digests over canonical
//! transcripts that `verify_proof` recomputes.
//!
//! ## Security Warning
//!
//! **NOT PRIVATE.** Anyone holding the inputs can recompute the proofs,
//! and the "ciphertext" is a vault lookup. The mock exists so the
//! lifecycle protocol, its races, and its failure paths can be exercised
//! without a cryptographic backend.
//!
//! ## Scenario knobs
//!
//! - [`with_latency`](MockConfidentialCompute::with_latency) — every
//!   encrypt/decrypt call sleeps first, modeling the external approval
//!   round trip; widens race windows in concurrency tests.
//! - [`set_outage`](MockConfidentialCompute::set_outage) — clear-value
//!   requests fail with the retryable `ServiceUnavailable` class until
//!   the outage is lifted.
//! - [`corrupt_next_proof`](MockConfidentialCompute::corrupt_next_proof)
//!   — exactly one subsequent clear-value response carries a well-formed
//!   proof that does not verify.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::json;

use crs_core::{sha256_hex, CanonicalBytes, CanonicalizationError, HandleId};

use crate::error::{DecryptError, EncryptError};
use crate::traits::ConfidentialCompute;
use crate::types::{
    AccessContext, ClearValueBundle, DecryptionProof, EncryptedValue, InclusionProof,
};

const PROVIDER_NAME: &str = "MockConfidentialCompute";

/// One encrypted value as the mock stores it: the plaintext and the
/// requester it was encrypted for.
#[derive(Debug, Clone)]
struct VaultEntry {
    value: u64,
    recipient: String,
}

/// Deterministic in-process provider. See the module docs for the
/// scenario knobs.
pub struct MockConfidentialCompute {
    vault: DashMap<HandleId, VaultEntry>,
    latency: Option<Duration>,
    outage: Mutex<Option<String>>,
    corrupt_next: AtomicBool,
}

impl MockConfidentialCompute {
    /// Inclusive upper bound of the mock's plaintext domain: 32-bit
    /// encrypted counters.
    pub const VALUE_BOUND: u64 = u32::MAX as u64;

    /// Create a provider with no latency and no failures armed.
    pub fn new() -> Self {
        Self {
            vault: DashMap::new(),
            latency: None,
            outage: Mutex::new(None),
            corrupt_next: AtomicBool::new(false),
        }
    }

    /// Sleep this long at the start of every encrypt/decrypt call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Force (or lift, with `None`) a service outage. While set, every
    /// clear-value request fails `ServiceUnavailable` with this reason.
    pub fn set_outage(&self, reason: Option<&str>) {
        *self.outage.lock() = reason.map(str::to_string);
    }

    /// Arm a one-shot proof corruption: the next clear-value response
    /// carries a proof that is well-formed but does not verify.
    pub fn corrupt_next_proof(&self) {
        self.corrupt_next.store(true, Ordering::SeqCst);
    }

    /// Number of ciphertexts currently held in the vault.
    pub fn vault_len(&self) -> usize {
        self.vault.len()
    }

    async fn simulate_round_trip(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    /// Transcript digest binding a fresh handle to its recipient context.
    fn inclusion_proof_hex(
        handle: &HandleId,
        context: &AccessContext,
    ) -> Result<String, CanonicalizationError> {
        let transcript = CanonicalBytes::new(&json!({
            "op": "encrypt",
            "provider": PROVIDER_NAME,
            "handle": handle,
            "requester": context.requester,
            "purpose": context.purpose,
        }))?;
        Ok(sha256_hex(&transcript))
    }

    /// Transcript digest binding a batch of clear values to the handles
    /// that produced them and the context that requested them.
    fn decryption_proof_hex(
        values: &BTreeMap<HandleId, u64>,
        context: &AccessContext,
        corrupted: bool,
    ) -> Result<String, CanonicalizationError> {
        let transcript = CanonicalBytes::new(&json!({
            "op": "decrypt",
            "provider": PROVIDER_NAME,
            "values": values,
            "requester": context.requester,
            "purpose": context.purpose,
            "corrupted": corrupted,
        }))?;
        Ok(sha256_hex(&transcript))
    }
}

impl Default for MockConfidentialCompute {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfidentialCompute for MockConfidentialCompute {
    fn value_bound(&self) -> u64 {
        Self::VALUE_BOUND
    }

    fn provider_name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn encrypt(
        &self,
        value: u64,
        context: &AccessContext,
    ) -> Result<EncryptedValue, EncryptError> {
        if context.requester.trim().is_empty() {
            return Err(EncryptError::InvalidContext {
                reason: "requester must not be empty".to_string(),
            });
        }
        if value > Self::VALUE_BOUND {
            return Err(EncryptError::ValueOutOfRange {
                value,
                bound: Self::VALUE_BOUND,
            });
        }

        self.simulate_round_trip().await;

        let handle = HandleId::new();
        let proof_hex =
            Self::inclusion_proof_hex(&handle, context).map_err(|e| EncryptError::InvalidContext {
                reason: format!("context not canonicalizable: {e}"),
            })?;

        self.vault.insert(
            handle,
            VaultEntry {
                value,
                recipient: context.requester.clone(),
            },
        );
        tracing::debug!(handle = %handle, requester = %context.requester, "ciphertext minted");

        Ok(EncryptedValue {
            handle,
            proof: InclusionProof { proof_hex },
        })
    }

    async fn request_clear_values(
        &self,
        handles: &[HandleId],
        context: &AccessContext,
    ) -> Result<ClearValueBundle, DecryptError> {
        self.simulate_round_trip().await;

        if let Some(reason) = self.outage.lock().clone() {
            return Err(DecryptError::ServiceUnavailable { reason });
        }

        let mut values = BTreeMap::new();
        for handle in handles {
            let entry = self
                .vault
                .get(handle)
                .ok_or(DecryptError::UnknownHandle { handle: *handle })?;
            if entry.recipient != context.requester {
                return Err(DecryptError::Unauthorized {
                    requester: context.requester.clone(),
                });
            }
            values.insert(*handle, entry.value);
        }

        let corrupted = self.corrupt_next.swap(false, Ordering::SeqCst);
        let proof_hex = Self::decryption_proof_hex(&values, context, corrupted).map_err(|e| {
            DecryptError::ServiceUnavailable {
                reason: format!("proof transcript encoding failed: {e}"),
            }
        })?;
        tracing::debug!(
            handles = handles.len(),
            requester = %context.requester,
            corrupted,
            "clear values released"
        );

        Ok(ClearValueBundle {
            values,
            proof: DecryptionProof { proof_hex },
        })
    }

    fn verify_proof(
        &self,
        proof: &DecryptionProof,
        values: &BTreeMap<HandleId, u64>,
        context: &AccessContext,
    ) -> bool {
        if !proof.is_well_formed() {
            return false;
        }
        match Self::decryption_proof_hex(values, context, false) {
            Ok(expected) => proof.proof_hex == expected,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> AccessContext {
        AccessContext::for_verification("coordinator")
    }

    #[tokio::test]
    async fn encrypt_then_decrypt_roundtrip() {
        let provider = MockConfidentialCompute::new();
        let encrypted = provider.encrypt(42, &ctx()).await.unwrap();

        let bundle = provider
            .request_clear_values(&[encrypted.handle], &ctx())
            .await
            .unwrap();
        assert_eq!(bundle.value_for(&encrypted.handle), Some(42));
        assert!(provider.verify_proof(&bundle.proof, &bundle.values, &ctx()));
    }

    #[tokio::test]
    async fn encrypt_rejects_out_of_range_value() {
        let provider = MockConfidentialCompute::new();
        let result = provider
            .encrypt(MockConfidentialCompute::VALUE_BOUND + 1, &ctx())
            .await;
        match result.unwrap_err() {
            EncryptError::ValueOutOfRange { bound, .. } => {
                assert_eq!(bound, MockConfidentialCompute::VALUE_BOUND)
            }
            other => panic!("expected ValueOutOfRange, got: {other}"),
        }
    }

    #[tokio::test]
    async fn encrypt_rejects_empty_requester() {
        let provider = MockConfidentialCompute::new();
        let bad = AccessContext {
            requester: "  ".to_string(),
            purpose: "record-verification".to_string(),
        };
        assert!(matches!(
            provider.encrypt(1, &bad).await,
            Err(EncryptError::InvalidContext { .. })
        ));
    }

    #[tokio::test]
    async fn decrypt_unknown_handle_fails() {
        let provider = MockConfidentialCompute::new();
        let result = provider
            .request_clear_values(&[HandleId::new()], &ctx())
            .await;
        assert!(matches!(result, Err(DecryptError::UnknownHandle { .. })));
    }

    #[tokio::test]
    async fn decrypt_wrong_requester_unauthorized() {
        let provider = MockConfidentialCompute::new();
        let encrypted = provider.encrypt(5, &ctx()).await.unwrap();

        let stranger = AccessContext::for_verification("stranger");
        let result = provider
            .request_clear_values(&[encrypted.handle], &stranger)
            .await;
        match result.unwrap_err() {
            DecryptError::Unauthorized { requester } => assert_eq!(requester, "stranger"),
            other => panic!("expected Unauthorized, got: {other}"),
        }
    }

    #[tokio::test]
    async fn outage_is_retryable_and_liftable() {
        let provider = MockConfidentialCompute::new();
        let encrypted = provider.encrypt(9, &ctx()).await.unwrap();

        provider.set_outage(Some("threshold committee offline"));
        let err = provider
            .request_clear_values(&[encrypted.handle], &ctx())
            .await
            .unwrap_err();
        assert!(err.is_retryable());

        provider.set_outage(None);
        assert!(provider
            .request_clear_values(&[encrypted.handle], &ctx())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn corrupted_proof_is_well_formed_but_invalid() {
        let provider = MockConfidentialCompute::new();
        let encrypted = provider.encrypt(13, &ctx()).await.unwrap();

        provider.corrupt_next_proof();
        let bad = provider
            .request_clear_values(&[encrypted.handle], &ctx())
            .await
            .unwrap();
        assert!(bad.proof.is_well_formed());
        assert!(!provider.verify_proof(&bad.proof, &bad.values, &ctx()));

        // One-shot: the next round trip verifies again.
        let good = provider
            .request_clear_values(&[encrypted.handle], &ctx())
            .await
            .unwrap();
        assert!(provider.verify_proof(&good.proof, &good.values, &ctx()));
    }

    #[tokio::test]
    async fn proof_is_bound_to_context() {
        let provider = MockConfidentialCompute::new();
        let encrypted = provider.encrypt(21, &ctx()).await.unwrap();
        let bundle = provider
            .request_clear_values(&[encrypted.handle], &ctx())
            .await
            .unwrap();

        let other = AccessContext::for_verification("someone-else");
        assert!(!provider.verify_proof(&bundle.proof, &bundle.values, &other));
    }

    #[tokio::test]
    async fn proof_is_bound_to_values() {
        let provider = MockConfidentialCompute::new();
        let encrypted = provider.encrypt(30, &ctx()).await.unwrap();
        let bundle = provider
            .request_clear_values(&[encrypted.handle], &ctx())
            .await
            .unwrap();

        let mut tampered = bundle.values.clone();
        tampered.insert(encrypted.handle, 31);
        assert!(!provider.verify_proof(&bundle.proof, &tampered, &ctx()));
    }

    #[tokio::test]
    async fn latency_delays_but_preserves_results() {
        let provider = MockConfidentialCompute::new().with_latency(Duration::from_millis(10));
        let start = std::time::Instant::now();
        let encrypted = provider.encrypt(3, &ctx()).await.unwrap();
        let bundle = provider
            .request_clear_values(&[encrypted.handle], &ctx())
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert_eq!(bundle.value_for(&encrypted.handle), Some(3));
    }

    #[tokio::test]
    async fn distinct_encryptions_mint_distinct_handles() {
        let provider = MockConfidentialCompute::new();
        let a = provider.encrypt(1, &ctx()).await.unwrap();
        let b = provider.encrypt(1, &ctx()).await.unwrap();
        assert_ne!(a.handle, b.handle);
        assert_eq!(provider.vault_len(), 2);
    }
}
