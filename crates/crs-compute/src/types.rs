//! # Capability Wire Types
//!
//! The request and response shapes of the confidential-compute capability:
//! access contexts, ciphertext references, and the two proof kinds.
//!
//! Proofs are carried as hex-encoded digest strings. Their meaning is
//! provider-specific — this stack only ever hands a proof back to the
//! capability that produced it (or to its local verifier).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crs_core::HandleId;

/// The context a ciphertext is bound to at encryption time, and that a
/// later decryption request must present.
///
/// The provider decides what the fields mean; this stack treats them as
/// an opaque credential. The mock provider authorizes the requester that
/// a handle was encrypted for and rejects everyone else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessContext {
    /// Identity of the party requesting the operation.
    pub requester: String,
    /// Declared purpose of the request, bound into proofs.
    pub purpose: String,
}

impl AccessContext {
    /// Build a context for the standard verification purpose.
    pub fn for_verification(requester: impl Into<String>) -> Self {
        Self {
            requester: requester.into(),
            purpose: "record-verification".to_string(),
        }
    }
}

/// Proof that a ciphertext was produced correctly for a context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    /// Hex-encoded proof digest.
    pub proof_hex: String,
}

/// Proof that a set of clear values is the correct decryption of the
/// requested handles under a context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionProof {
    /// Hex-encoded proof digest.
    pub proof_hex: String,
}

impl DecryptionProof {
    /// Structural well-formedness: 64 lowercase hex characters.
    ///
    /// A malformed proof can never verify; checking the shape first lets
    /// verifiers skip digest recomputation for garbage input.
    pub fn is_well_formed(&self) -> bool {
        self.proof_hex.len() == 64 && self.proof_hex.chars().all(|c| c.is_ascii_hexdigit())
    }
}

/// Result of encrypting one value: the opaque handle plus its proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedValue {
    /// Opaque reference to the ciphertext, resolvable only by the provider.
    pub handle: HandleId,
    /// Proof of correct encryption, bound to the recipient context.
    pub proof: InclusionProof,
}

/// Result of a clear-value request: the decrypted values keyed by handle,
/// plus a single proof covering the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearValueBundle {
    /// Decrypted values, keyed by the handle they resolve.
    pub values: BTreeMap<HandleId, u64>,
    /// Proof binding the values to the handles and the context.
    pub proof: DecryptionProof,
}

impl ClearValueBundle {
    /// Look up the clear value for one handle.
    pub fn value_for(&self, handle: &HandleId) -> Option<u64> {
        self.values.get(handle).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_context_for_verification() {
        let ctx = AccessContext::for_verification("coordinator");
        assert_eq!(ctx.requester, "coordinator");
        assert_eq!(ctx.purpose, "record-verification");
    }

    #[test]
    fn test_decryption_proof_well_formedness() {
        let good = DecryptionProof {
            proof_hex: "ab".repeat(32),
        };
        assert!(good.is_well_formed());

        let short = DecryptionProof {
            proof_hex: "abcd".to_string(),
        };
        assert!(!short.is_well_formed());

        let nonhex = DecryptionProof {
            proof_hex: "zz".repeat(32),
        };
        assert!(!nonhex.is_well_formed());
    }

    #[test]
    fn test_bundle_value_lookup() {
        let h = HandleId::new();
        let other = HandleId::new();
        let bundle = ClearValueBundle {
            values: [(h, 42u64)].into_iter().collect(),
            proof: DecryptionProof {
                proof_hex: "00".repeat(32),
            },
        };
        assert_eq!(bundle.value_for(&h), Some(42));
        assert_eq!(bundle.value_for(&other), None);
    }

    #[test]
    fn test_bundle_serde_roundtrip() {
        let h = HandleId::new();
        let bundle = ClearValueBundle {
            values: [(h, 7u64)].into_iter().collect(),
            proof: DecryptionProof {
                proof_hex: "11".repeat(32),
            },
        };
        let json = serde_json::to_string(&bundle).unwrap();
        let parsed: ClearValueBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, bundle);
    }
}
