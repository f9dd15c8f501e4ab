//! # Canonical Serialization — Deterministic Proof-Transcript Bytes
//!
//! Defines `CanonicalBytes`, the sole construction path for bytes used in
//! digest and proof computation across the stack.
//!
//! ## Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way to
//! construct one is through `CanonicalBytes::new()`, which rejects floats
//! and then serializes via RFC 8785 (JSON Canonicalization Scheme): sorted
//! keys, compact separators, deterministic byte sequence. Any function that
//! hashes data must accept `&CanonicalBytes`, so no code path can digest
//! non-canonical bytes.
//!
//! Proof verification recomputes digests from independently assembled
//! transcripts; a second serialization path with different byte output
//! would make honest proofs unverifiable. The constructor is the choke
//! point that rules that out.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization with float rejection.
///
/// # Invariants
///
/// - The only constructor is [`CanonicalBytes::new()`].
/// - No float appears anywhere in the value tree.
/// - Object keys are sorted, separators compact (RFC 8785).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalizationError::FloatRejected`] if the value
    /// contains a float anywhere in its tree, or
    /// [`CanonicalizationError::SerializationFailed`] if JCS serialization
    /// fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recursively reject float values.
///
/// Integers pass through; a JSON number that is representable as neither
/// `i64` nor `u64` is a float and fails canonicalization. Floats have
/// serialization edge cases that break byte-for-byte determinism, and no
/// value in this stack legitimately needs one.
fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if n.is_f64() && !n.is_i64() && !n.is_u64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(())
        }
        Value::Object(map) => map.values().try_for_each(reject_floats),
        Value::Array(arr) => arr.iter().try_for_each(reject_floats),
    }
}
