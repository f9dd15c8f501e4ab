//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifier namespaces of the Confidential
//! Record Stack. A `RecordId` cannot be passed where a `HandleId` is
//! expected — cross-namespace confusion is a compile error.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, FieldError};

/// Unique identifier for a confidential record.
///
/// Record identifiers are assigned by the caller at creation time and are
/// immutable afterwards. The store rejects a second insert under the same
/// identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

/// Unique identifier for an opaque ciphertext handle.
///
/// Handles are minted by the confidential-compute capability and are
/// resolvable only by it. Nothing in this stack interprets the identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandleId(pub Uuid);

impl RecordId {
    /// Generate a new random record identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a record identifier from either a bare UUID or the prefixed
    /// `record:{uuid}` display form.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let raw = s.strip_prefix("record:").unwrap_or(s);
        let uuid = Uuid::parse_str(raw)
            .map_err(|e| CoreError::Parse(format!("invalid record id {s:?}: {e}")))?;
        Ok(Self(uuid))
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleId {
    /// Generate a new random handle identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for HandleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "record:{}", self.0)
    }
}

impl std::fmt::Display for HandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ct:{}", self.0)
    }
}

/// Identity of the stakeholder that owns a record.
///
/// Validated at construction: non-empty, at most 128 characters, visible
/// ASCII only. The inner string is opaque to the stack — it may be a
/// wallet address, an organizational principal, or a service account name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

impl OwnerId {
    /// Maximum accepted length of an owner identifier.
    pub const MAX_LEN: usize = 128;

    /// Validate and wrap an owner identifier.
    pub fn new(s: impl Into<String>) -> Result<Self, FieldError> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(FieldError::new("owner_id", "must not be empty"));
        }
        if s.len() > Self::MAX_LEN {
            return Err(FieldError::new(
                "owner_id",
                format!("must not exceed {} characters", Self::MAX_LEN),
            ));
        }
        if !s.chars().all(|c| c.is_ascii_graphic()) {
            return Err(FieldError::new(
                "owner_id",
                "must contain only visible ASCII characters",
            ));
        }
        Ok(Self(s))
    }

    /// Access the inner identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OwnerId {
    type Error = FieldError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<OwnerId> for String {
    fn from(id: OwnerId) -> Self {
        id.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_display_prefix() {
        let id = RecordId::new();
        let s = id.to_string();
        assert!(s.starts_with("record:"));
    }

    #[test]
    fn test_record_id_parse_bare_uuid() {
        let id = RecordId::new();
        let parsed = RecordId::parse(&id.as_uuid().to_string()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_record_id_parse_prefixed() {
        let id = RecordId::new();
        let parsed = RecordId::parse(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_record_id_parse_garbage() {
        assert!(RecordId::parse("not-a-uuid").is_err());
        assert!(RecordId::parse("record:not-a-uuid").is_err());
        assert!(RecordId::parse("").is_err());
    }

    #[test]
    fn test_handle_id_display_prefix() {
        let h = HandleId::new();
        assert!(h.to_string().starts_with("ct:"));
    }

    #[test]
    fn test_owner_id_accepts_typical_identifiers() {
        assert!(OwnerId::new("0xAb5801a7D398351b8bE11C439e05C5B3259aeC9B").is_ok());
        assert!(OwnerId::new("acme-manufacturing").is_ok());
        assert!(OwnerId::new("svc:dashboard").is_ok());
    }

    #[test]
    fn test_owner_id_rejects_empty() {
        let err = OwnerId::new("").unwrap_err();
        assert_eq!(err.field, "owner_id");
    }

    #[test]
    fn test_owner_id_rejects_whitespace_only() {
        assert!(OwnerId::new("   ").is_err());
    }

    #[test]
    fn test_owner_id_rejects_overlong() {
        assert!(OwnerId::new("x".repeat(OwnerId::MAX_LEN + 1)).is_err());
        assert!(OwnerId::new("x".repeat(OwnerId::MAX_LEN)).is_ok());
    }

    #[test]
    fn test_owner_id_rejects_control_chars() {
        assert!(OwnerId::new("owner\nid").is_err());
        assert!(OwnerId::new("owner id").is_err());
    }

    #[test]
    fn test_owner_id_serde_validates_on_deserialize() {
        let ok: Result<OwnerId, _> = serde_json::from_str("\"acme\"");
        assert!(ok.is_ok());
        let bad: Result<OwnerId, _> = serde_json::from_str("\"\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_record_id_serde_roundtrip() {
        let id = RecordId::new();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: RecordId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
