//! # Public Record Attributes
//!
//! The non-sensitive, owner-mutable portion of a confidential record:
//! a display name, a free-text description, and a coarse logistics tag.
//! None of these fields participate in verification — they can change
//! freely without touching the ciphertext handle, status, or clear value.

use serde::{Deserialize, Serialize};

use crate::error::FieldError;

/// Coarse logistics stage of the goods a record describes.
///
/// Advisory only. The tag is owner-maintained display state and carries no
/// protocol meaning; it is ordered so dashboards can sort by progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LifecycleTag {
    /// Goods produced, not yet shipped.
    Manufactured,
    /// Goods in transit between parties.
    InTransit,
    /// Goods received by the counterparty.
    Delivered,
}

impl std::fmt::Display for LifecycleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Manufactured => "MANUFACTURED",
            Self::InTransit => "IN_TRANSIT",
            Self::Delivered => "DELIVERED",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for LifecycleTag {
    type Err = FieldError;

    /// Parse the `Display` form (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MANUFACTURED" => Ok(Self::Manufactured),
            "IN_TRANSIT" => Ok(Self::InTransit),
            "DELIVERED" => Ok(Self::Delivered),
            _ => Err(FieldError::new(
                "tag",
                format!("unknown lifecycle tag {s:?}; expected MANUFACTURED, IN_TRANSIT, or DELIVERED"),
            )),
        }
    }
}

/// The public, owner-mutable attributes of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicAttributes {
    /// Short display name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Logistics stage tag.
    pub tag: LifecycleTag,
}

impl PublicAttributes {
    /// Maximum accepted length of the display name.
    pub const MAX_NAME_LEN: usize = 255;
    /// Maximum accepted length of the description.
    pub const MAX_DESCRIPTION_LEN: usize = 1024;

    /// Validate field constraints, reporting the first offending field.
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.name.trim().is_empty() {
            return Err(FieldError::new("name", "must not be empty"));
        }
        if self.name.len() > Self::MAX_NAME_LEN {
            return Err(FieldError::new(
                "name",
                format!("must not exceed {} characters", Self::MAX_NAME_LEN),
            ));
        }
        if self.description.len() > Self::MAX_DESCRIPTION_LEN {
            return Err(FieldError::new(
                "description",
                format!("must not exceed {} characters", Self::MAX_DESCRIPTION_LEN),
            ));
        }
        Ok(())
    }
}
