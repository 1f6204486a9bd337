//! Identifiers for Dojo entities.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique username owning all progress records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Create a username.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the raw username.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the username is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Username {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Username {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier of a curriculum requirement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequirementId(String);

impl RequirementId {
    /// Create a requirement ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the ID is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for RequirementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequirementId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RequirementId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Unique identifier for a timeline entry.
///
/// ULIDs sort by creation time, which gives entries created in the same
/// millisecond a stable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(Ulid);

impl EntryId {
    /// Generate a new EntryId
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for EntryId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_ids() {
        assert!(Username::new("").is_empty());
        assert!(!Username::new("  ").is_empty());
        assert!(!Username::new("magnus").is_empty());
        assert!(RequirementId::new("").is_empty());
        assert!(!RequirementId::new(" ").is_empty());
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&RequirementId::new("req1")).unwrap();
        assert_eq!(json, "\"req1\"");
    }

    #[test]
    fn test_entry_id_round_trips_through_display() {
        let id = EntryId::new();
        let parsed: EntryId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }
}
