use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned identity of an entity record.
///
/// Wraps the integer primary key so identities of records cannot be mixed
/// up with quantities or foreign-key counts. Zero is never assigned by a
/// store and is used to mean "no relation".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(i64);

impl EntityId {
    /// Creates an entity ID from a raw key.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw key.
    pub fn get(&self) -> i64 {
        self.0
    }

    /// Returns true if this ID does not reference a record.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<EntityId> for i64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Bookkeeping timestamps carried by every entity record.
///
/// `deleted_at` marks a soft delete; rows carrying it are invisible to reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Timestamps {
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Timestamps {
    /// Returns true if the record has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_zero_means_no_relation() {
        assert!(EntityId::default().is_zero());
        assert!(!EntityId::new(5).is_zero());
    }

    #[test]
    fn entity_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&EntityId::new(42)).unwrap();
        assert_eq!(json, "42");
        let id: EntityId = serde_json::from_str("42").unwrap();
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn timestamps_default_when_columns_missing() {
        let ts: Timestamps = serde_json::from_str("{}").unwrap();
        assert_eq!(ts, Timestamps::default());
        assert!(!ts.is_deleted());
    }
}
