use chrono::{DateTime, Utc};

use crate::EntityId;

/// Builder for constructing journey queries.
///
/// Results are always ordered by creation time, oldest first.
#[derive(Debug, Clone, Default)]
pub struct JourneyQuery {
    /// Filter by entity type.
    pub entity_type: Option<String>,

    /// Filter by entity ID.
    pub entity_id: Option<EntityId>,

    /// Filter by status names (any of these).
    pub statuses: Option<Vec<String>>,

    /// Filter by events at or after this timestamp.
    pub from_timestamp: Option<DateTime<Utc>>,

    /// Filter by events at or before this timestamp.
    pub to_timestamp: Option<DateTime<Utc>>,

    /// Maximum number of events to return.
    pub limit: Option<usize>,

    /// Number of events to skip.
    pub offset: Option<usize>,
}

impl JourneyQuery {
    /// Creates a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for one entity's history.
    pub fn for_entity(entity_type: impl Into<String>, entity_id: EntityId) -> Self {
        Self {
            entity_type: Some(entity_type.into()),
            entity_id: Some(entity_id),
            ..Default::default()
        }
    }

    /// Filters by entity type.
    pub fn entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Filters by a single status.
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.statuses = Some(vec![status.into()]);
        self
    }

    /// Filters by several statuses (any of these).
    pub fn statuses(mut self, statuses: Vec<String>) -> Self {
        self.statuses = Some(statuses);
        self
    }

    /// Filters to events at or after this timestamp.
    pub fn from_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.from_timestamp = Some(timestamp);
        self
    }

    /// Filters to events at or before this timestamp.
    pub fn to_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.to_timestamp = Some(timestamp);
        self
    }

    /// Limits the number of events returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips this many events before returning results.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}
