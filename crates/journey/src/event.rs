use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EntityId;

/// Unique identifier for a journey event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JourneyEventId(Uuid);

impl JourneyEventId {
    /// Creates a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an event ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for JourneyEventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JourneyEventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One immutable entry in an entity's status history.
///
/// `status` holds the canonical status name resolved when the event was
/// recorded, so renaming a status later never rewrites history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyEvent {
    /// Unique identifier for this event.
    pub id: JourneyEventId,

    /// The kind of entity (e.g., "sales_order", "delivery_order").
    pub entity_type: String,

    /// The entity whose status changed.
    pub entity_id: EntityId,

    /// Canonical status name at the time of the event.
    pub status: String,

    /// Free-form remark supplied by the caller.
    pub remark: String,

    /// Reason for the transition, if any.
    pub reason: String,

    /// When the event was recorded.
    pub created_at: DateTime<Utc>,
}

impl JourneyEvent {
    /// Creates a new journey event builder.
    pub fn builder() -> JourneyEventBuilder {
        JourneyEventBuilder::default()
    }
}

/// Builder for constructing journey events.
#[derive(Debug, Default)]
pub struct JourneyEventBuilder {
    id: Option<JourneyEventId>,
    entity_type: Option<String>,
    entity_id: Option<EntityId>,
    status: Option<String>,
    remark: String,
    reason: String,
    created_at: Option<DateTime<Utc>>,
}

impl JourneyEventBuilder {
    /// Sets the event ID. If not set, a new ID will be generated.
    pub fn id(mut self, id: JourneyEventId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the entity type.
    pub fn entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Sets the entity ID.
    pub fn entity_id(mut self, id: EntityId) -> Self {
        self.entity_id = Some(id);
        self
    }

    /// Sets the canonical status name.
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the remark.
    pub fn remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = remark.into();
        self
    }

    /// Sets the reason.
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Sets the creation time. If not set, the current time will be used.
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Builds the event, returning None if entity type, entity id or status is missing.
    pub fn try_build(self) -> Option<JourneyEvent> {
        Some(JourneyEvent {
            id: self.id.unwrap_or_default(),
            entity_type: self.entity_type?,
            entity_id: self.entity_id?,
            status: self.status?,
            remark: self.remark,
            reason: self.reason,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        })
    }
}
