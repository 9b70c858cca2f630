use async_trait::async_trait;

use crate::{EntityId, JourneyError, JourneyEvent, JourneyQuery, Result};

/// Append-only store of journey events.
///
/// There is deliberately no update or delete: once appended, an event is
/// part of the entity's history for good.
#[async_trait]
pub trait JourneyLog: Send + Sync {
    /// Appends one event and returns it as stored.
    async fn append(&self, event: JourneyEvent) -> Result<JourneyEvent>;

    /// Returns an entity's events ordered by creation time, oldest first.
    async fn list_for_entity(
        &self,
        entity_type: &str,
        entity_id: EntityId,
    ) -> Result<Vec<JourneyEvent>>;

    /// Returns events matching a query, ordered by creation time.
    async fn query(&self, query: JourneyQuery) -> Result<Vec<JourneyEvent>>;
}

/// Extension trait providing convenience methods for journey logs.
#[async_trait]
pub trait JourneyLogExt: JourneyLog {
    /// Returns the most recent event for an entity.
    async fn latest_for_entity(
        &self,
        entity_type: &str,
        entity_id: EntityId,
    ) -> Result<Option<JourneyEvent>> {
        Ok(self
            .list_for_entity(entity_type, entity_id)
            .await?
            .into_iter()
            .last())
    }

    /// Returns the status names an entity has passed through, oldest first.
    async fn status_history(&self, entity_type: &str, entity_id: EntityId) -> Result<Vec<String>> {
        Ok(self
            .list_for_entity(entity_type, entity_id)
            .await?
            .into_iter()
            .map(|e| e.status)
            .collect())
    }
}

impl<T: JourneyLog + ?Sized> JourneyLogExt for T {}

/// Validates an event before appending.
pub fn validate_for_append(event: &JourneyEvent) -> Result<()> {
    if event.entity_type.is_empty() {
        return Err(JourneyError::InvalidEvent(
            "entity type is required".to_string(),
        ));
    }
    if event.entity_id.is_zero() {
        return Err(JourneyError::InvalidEvent(
            "entity id is required".to_string(),
        ));
    }
    if event.status.is_empty() {
        return Err(JourneyError::InvalidEvent("status is required".to_string()));
    }
    Ok(())
}
