use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::log::validate_for_append;
use crate::{EntityId, JourneyError, JourneyEvent, JourneyLog, JourneyQuery, Result};

/// In-memory journey log implementation for testing.
///
/// Provides the same interface as the PostgreSQL implementation. Events
/// with equal timestamps keep their insertion order.
#[derive(Clone, Default)]
pub struct InMemoryJourneyLog {
    events: Arc<RwLock<Vec<JourneyEvent>>>,
    fail_appends: Arc<AtomicBool>,
}

impl InMemoryJourneyLog {
    /// Creates a new empty journey log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent appends fail as if the store were unreachable.
    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Returns the total number of events stored.
    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }

    /// Clears all events.
    pub async fn clear(&self) {
        self.events.write().await.clear();
    }
}

#[async_trait]
impl JourneyLog for InMemoryJourneyLog {
    async fn append(&self, event: JourneyEvent) -> Result<JourneyEvent> {
        validate_for_append(&event)?;
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(JourneyError::Unavailable("appends disabled".to_string()));
        }

        self.events.write().await.push(event.clone());
        Ok(event)
    }

    async fn list_for_entity(
        &self,
        entity_type: &str,
        entity_id: EntityId,
    ) -> Result<Vec<JourneyEvent>> {
        self.query(JourneyQuery::for_entity(entity_type, entity_id))
            .await
    }

    async fn query(&self, query: JourneyQuery) -> Result<Vec<JourneyEvent>> {
        let store = self.events.read().await;
        let mut events: Vec<_> = store
            .iter()
            .filter(|e| {
                if let Some(ref entity_type) = query.entity_type
                    && &e.entity_type != entity_type
                {
                    return false;
                }
                if let Some(id) = query.entity_id
                    && e.entity_id != id
                {
                    return false;
                }
                if let Some(ref statuses) = query.statuses
                    && !statuses.contains(&e.status)
                {
                    return false;
                }
                if let Some(from) = query.from_timestamp
                    && e.created_at < from
                {
                    return false;
                }
                if let Some(to) = query.to_timestamp
                    && e.created_at > to
                {
                    return false;
                }
                true
            })
            .cloned()
            .collect();

        // Stable sort keeps insertion order for equal timestamps
        events.sort_by_key(|e| e.created_at);

        let offset = query.offset.unwrap_or(0);
        let events = events.into_iter().skip(offset);
        let events = match query.limit {
            Some(limit) => events.take(limit).collect(),
            None => events.collect(),
        };

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::JourneyLogExt;

    fn event(entity_id: i64, status: &str) -> JourneyEvent {
        JourneyEvent::builder()
            .entity_type("sales_order")
            .entity_id(EntityId::new(entity_id))
            .status(status)
            .try_build()
            .unwrap()
    }

    #[tokio::test]
    async fn append_and_list_for_entity() {
        let log = InMemoryJourneyLog::new();
        log.append(event(1, "open")).await.unwrap();
        log.append(event(2, "open")).await.unwrap();
        log.append(event(1, "partial")).await.unwrap();

        let history = log.list_for_entity("sales_order", EntityId::new(1)).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].status, "open");
        assert_eq!(history[1].status, "partial");
    }

    #[tokio::test]
    async fn list_orders_by_creation_time() {
        let log = InMemoryJourneyLog::new();
        let now = Utc::now();
        let mut late = event(1, "closed");
        late.created_at = now;
        let mut early = event(1, "open");
        early.created_at = now - Duration::seconds(10);

        log.append(late).await.unwrap();
        log.append(early).await.unwrap();

        let history = log.status_history("sales_order", EntityId::new(1)).await.unwrap();
        assert_eq!(history, vec!["open", "closed"]);
    }

    #[tokio::test]
    async fn append_rejects_invalid_events() {
        let log = InMemoryJourneyLog::new();
        let mut invalid = event(1, "open");
        invalid.entity_id = EntityId::default();

        assert!(matches!(
            log.append(invalid).await,
            Err(JourneyError::InvalidEvent(_))
        ));
        assert_eq!(log.event_count().await, 0);
    }

    #[tokio::test]
    async fn failure_injection_blocks_appends() {
        let log = InMemoryJourneyLog::new();
        log.set_fail_appends(true);

        assert!(matches!(
            log.append(event(1, "open")).await,
            Err(JourneyError::Unavailable(_))
        ));
        assert_eq!(log.event_count().await, 0);
    }

    #[tokio::test]
    async fn query_with_status_filter_and_paging() {
        let log = InMemoryJourneyLog::new();
        for id in 1..=5 {
            log.append(event(id, "open")).await.unwrap();
        }
        log.append(event(1, "closed")).await.unwrap();

        let open = log
            .query(JourneyQuery::new().status("open").offset(1).limit(2))
            .await
            .unwrap();
        assert_eq!(open.len(), 2);
        assert_eq!(open[0].entity_id, EntityId::new(2));

        let latest = log.latest_for_entity("sales_order", EntityId::new(1)).await.unwrap();
        assert_eq!(latest.unwrap().status, "closed");
    }
}
