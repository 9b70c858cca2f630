use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{EntityId, JourneyError, Result};

/// A status id resolved to its canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedStatus {
    pub id: EntityId,
    pub name: String,
}

/// Resolves workflow statuses to the names recorded in journey events.
#[async_trait]
pub trait StatusResolver: Send + Sync {
    /// Looks up `status_id`, failing with `UnknownStatus` if it does not exist.
    async fn resolve(&self, status_id: EntityId) -> Result<ResolvedStatus>;

    /// Looks up a status of `order_type` by canonical name.
    async fn resolve_name(&self, order_type: &str, name: &str) -> Result<ResolvedStatus>;
}

/// Fixed status table, for tests and bootstrapping.
#[derive(Debug, Clone, Default)]
pub struct StaticStatusResolver {
    by_id: HashMap<EntityId, String>,
    by_name: HashMap<(String, String), EntityId>,
}

impl StaticStatusResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a status to the table.
    pub fn with(mut self, id: i64, order_type: &str, name: &str) -> Self {
        let id = EntityId::new(id);
        self.by_id.insert(id, name.to_string());
        self.by_name
            .insert((order_type.to_string(), name.to_string()), id);
        self
    }
}

#[async_trait]
impl StatusResolver for StaticStatusResolver {
    async fn resolve(&self, status_id: EntityId) -> Result<ResolvedStatus> {
        self.by_id
            .get(&status_id)
            .map(|name| ResolvedStatus {
                id: status_id,
                name: name.clone(),
            })
            .ok_or(JourneyError::UnknownStatus(status_id))
    }

    async fn resolve_name(&self, order_type: &str, name: &str) -> Result<ResolvedStatus> {
        self.by_name
            .get(&(order_type.to_string(), name.to_string()))
            .map(|id| ResolvedStatus {
                id: *id,
                name: name.to_string(),
            })
            .ok_or_else(|| {
                JourneyError::StatusLookup(format!("no {order_type} status named {name}"))
            })
    }
}
