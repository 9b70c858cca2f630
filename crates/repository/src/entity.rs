use cache::CacheKey;
use common::{EntityId, Timestamps};
use serde::{Serialize, de::DeserializeOwned};

use crate::Column;

/// How a write to an entity invalidates cached snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    /// Delete only the `<name>:<id>` key.
    ExactKey,
    /// Purge every key in the entity's namespace, covering lookups by
    /// secondary fields and lists.
    Namespace,
}

/// Caller-supplied context recorded with a journey event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JourneyNote {
    pub remark: String,
    pub reason: String,
}

impl JourneyNote {
    pub fn new(remark: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            remark: remark.into(),
            reason: reason.into(),
        }
    }
}

/// A persisted record handled by an [`EntityRepository`](crate::EntityRepository).
///
/// Rows are decoded from their JSON form, so implementors derive
/// `Deserialize` with `#[serde(default)]`; columns the store left at
/// their defaults may be absent.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Cache namespace and journey entity type, e.g. `sales_order`.
    const NAME: &'static str;

    /// Backing table.
    const TABLE: &'static str;

    const INVALIDATION: Invalidation;

    /// Namespaces of composite views embedding this entity, purged on every write.
    const DEPENDENT_NAMESPACES: &'static [&'static str] = &[];

    /// Column holding the workflow status, for status-bearing entities.
    const STATUS_COLUMN: Option<&'static str> = None;

    /// Status forced on soft delete, for status-bearing entities.
    const TERMINAL_STATUS: Option<&'static str> = None;

    fn id(&self) -> EntityId;

    fn set_id(&mut self, id: EntityId);

    fn timestamps_mut(&mut self) -> &mut Timestamps;

    /// Every writable column; blank ones are dropped when the write is built.
    fn columns(&self) -> Vec<Column>;

    /// Exact keys of composite views embedding the record with `id`.
    fn dependent_keys(_id: EntityId) -> Vec<CacheKey> {
        Vec::new()
    }

    /// The workflow status this record carries, if set.
    fn status_id(&self) -> Option<EntityId> {
        None
    }

    fn set_status_id(&mut self, _status_id: EntityId) {}

    /// Remark and reason for the journey event of the next write.
    fn journey_note(&self) -> JourneyNote {
        JourneyNote::default()
    }
}
