use cache::{Cache, CacheKey};
use common::EntityId;

use crate::{Entity, Invalidation};

/// Cache keys and namespaces to drop after a write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationPlan {
    keys: Vec<CacheKey>,
    namespaces: Vec<String>,
}

impl InvalidationPlan {
    /// Plans the invalidation for a write to the `E` with `id`.
    pub fn for_write<E: Entity>(id: EntityId) -> Self {
        let mut plan = Self::default();
        match E::INVALIDATION {
            Invalidation::ExactKey => plan.add_key(CacheKey::by_id(E::NAME, id)),
            Invalidation::Namespace => plan.add_namespace(E::NAME),
        }
        for key in E::dependent_keys(id) {
            plan.add_key(key);
        }
        for namespace in E::DEPENDENT_NAMESPACES {
            plan.add_namespace(namespace);
        }
        plan
    }

    pub fn add_key(&mut self, key: CacheKey) {
        if !self.keys.contains(&key) {
            self.keys.push(key);
        }
    }

    pub fn add_namespace(&mut self, namespace: &str) {
        if !self.namespaces.iter().any(|n| n == namespace) {
            self.namespaces.push(namespace.to_string());
        }
    }

    /// Folds another plan into this one.
    pub fn merge(&mut self, other: InvalidationPlan) {
        for key in other.keys {
            self.add_key(key);
        }
        for namespace in other.namespaces {
            self.add_namespace(&namespace);
        }
    }

    pub fn keys(&self) -> &[CacheKey] {
        &self.keys
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.namespaces.is_empty()
    }

    /// Deletes the planned keys, then purges the planned namespaces.
    pub async fn apply(&self, cache: &dyn Cache) -> cache::Result<()> {
        if !self.keys.is_empty() {
            cache.delete(&self.keys).await?;
        }
        for namespace in &self.namespaces {
            cache.purge_namespace(namespace).await?;
        }
        Ok(())
    }
}
