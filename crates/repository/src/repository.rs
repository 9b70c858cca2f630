use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use cache::{Cache, CacheKey, SNAPSHOT_TTL};
use chrono::Utc;
use common::EntityId;
use journey::{JourneyEvent, JourneyLog, StatusResolver};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    Column, ColumnValue, Entity, Envelope, Filter, InvalidationPlan, RelationalStore, Result,
    SparseWrite, UnitOfWork, internal, not_found,
};

/// A cache key paired with the filter that answers it on a miss.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    pub key: CacheKey,
    pub filter: Filter,
}

impl Lookup {
    pub fn new(key: CacheKey, filter: Filter) -> Self {
        Self { key, filter }
    }

    /// Lookup by primary identity, cached under `<name>:<id>`.
    pub fn by_id<E: Entity>(id: EntityId) -> Self {
        Self {
            key: CacheKey::by_id(E::NAME, id),
            filter: Filter::new(E::TABLE).eq("id", id),
        }
    }

    /// Lookup by one column, cached under `<name>:<column>:<value>`.
    pub fn by_field<E: Entity>(column: &'static str, value: impl Into<ColumnValue>) -> Self {
        let value = value.into();
        Self {
            key: CacheKey::by_field(E::NAME, column, &value),
            filter: Filter::new(E::TABLE).eq(column, value),
        }
    }

    /// Lookup by two columns, cached under `<name>:<first value>:<second value>`.
    pub fn by_pair<E: Entity>(
        first: (&'static str, ColumnValue),
        second: (&'static str, ColumnValue),
    ) -> Self {
        Self {
            key: CacheKey::by_pair(E::NAME, &first.1, &second.1),
            filter: Filter::new(E::TABLE)
                .eq(first.0, first.1)
                .eq(second.0, second.1),
        }
    }
}

impl std::fmt::Display for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.filter)
    }
}

/// Journey log and status catalog used to record status changes.
#[derive(Clone)]
pub struct Journal {
    pub log: Arc<dyn JourneyLog>,
    pub statuses: Arc<dyn StatusResolver>,
}

/// Cache-aside repository for one entity type.
///
/// Reads consult the cache first; a miss runs a COUNT, then the full query,
/// and stores the result. Writes build a sparse statement, run it inside
/// the caller's [`UnitOfWork`], record a journey event when the record
/// carries a status, and invalidate cached snapshots.
pub struct EntityRepository<S: RelationalStore, E: Entity> {
    store: S,
    cache: Arc<dyn Cache>,
    journal: Option<Journal>,
    ttl: Duration,
    _entity: PhantomData<fn() -> E>,
}

impl<S: RelationalStore, E: Entity> Clone for EntityRepository<S, E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            cache: self.cache.clone(),
            journal: self.journal.clone(),
            ttl: self.ttl,
            _entity: PhantomData,
        }
    }
}

impl<S: RelationalStore, E: Entity> EntityRepository<S, E> {
    pub fn new(store: S, cache: Arc<dyn Cache>) -> Self {
        Self {
            store,
            cache,
            journal: None,
            ttl: SNAPSHOT_TTL,
            _entity: PhantomData,
        }
    }

    /// Records a journey event for every write that carries a status.
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &Arc<dyn Cache> {
        &self.cache
    }

    /// Opens a unit of work on this repository's store and cache.
    pub async fn begin(&self) -> Result<UnitOfWork<S>> {
        UnitOfWork::begin(&self.store, self.cache.clone()).await
    }

    /// Reads one record by id.
    pub async fn get_by_id(&self, id: EntityId, count_only: bool) -> Result<Envelope<E>> {
        self.get_one_by(Lookup::by_id::<E>(id), count_only).await
    }

    /// Reads the first record matching `lookup`.
    ///
    /// Fails with NotFound when no live row matches. With `count_only` the
    /// full query is skipped and `data` is None.
    #[tracing::instrument(skip(self, lookup), fields(entity = E::NAME, key = %lookup.key))]
    pub async fn get_one_by(&self, lookup: Lookup, count_only: bool) -> Result<Envelope<E>> {
        if let Some(cached) = self.cached::<E>(&lookup.key).await? {
            return Ok(Envelope::found(cached, 1));
        }

        let total = self.count(&lookup).await?;
        if count_only {
            return Ok(Envelope::counted(total));
        }

        let rows = self
            .store
            .fetch(&lookup.filter)
            .await
            .map_err(|e| internal!(Store, e))?;
        // The row can vanish between COUNT and SELECT.
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| not_found!(E::NAME, &lookup))?;
        let entity: E = serde_json::from_value(row).map_err(|e| internal!(Serialization, e))?;

        self.populate(&lookup.key, &entity).await?;
        Ok(Envelope::found(entity, total))
    }

    /// Reads every record matching `lookup`, cached as one list.
    #[tracing::instrument(skip(self, lookup), fields(entity = E::NAME, key = %lookup.key))]
    pub async fn get_many_by(&self, lookup: Lookup, count_only: bool) -> Result<Envelope<Vec<E>>> {
        if let Some(cached) = self.cached::<Vec<E>>(&lookup.key).await? {
            let total = cached.len() as i64;
            return Ok(Envelope::found(cached, total));
        }

        let total = self.count(&lookup).await?;
        if count_only {
            return Ok(Envelope::counted(total));
        }

        let rows = self
            .store
            .fetch(&lookup.filter)
            .await
            .map_err(|e| internal!(Store, e))?;
        let entities = rows
            .into_iter()
            .map(serde_json::from_value::<E>)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| internal!(Serialization, e))?;

        self.populate(&lookup.key, &entities).await?;
        Ok(Envelope::found(entities, total))
    }

    /// Inserts the non-blank columns of `entity` and returns it with its new id.
    #[tracing::instrument(skip(self, entity, uow), fields(entity = E::NAME))]
    pub async fn insert(&self, mut entity: E, uow: &mut UnitOfWork<S>) -> Result<Envelope<E>> {
        let now = Utc::now();
        let write = SparseWrite::new(E::TABLE, entity.columns())
            .stamp("created_at", now)
            .stamp("updated_at", now);

        let id = self
            .store
            .insert(uow.tx(), &write)
            .await
            .map_err(|e| internal!(Store, e))?;

        entity.set_id(id);
        let timestamps = entity.timestamps_mut();
        timestamps.created_at = Some(now);
        timestamps.updated_at = Some(now);

        self.after_write(id, &entity, uow, "insert").await?;
        Ok(Envelope::found(entity, 1))
    }

    /// Updates the non-blank columns of `entity` on the row with `id`.
    ///
    /// Fails with NotFound when no row has that id.
    #[tracing::instrument(skip(self, entity, uow), fields(entity = E::NAME, id = %id))]
    pub async fn update_by_id(
        &self,
        id: EntityId,
        mut entity: E,
        uow: &mut UnitOfWork<S>,
    ) -> Result<Envelope<E>> {
        let now = Utc::now();
        let write = SparseWrite::new(E::TABLE, entity.columns()).stamp("updated_at", now);

        let affected = self
            .store
            .update(uow.tx(), id, &write)
            .await
            .map_err(|e| internal!(Store, e))?;
        if affected == 0 {
            return Err(not_found!(E::NAME, format!("id = {id}")));
        }

        entity.set_id(id);
        entity.timestamps_mut().updated_at = Some(now);

        self.after_write(id, &entity, uow, "update").await?;
        Ok(Envelope::found(entity, 1))
    }

    /// Soft-deletes `entity`, forcing its terminal status when it has one.
    #[tracing::instrument(skip(self, entity, uow), fields(entity = E::NAME, id = %entity.id()))]
    pub async fn delete_by_id(&self, mut entity: E, uow: &mut UnitOfWork<S>) -> Result<Envelope<E>> {
        let id = entity.id();
        let now = Utc::now();
        let mut columns = Vec::new();

        if let (Some(journal), Some(column), Some(terminal)) =
            (&self.journal, E::STATUS_COLUMN, E::TERMINAL_STATUS)
        {
            let status = journal
                .statuses
                .resolve_name(E::NAME, terminal)
                .await
                .map_err(|e| internal!(Journey, e))?;
            entity.set_status_id(status.id);
            columns.push(Column::value(column, status.id));
        }

        let write = SparseWrite::new(E::TABLE, columns)
            .stamp("updated_at", now)
            .stamp("deleted_at", now);
        let affected = self
            .store
            .update(uow.tx(), id, &write)
            .await
            .map_err(|e| internal!(Store, e))?;
        if affected == 0 {
            return Err(not_found!(E::NAME, format!("id = {id}")));
        }

        let timestamps = entity.timestamps_mut();
        timestamps.updated_at = Some(now);
        timestamps.deleted_at = Some(now);

        self.after_write(id, &entity, uow, "delete").await?;
        Ok(Envelope::found(entity, 1))
    }

    async fn after_write(
        &self,
        id: EntityId,
        entity: &E,
        uow: &mut UnitOfWork<S>,
        op: &'static str,
    ) -> Result<()> {
        metrics::counter!("repository_writes_total", "entity" => E::NAME, "op" => op)
            .increment(1);

        if let (Some(journal), Some(status_id)) = (&self.journal, entity.status_id()) {
            self.record_journey(journal, id, status_id, entity).await?;
        }

        let plan = InvalidationPlan::for_write::<E>(id);
        plan.apply(self.cache.as_ref())
            .await
            .map_err(|e| internal!(Cache, e))?;
        uow.record(plan);
        Ok(())
    }

    async fn record_journey(
        &self,
        journal: &Journal,
        id: EntityId,
        status_id: EntityId,
        entity: &E,
    ) -> Result<()> {
        let status = journal
            .statuses
            .resolve(status_id)
            .await
            .map_err(|e| internal!(Journey, e))?;
        let note = entity.journey_note();

        let event = JourneyEvent::builder()
            .entity_type(E::NAME)
            .entity_id(id)
            .status(status.name)
            .remark(note.remark)
            .reason(note.reason)
            .try_build()
            .ok_or_else(|| {
                internal!(
                    Journey,
                    journey::JourneyError::InvalidEvent("incomplete journey event".to_string())
                )
            })?;

        journal
            .log
            .append(event)
            .await
            .map_err(|e| internal!(Journey, e))?;
        metrics::counter!("journey_appends_total", "entity" => E::NAME).increment(1);
        Ok(())
    }

    async fn count(&self, lookup: &Lookup) -> Result<i64> {
        let total = self
            .store
            .count(&lookup.filter)
            .await
            .map_err(|e| internal!(Store, e))?;
        if total == 0 {
            return Err(not_found!(E::NAME, lookup));
        }
        Ok(total)
    }

    async fn cached<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>> {
        let raw = self
            .cache
            .get(key)
            .await
            .map_err(|e| internal!(Cache, e))?;
        match raw {
            Some(raw) => {
                metrics::counter!("cache_hits_total", "entity" => E::NAME).increment(1);
                let value = serde_json::from_str(&raw).map_err(|e| internal!(Serialization, e))?;
                Ok(Some(value))
            }
            None => {
                metrics::counter!("cache_misses_total", "entity" => E::NAME).increment(1);
                Ok(None)
            }
        }
    }

    async fn populate<T: Serialize + ?Sized>(&self, key: &CacheKey, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).map_err(|e| internal!(Serialization, e))?;
        self.cache
            .set(key, raw, self.ttl)
            .await
            .map_err(|e| internal!(Cache, e))
    }
}
