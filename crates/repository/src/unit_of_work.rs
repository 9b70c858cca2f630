use std::sync::Arc;

use cache::Cache;

use crate::{InvalidationPlan, RelationalStore, Result};

/// A relational transaction plus the cache invalidations its writes caused.
///
/// Repositories invalidate as soon as they write and also record the
/// invalidation here. [`commit`](Self::commit) replays the recorded
/// invalidations after the commit succeeds, dropping any snapshot a
/// concurrent reader cached from pre-commit rows in between.
pub struct UnitOfWork<S: RelationalStore> {
    store: S,
    cache: Arc<dyn Cache>,
    tx: S::Tx,
    pending: InvalidationPlan,
}

impl<S: RelationalStore> UnitOfWork<S> {
    /// Opens a transaction on `store`.
    pub async fn begin(store: &S, cache: Arc<dyn Cache>) -> Result<Self> {
        let tx = store.begin().await.map_err(|e| crate::internal!(Store, e))?;
        Ok(Self {
            store: store.clone(),
            cache,
            tx,
            pending: InvalidationPlan::default(),
        })
    }

    pub fn tx(&mut self) -> &mut S::Tx {
        &mut self.tx
    }

    /// Records an invalidation to replay after commit.
    pub fn record(&mut self, plan: InvalidationPlan) {
        self.pending.merge(plan);
    }

    pub fn pending(&self) -> &InvalidationPlan {
        &self.pending
    }

    /// Commits the transaction, then replays recorded invalidations.
    ///
    /// A replay failure is logged and does not fail the commit.
    pub async fn commit(self) -> Result<()> {
        self.store
            .commit(self.tx)
            .await
            .map_err(|e| crate::internal!(Store, e))?;

        if let Err(e) = self.pending.apply(self.cache.as_ref()).await {
            tracing::warn!(error = %e, "post-commit cache invalidation failed");
        }
        Ok(())
    }

    /// Rolls the transaction back. Invalidations already applied stand.
    pub async fn rollback(self) -> Result<()> {
        self.store
            .rollback(self.tx)
            .await
            .map_err(|e| crate::internal!(Store, e))
    }
}
