use repository::{RelationalStore, UnitOfWork};

use crate::Result;

/// Commits `uow` if `outcome` succeeded, otherwise rolls it back.
///
/// A rollback failure is logged; the original error is returned.
pub(crate) async fn finish<S: RelationalStore, T>(
    uow: UnitOfWork<S>,
    outcome: Result<T>,
    operation: &'static str,
) -> Result<T> {
    match outcome {
        Ok(value) => {
            uow.commit().await?;
            metrics::counter!("usecase_commits_total", "operation" => operation).increment(1);
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = uow.rollback().await {
                tracing::warn!(operation, error = %rollback, "rollback failed");
            }
            metrics::counter!("usecase_rollbacks_total", "operation" => operation).increment(1);
            tracing::info!(operation, error = %e, "use case rolled back");
            Err(e)
        }
    }
}
