//! Spawned sub-lookups that are cancelled when dropped.

use std::future::Future;

use tokio::task::JoinHandle;

use crate::{AggregateError, Result};

/// Handle to a spawned task producing exactly one value.
///
/// Unlike a bare [`JoinHandle`], dropping a `Pending` aborts the task. A
/// fan-in that returns early on the first error therefore cancels every
/// sibling lookup still in flight.
#[derive(Debug)]
pub struct Pending<T> {
    handle: JoinHandle<T>,
}

impl<T: Send + 'static> Pending<T> {
    /// Spawns `future` onto the current runtime.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(future),
        }
    }

    /// Waits for the task's value.
    ///
    /// Fails if the task panicked or was aborted.
    pub async fn join(mut self) -> Result<T> {
        (&mut self.handle).await.map_err(AggregateError::join)
    }
}

impl<T> Drop for Pending<T> {
    fn drop(&mut self) {
        // No-op once the task has finished.
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn join_returns_the_value() {
        let pending = Pending::spawn(async { 41 + 1 });
        assert_eq!(pending.join().await.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_aborts_the_task() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        let pending = Pending::spawn(async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            flag.store(true, Ordering::SeqCst);
        });

        tokio::task::yield_now().await;
        drop(pending);
        tokio::time::sleep(Duration::from_secs(20)).await;

        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn early_return_cancels_later_siblings() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();

        async fn fan_in(
            first: Pending<std::result::Result<(), &'static str>>,
            second: Pending<std::result::Result<(), &'static str>>,
        ) -> std::result::Result<(), &'static str> {
            first.join().await.map_err(|_| "join")??;
            second.join().await.map_err(|_| "join")??;
            Ok(())
        }

        let first = Pending::spawn(async { Err("boom") });
        let second = Pending::spawn(async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        assert_eq!(fan_in(first, second).await, Err("boom"));
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn panics_surface_as_join_errors() {
        let pending = Pending::<()>::spawn(async {
            panic!("lookup exploded");
        });
        let err = pending.join().await.unwrap_err();
        assert_eq!(err.kind(), common::ErrorKind::Internal);
    }
}
