//! Optimistic mutations
//!
//! Order: cancel in-flight fetches for the key, snapshot it, patch the cached
//! value, run the remote operation, restore the snapshot on failure, and mark
//! the key stale either way.

use std::future::Future;

use atelier_core::AppError;

use super::query_cache::{QueryCache, QueryKey, Snapshot};

/// An optimistic change to one cached query, open until settled or rolled back.
pub struct OptimisticUpdate<'a> {
    cache: &'a QueryCache,
    snapshot: Snapshot,
}

impl<'a> OptimisticUpdate<'a> {
    pub async fn begin(cache: &'a QueryCache, key: QueryKey) -> OptimisticUpdate<'a> {
        cache.cancel(&key).await;
        let snapshot = cache.snapshot(&key).await;
        Self { cache, snapshot }
    }

    pub fn key(&self) -> QueryKey {
        self.snapshot.key()
    }

    /// Patch the cached value. A key with nothing cached is left alone.
    pub async fn apply<T, F>(&self, patch: F)
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(&mut T),
    {
        self.cache.update::<T, F>(&self.key(), patch).await;
    }

    /// The remote operation failed: put the captured value back.
    pub async fn rollback(self) {
        let key = self.key();
        self.cache.restore(self.snapshot).await;
        self.cache.invalidate(&key).await;
        tracing::debug!(?key, "Optimistic update rolled back");
    }

    /// The remote operation succeeded.
    pub async fn settle(self) {
        self.cache.invalidate(&self.key()).await;
    }
}

/// Apply `patch` to the value cached under `key`, then run `remote`.
pub async fn run_optimistic<T, R, P, F, Fut>(
    cache: &QueryCache,
    key: QueryKey,
    patch: P,
    remote: F,
) -> Result<R, AppError>
where
    T: Clone + Send + Sync + 'static,
    P: FnOnce(&mut T),
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<R, AppError>>,
{
    let update = OptimisticUpdate::begin(cache, key).await;
    update.apply::<T, P>(patch).await;

    match remote().await {
        Ok(result) => {
            update.settle().await;
            Ok(result)
        }
        Err(e) => {
            e.log("optimistic mutation");
            update.rollback().await;
            Err(e)
        }
    }
}
