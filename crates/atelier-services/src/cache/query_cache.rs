//! Keyed query cache
//!
//! Holds the last fetched value per query, tracks in-flight fetches so they
//! can be cancelled, and supports snapshot/restore for optimistic mutations.
//! Values are stored type-erased; callers read them back with the type they
//! stored.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use atelier_core::AppError;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Data served fresh before a refetch
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Projects,
    MediaAssets,
    EditedImages,
    GeneratedVideos,
    Lineages,
    Timeline,
}

/// Cache key: what is listed, under which parent, for which user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub kind: QueryKind,
    /// Project or lineage the query is scoped to; `None` for per-user lists.
    pub scope: Option<Uuid>,
    pub user: Uuid,
}

impl QueryKey {
    pub fn new(kind: QueryKind, scope: Option<Uuid>, user: Uuid) -> Self {
        Self { kind, scope, user }
    }

    pub fn projects(user: Uuid) -> Self {
        Self::new(QueryKind::Projects, None, user)
    }

    pub fn media_assets(project_id: Uuid, user: Uuid) -> Self {
        Self::new(QueryKind::MediaAssets, Some(project_id), user)
    }

    pub fn edited_images(project_id: Uuid, user: Uuid) -> Self {
        Self::new(QueryKind::EditedImages, Some(project_id), user)
    }

    pub fn generated_videos(project_id: Uuid, user: Uuid) -> Self {
        Self::new(QueryKind::GeneratedVideos, Some(project_id), user)
    }

    pub fn lineages(project_id: Uuid, user: Uuid) -> Self {
        Self::new(QueryKind::Lineages, Some(project_id), user)
    }

    pub fn timeline(lineage_id: Uuid, user: Uuid) -> Self {
        Self::new(QueryKind::Timeline, Some(lineage_id), user)
    }
}

type CachedValue = Arc<dyn Any + Send + Sync>;

struct Entry {
    value: CachedValue,
    updated_at: Instant,
    invalidated: bool,
}

struct InFlight {
    id: u64,
    token: CancellationToken,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<QueryKey, Entry>,
    in_flight: HashMap<QueryKey, InFlight>,
}

/// Cached value of one key at a point in time, absent or present.
#[derive(Clone)]
pub struct Snapshot {
    key: QueryKey,
    value: Option<CachedValue>,
}

impl Snapshot {
    pub fn key(&self) -> QueryKey {
        self.key
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// Typed view of the captured value.
    pub fn value<T: Clone + 'static>(&self) -> Option<T> {
        self.value.as_ref()?.downcast_ref::<T>().cloned()
    }
}

pub struct QueryCache {
    state: Mutex<CacheState>,
    stale_time: Duration,
    next_fetch_id: AtomicU64,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::with_stale_time(DEFAULT_STALE_TIME)
    }

    pub fn with_stale_time(stale_time: Duration) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            stale_time,
            next_fetch_id: AtomicU64::new(1),
        }
    }

    /// Cached value for `key`, stale or not.
    pub async fn get<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let state = self.state.lock().await;
        state
            .entries
            .get(key)
            .and_then(|entry| entry.value.downcast_ref::<T>().cloned())
    }

    pub async fn set<T>(&self, key: QueryKey, value: T)
    where
        T: Send + Sync + 'static,
    {
        let mut state = self.state.lock().await;
        state.entries.insert(
            key,
            Entry {
                value: Arc::new(value),
                updated_at: Instant::now(),
                invalidated: false,
            },
        );
    }

    /// Patch the cached value in place. Returns false when nothing of type
    /// `T` is cached under `key`.
    pub async fn update<T, F>(&self, key: &QueryKey, patch: F) -> bool
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(&mut T),
    {
        let mut state = self.state.lock().await;
        let Some(entry) = state.entries.get_mut(key) else {
            return false;
        };
        let Some(current) = entry.value.downcast_ref::<T>() else {
            tracing::warn!(?key, "Cached value has a different type, skipping patch");
            return false;
        };

        let mut next = current.clone();
        patch(&mut next);
        entry.value = Arc::new(next);
        true
    }

    /// Serve `key` from cache when fresh; otherwise run `fetcher` and store
    /// its result.
    ///
    /// The fetch can be aborted with [`QueryCache::cancel`], in which case it
    /// returns `AppError::Cancelled` and stores nothing. A fetch superseded by
    /// a newer one for the same key returns its value without storing it.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T, AppError>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let id = self.next_fetch_id.fetch_add(1, Ordering::Relaxed);
        let token = {
            let mut state = self.state.lock().await;
            if let Some(entry) = state.entries.get(&key) {
                if !self.entry_is_stale(entry) {
                    if let Some(value) = entry.value.downcast_ref::<T>() {
                        return Ok(value.clone());
                    }
                }
            }
            let token = CancellationToken::new();
            state.in_flight.insert(
                key,
                InFlight {
                    id,
                    token: token.clone(),
                },
            );
            token
        };

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => {
                Err(AppError::Cancelled(format!("{:?} query was cancelled", key.kind)))
            }
            result = fetcher() => result,
        };

        let mut state = self.state.lock().await;
        let current = matches!(state.in_flight.get(&key), Some(f) if f.id == id);
        if current {
            state.in_flight.remove(&key);
        }

        match result {
            Ok(value) if current && !token.is_cancelled() => {
                state.entries.insert(
                    key,
                    Entry {
                        value: Arc::new(value.clone()),
                        updated_at: Instant::now(),
                        invalidated: false,
                    },
                );
                Ok(value)
            }
            Ok(_) if token.is_cancelled() => Err(AppError::Cancelled(format!(
                "{:?} query was cancelled",
                key.kind
            ))),
            other => other,
        }
    }

    /// Abort the in-flight fetch for `key`, if any.
    pub async fn cancel(&self, key: &QueryKey) {
        let mut state = self.state.lock().await;
        if let Some(in_flight) = state.in_flight.remove(key) {
            in_flight.token.cancel();
            tracing::debug!(?key, "Cancelled in-flight query");
        }
    }

    /// Mark `key` stale so the next fetch goes to the store.
    pub async fn invalidate(&self, key: &QueryKey) {
        let mut state = self.state.lock().await;
        if let Some(entry) = state.entries.get_mut(key) {
            entry.invalidated = true;
        }
    }

    /// Mark every cached query of `kind` stale, across scopes and users.
    pub async fn invalidate_kind(&self, kind: QueryKind) {
        let mut state = self.state.lock().await;
        for (key, entry) in state.entries.iter_mut() {
            if key.kind == kind {
                entry.invalidated = true;
            }
        }
    }

    pub async fn snapshot(&self, key: &QueryKey) -> Snapshot {
        let state = self.state.lock().await;
        Snapshot {
            key: *key,
            value: state.entries.get(key).map(|entry| Arc::clone(&entry.value)),
        }
    }

    /// Put a snapshot back. An empty snapshot removes the entry.
    pub async fn restore(&self, snapshot: Snapshot) {
        let mut state = self.state.lock().await;
        match snapshot.value {
            Some(value) => {
                state.entries.insert(
                    snapshot.key,
                    Entry {
                        value,
                        updated_at: Instant::now(),
                        invalidated: false,
                    },
                );
            }
            None => {
                state.entries.remove(&snapshot.key);
            }
        }
    }

    /// True when nothing is cached, the entry was invalidated, or it is
    /// older than the stale time.
    pub async fn is_stale(&self, key: &QueryKey) -> bool {
        let state = self.state.lock().await;
        state
            .entries
            .get(key)
            .map(|entry| self.entry_is_stale(entry))
            .unwrap_or(true)
    }

    pub async fn is_fetching(&self, key: &QueryKey) -> bool {
        self.state.lock().await.in_flight.contains_key(key)
    }

    fn entry_is_stale(&self, entry: &Entry) -> bool {
        entry.invalidated || entry.updated_at.elapsed() >= self.stale_time
    }
}
