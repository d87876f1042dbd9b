//! Query cache with per-key request de-duplication.
//!
//! Each [`QueryKey`] maps to one entry holding the latest state, the
//! in-flight request (if any) and an invalidation generation. A request is
//! started at most once per key at a time; every caller of that key awaits
//! the same shared future and so observes the same result or error.
//!
//! Requests run in their own task, so a result is cached even when every
//! caller has gone away. A result that lands after its key was invalidated
//! is stored as stale and fetched again.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use finboard_api::ApiError;
use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, warn};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::CacheConfig;
use crate::key::{Invalidation, QueryKey};
use crate::observer::QueryObserver;
use crate::state::{AnyData, ErasedState, QueryState, QueryStatus};

type FetchResult = Result<AnyData, ApiError>;
type FetchFn = Arc<dyn Fn() -> BoxFuture<'static, FetchResult> + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

struct InFlight {
    id: u64,
    generation: u64,
    future: SharedFetch,
}

struct Entry {
    tx: watch::Sender<ErasedState>,
    /// Bumped by every invalidation.
    generation: u64,
    in_flight: Option<InFlight>,
    /// Last fetcher registered for the key, reused by invalidation refetches.
    fetcher: Option<FetchFn>,
    observers: usize,
    last_accessed: Instant,
}

impl Entry {
    fn new() -> Self {
        let (tx, _) = watch::channel(ErasedState::idle());
        Self {
            tx,
            generation: 0,
            in_flight: None,
            fetcher: None,
            observers: 0,
            last_accessed: Instant::now(),
        }
    }

    fn status(&self) -> QueryStatus {
        self.tx.borrow().status
    }

    fn fresh_data(&self, stale_time: Duration) -> Option<AnyData> {
        let state = self.tx.borrow();
        let fresh = state.status == QueryStatus::Success
            && state.updated_at.is_some_and(|at| at.elapsed() < stale_time);
        if fresh {
            state.data.clone()
        } else {
            None
        }
    }

    fn update(&self, f: impl FnOnce(&mut ErasedState)) {
        self.tx.send_modify(f);
    }
}

/// Counters describing the cache contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub observed: usize,
    pub fetching: usize,
    pub stale: usize,
}

struct Inner {
    config: CacheConfig,
    entries: Mutex<HashMap<QueryKey, Entry>>,
    next_fetch_id: AtomicU64,
}

/// Shared handle to a query cache. Cloning is cheap; clones share entries.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("config", &self.inner.config)
            .field("stats", &self.stats())
            .finish()
    }
}

fn erase<T, F, Fut>(fetcher: F) -> FetchFn
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
{
    Arc::new(move || {
        let request = fetcher();
        async move { request.await.map(|value| Arc::new(value) as AnyData) }.boxed()
    })
}

fn downcast<T: Send + Sync + 'static>(
    key: &QueryKey,
    data: AnyData,
) -> Result<Arc<T>, ApiError> {
    data.downcast::<T>().map_err(|_| ApiError::Decode {
        status: 0,
        message: format!("Cached value for {} has an unexpected type", key),
    })
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                entries: Mutex::new(HashMap::new()),
                next_fetch_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Lock the entries mutex, recovering from poison if necessary.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.inner.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Query cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Starts a request for `entry` with its registered fetcher. Must be
    /// called with the entries lock held and no request in flight.
    fn start_fetch(&self, key: &QueryKey, entry: &mut Entry) -> Option<(SharedFetch, u64)> {
        let fetcher = entry.fetcher.clone()?;
        if Handle::try_current().is_err() {
            warn!("No async runtime available, not fetching {}", key);
            return None;
        }

        let id = self.inner.next_fetch_id.fetch_add(1, Ordering::Relaxed);
        let generation = entry.generation;
        let request = fetcher();
        let cache = self.clone();
        let task_key = key.clone();
        let task: JoinHandle<FetchResult> = tokio::spawn(async move {
            // A panicking fetcher still completes the entry.
            let result = AssertUnwindSafe(request)
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    Err(ApiError::invalid_request(format!(
                        "Fetcher for {} panicked",
                        task_key
                    )))
                });
            cache.complete(&task_key, id, generation, &result);
            result
        });

        // A cancelled task never reaches `complete`, so release the slot here.
        let weak = Arc::downgrade(&self.inner);
        let join_key = key.clone();
        let future = async move {
            match task.await {
                Ok(result) => result,
                Err(e) => {
                    let result = Err(ApiError::invalid_request(format!(
                        "Query task failed: {}",
                        e
                    )));
                    if let Some(inner) = weak.upgrade() {
                        QueryCache { inner }.complete(&join_key, id, generation, &result);
                    }
                    result
                }
            }
        }
        .boxed()
        .shared();

        entry.in_flight = Some(InFlight {
            id,
            generation,
            future: future.clone(),
        });
        entry.update(|state| state.status = QueryStatus::Loading);
        debug!("Fetching {}", key);
        Some((future, generation))
    }

    /// Applies a finished request to its entry.
    fn complete(&self, key: &QueryKey, id: u64, generation: u64, result: &FetchResult) {
        let mut entries = self.lock_entries();
        let Some(entry) = entries.get_mut(key) else {
            debug!("Discarding result for evicted {}", key);
            return;
        };
        if entry.in_flight.as_ref().map(|f| f.id) != Some(id) {
            return;
        }
        entry.in_flight = None;

        let landed_stale = entry.generation != generation;
        match result {
            Ok(data) => entry.update(|state| {
                state.status = if landed_stale {
                    QueryStatus::Stale
                } else {
                    QueryStatus::Success
                };
                state.data = Some(data.clone());
                state.error = None;
                state.updated_at = Some(Instant::now());
            }),
            Err(e) => {
                debug!("Fetching {} failed: {}", key, e);
                entry.update(|state| {
                    state.status = QueryStatus::Error;
                    state.error = Some(e.clone());
                });
            }
        }

        if landed_stale && entry.observers > 0 {
            debug!("{} was invalidated while fetching, refetching", key);
            self.start_fetch(key, entry);
        }
    }

    /// Joins the in-flight request for `key` or starts one.
    fn join_or_start(
        &self,
        key: &QueryKey,
        entry: &mut Entry,
    ) -> Result<(SharedFetch, u64), ApiError> {
        if let Some(in_flight) = &entry.in_flight {
            return Ok((in_flight.future.clone(), in_flight.generation));
        }
        self.start_fetch(key, entry)
            .ok_or_else(|| ApiError::invalid_request(format!("Cannot fetch {}", key)))
    }

    fn generation_changed(&self, key: &QueryKey, generation: u64) -> bool {
        self.lock_entries()
            .get(key)
            .is_some_and(|entry| entry.generation != generation)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the value for `key`, fetching it with `fetcher` unless a fresh
    /// value is cached. Concurrent calls for the same key share one request.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<Arc<T>, ApiError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let fetcher = erase(fetcher);
        loop {
            let (future, generation) = {
                let mut entries = self.lock_entries();
                let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
                entry.last_accessed = Instant::now();
                entry.fetcher = Some(fetcher.clone());
                if let Some(data) = entry.fresh_data(self.inner.config.stale_time) {
                    debug!("Serving {} from cache", key);
                    return downcast(&key, data);
                }
                self.join_or_start(&key, entry)?
            };

            let result = future.await;
            if self.generation_changed(&key, generation) {
                continue;
            }
            return result.and_then(|data| downcast(&key, data));
        }
    }

    /// Refetches `key` with its registered fetcher, ignoring freshness.
    pub async fn refetch<T: Send + Sync + 'static>(
        &self,
        key: &QueryKey,
    ) -> Result<Arc<T>, ApiError> {
        loop {
            let (future, generation) = {
                let mut entries = self.lock_entries();
                let entry = entries.get_mut(key).ok_or_else(|| {
                    ApiError::invalid_request(format!("No query registered for {}", key))
                })?;
                entry.last_accessed = Instant::now();
                self.join_or_start(key, entry)?
            };

            let result = future.await;
            if self.generation_changed(key, generation) {
                continue;
            }
            return result.and_then(|data| downcast(key, data));
        }
    }

    /// Subscribes to `key`. Fetches unless a fresh value is cached or a
    /// request is already in flight.
    pub fn observe<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> QueryObserver<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let rx = {
            let mut entries = self.lock_entries();
            let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
            entry.observers += 1;
            entry.last_accessed = Instant::now();
            entry.fetcher = Some(erase(fetcher));
            if entry.in_flight.is_none()
                && entry.fresh_data(self.inner.config.stale_time).is_none()
            {
                self.start_fetch(&key, entry);
            }
            entry.tx.subscribe()
        };
        QueryObserver::new(self.clone(), key, rx)
    }

    pub(crate) fn release(&self, key: &QueryKey) {
        if let Some(entry) = self.lock_entries().get_mut(key) {
            entry.observers = entry.observers.saturating_sub(1);
            entry.last_accessed = Instant::now();
        }
    }

    /// Current state of `key`, if the cache knows it.
    pub fn state<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<QueryState<T>> {
        self.lock_entries()
            .get(key)
            .map(|entry| QueryState::from_erased(&entry.tx.borrow()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Invalidation and maintenance
    // ─────────────────────────────────────────────────────────────────────────

    /// Marks every entry matching `target` stale. Observed entries are
    /// refetched immediately; the rest on their next read. An entry with a
    /// request in flight keeps it, and its result lands as stale.
    ///
    /// Returns the number of entries invalidated.
    pub fn invalidate(&self, target: &Invalidation) -> usize {
        let mut entries = self.lock_entries();
        let mut count = 0;
        for (key, entry) in entries.iter_mut().filter(|(key, _)| target.matches(key)) {
            count += 1;
            entry.generation += 1;
            if entry.in_flight.is_some() {
                continue;
            }
            if entry.status() == QueryStatus::Success {
                entry.update(|state| state.status = QueryStatus::Stale);
            }
            if entry.observers > 0 {
                self.start_fetch(key, entry);
            }
        }
        if count > 0 {
            debug!("Invalidated {} entries for {:?}", count, target);
        }
        count
    }

    /// Removes unobserved, idle entries not read within `gc_time`.
    /// Returns the number of entries removed.
    pub fn collect_garbage(&self) -> usize {
        let gc_time = self.inner.config.gc_time;
        let mut entries = self.lock_entries();
        let before = entries.len();
        entries.retain(|key, entry| {
            let keep = entry.observers > 0
                || entry.in_flight.is_some()
                || entry.last_accessed.elapsed() < gc_time;
            if !keep {
                debug!("Evicting {}", key);
            }
            keep
        });
        before - entries.len()
    }

    /// Runs [`collect_garbage`](Self::collect_garbage) every `interval` until
    /// the cache is dropped. `interval` must be non-zero.
    pub fn spawn_gc(&self, interval: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let removed = QueryCache { inner }.collect_garbage();
                if removed > 0 {
                    debug!("Query cache GC removed {} entries", removed);
                }
            }
        })
    }

    /// Drops every entry. Observers see their subscription close.
    pub fn clear(&self) {
        self.lock_entries().clear();
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.lock_entries();
        CacheStats {
            entries: entries.len(),
            observed: entries.values().filter(|e| e.observers > 0).count(),
            fetching: entries.values().filter(|e| e.in_flight.is_some()).count(),
            stale: entries
                .values()
                .filter(|e| e.status() == QueryStatus::Stale)
                .count(),
        }
    }
}
