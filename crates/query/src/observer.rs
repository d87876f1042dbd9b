use std::marker::PhantomData;
use std::sync::Arc;

use finboard_api::ApiError;
use tokio::sync::watch;

use crate::cache::QueryCache;
use crate::key::QueryKey;
use crate::state::{ErasedState, QueryState};

/// A live subscription to one cache entry.
///
/// While at least one observer exists the entry counts as observed:
/// invalidation refetches it immediately and garbage collection skips it.
/// Dropping the observer stops notifications; a request already in flight
/// still completes and is cached.
pub struct QueryObserver<T> {
    cache: QueryCache,
    key: QueryKey,
    rx: watch::Receiver<ErasedState>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> QueryObserver<T> {
    pub(crate) fn new(cache: QueryCache, key: QueryKey, rx: watch::Receiver<ErasedState>) -> Self {
        Self {
            cache,
            key,
            rx,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn state(&self) -> QueryState<T> {
        QueryState::from_erased(&self.rx.borrow())
    }

    pub fn data(&self) -> Option<Arc<T>> {
        self.state().data
    }

    /// Waits for the next state change. Returns `false` once the entry has
    /// been removed from the cache.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Waits until the entry reaches `Success` or `Error`.
    pub async fn settled(&mut self) -> QueryState<T> {
        loop {
            let state = QueryState::from_erased(&self.rx.borrow_and_update());
            if state.is_settled() {
                return state;
            }
            if !self.changed().await {
                return self.state();
            }
        }
    }

    /// Refetches regardless of freshness, sharing a request already in flight.
    pub async fn refetch(&self) -> Result<Arc<T>, ApiError> {
        self.cache.refetch(&self.key).await
    }
}

impl<T> Drop for QueryObserver<T> {
    fn drop(&mut self) {
        self.cache.release(&self.key);
    }
}
