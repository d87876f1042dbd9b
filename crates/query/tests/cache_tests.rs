//! Cache lifecycle tests: de-duplication, freshness, invalidation and GC.
//!
//! Time is paused, so delays advance deterministically.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use finboard_api::ApiError;
use finboard_core::models::EntityKind;
use finboard_query::{CacheConfig, Invalidation, QueryCache, QueryKey, QueryStatus};
use futures::future::{BoxFuture, FutureExt};
use tokio::time::sleep;

const LATENCY: Duration = Duration::from_millis(100);

type Fetcher = BoxFuture<'static, Result<usize, ApiError>>;

/// A fetcher that returns how many times it has been called, after `LATENCY`.
fn counting(calls: &Arc<AtomicUsize>) -> impl Fn() -> Fetcher + Send + Sync + 'static {
    let calls = calls.clone();
    move || {
        let calls = calls.clone();
        async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            sleep(LATENCY).await;
            Ok(n)
        }
        .boxed()
    }
}

fn failing(calls: &Arc<AtomicUsize>) -> impl Fn() -> Fetcher + Send + Sync + 'static {
    let calls = calls.clone();
    move || {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            sleep(LATENCY).await;
            Err(ApiError::http(500, "boom"))
        }
        .boxed()
    }
}

fn bills_key() -> QueryKey {
    QueryKey::detail(EntityKind::Bills, 1)
}

// ─────────────────────────────────────────────────────────────────────────────
// De-duplication
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn concurrent_fetches_share_one_request() {
    let cache = QueryCache::default();
    let calls = Arc::new(AtomicUsize::new(0));

    let first = {
        let cache = cache.clone();
        let fetcher = counting(&calls);
        tokio::spawn(async move { cache.fetch(bills_key(), fetcher).await })
    };
    sleep(Duration::from_millis(10)).await;
    let second = cache.fetch(bills_key(), counting(&calls)).await.unwrap();
    let first = first.await.unwrap().unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test(start_paused = true)]
async fn concurrent_callers_see_the_same_error() {
    let cache = QueryCache::default();
    let calls = Arc::new(AtomicUsize::new(0));

    let first = {
        let cache = cache.clone();
        let fetcher = failing(&calls);
        tokio::spawn(async move { cache.fetch(bills_key(), fetcher).await })
    };
    sleep(Duration::from_millis(10)).await;
    let second = cache.fetch(bills_key(), failing(&calls)).await.unwrap_err();
    let first = first.await.unwrap().unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(first.status(), 500);
    assert_eq!(second.status(), 500);

    let state = cache.state::<usize>(&bills_key()).unwrap();
    assert_eq!(state.status, QueryStatus::Error);
}

#[tokio::test(start_paused = true)]
async fn different_keys_fetch_independently() {
    let cache = QueryCache::default();
    let calls = Arc::new(AtomicUsize::new(0));

    let a = cache.fetch(QueryKey::detail(EntityKind::Bills, 1), counting(&calls));
    let b = cache.fetch(QueryKey::detail(EntityKind::Bills, 2), counting(&calls));
    let (a, b) = tokio::join!(a, b);

    assert!(a.is_ok() && b.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// ─────────────────────────────────────────────────────────────────────────────
// Freshness
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn fresh_values_are_served_from_cache() {
    let cache = QueryCache::new(CacheConfig::default().with_stale_time(Duration::from_secs(30)));
    let calls = Arc::new(AtomicUsize::new(0));

    assert_eq!(*cache.fetch(bills_key(), counting(&calls)).await.unwrap(), 1);
    assert_eq!(*cache.fetch(bills_key(), counting(&calls)).await.unwrap(), 1);

    sleep(Duration::from_secs(31)).await;
    assert_eq!(*cache.fetch(bills_key(), counting(&calls)).await.unwrap(), 2);
}

#[tokio::test(start_paused = true)]
async fn errors_are_not_served_as_fresh() {
    let cache = QueryCache::default();
    let calls = Arc::new(AtomicUsize::new(0));

    assert!(cache.fetch(bills_key(), failing(&calls)).await.is_err());
    assert_eq!(*cache.fetch(bills_key(), counting(&calls)).await.unwrap(), 2);
}

// ─────────────────────────────────────────────────────────────────────────────
// Invalidation
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn unobserved_entries_refetch_lazily() {
    let cache = QueryCache::default();
    let calls = Arc::new(AtomicUsize::new(0));

    cache.fetch(bills_key(), counting(&calls)).await.unwrap();
    assert_eq!(cache.invalidate(&Invalidation::Kind(EntityKind::Bills)), 1);

    let state = cache.state::<usize>(&bills_key()).unwrap();
    assert_eq!(state.status, QueryStatus::Stale);
    assert_eq!(state.data.as_deref(), Some(&1));

    sleep(Duration::from_secs(1)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    assert_eq!(*cache.fetch(bills_key(), counting(&calls)).await.unwrap(), 2);
}

#[tokio::test(start_paused = true)]
async fn observed_entries_refetch_immediately() {
    let cache = QueryCache::default();
    let calls = Arc::new(AtomicUsize::new(0));

    let mut observer = cache.observe(bills_key(), counting(&calls));
    assert_eq!(observer.settled().await.data.as_deref(), Some(&1));

    cache.invalidate(&Invalidation::Record(EntityKind::Bills, 1));
    let state = observer.state();
    assert_eq!(state.status, QueryStatus::Loading);
    assert_eq!(state.data.as_deref(), Some(&1));

    let state = observer.settled().await;
    assert_eq!(state.status, QueryStatus::Success);
    assert_eq!(state.data.as_deref(), Some(&2));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn invalidation_during_flight_is_not_lost() {
    let cache = QueryCache::default();
    let calls = Arc::new(AtomicUsize::new(0));

    let pending = {
        let cache = cache.clone();
        let fetcher = counting(&calls);
        tokio::spawn(async move { cache.fetch(bills_key(), fetcher).await })
    };
    sleep(Duration::from_millis(50)).await;
    cache.invalidate(&Invalidation::All);

    let value = pending.await.unwrap().unwrap();
    assert_eq!(*value, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        cache.state::<usize>(&bills_key()).unwrap().status,
        QueryStatus::Success
    );
}

#[tokio::test(start_paused = true)]
async fn observed_in_flight_invalidation_refetches_once() {
    let cache = QueryCache::default();
    let calls = Arc::new(AtomicUsize::new(0));

    let mut observer = cache.observe(bills_key(), counting(&calls));
    sleep(Duration::from_millis(50)).await;
    cache.invalidate(&Invalidation::Kind(EntityKind::Bills));

    let state = observer.settled().await;
    assert_eq!(state.data.as_deref(), Some(&2));

    sleep(Duration::from_secs(1)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn invalidation_ignores_other_kinds() {
    let cache = QueryCache::default();
    let calls = Arc::new(AtomicUsize::new(0));

    cache.fetch(bills_key(), counting(&calls)).await.unwrap();
    assert_eq!(cache.invalidate(&Invalidation::Kind(EntityKind::Invoices)), 0);
    assert_eq!(
        cache.state::<usize>(&bills_key()).unwrap().status,
        QueryStatus::Success
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Observers and maintenance
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn result_is_cached_after_observer_leaves() {
    let cache = QueryCache::default();
    let calls = Arc::new(AtomicUsize::new(0));

    let observer = cache.observe(bills_key(), counting(&calls));
    drop(observer);
    assert_eq!(cache.stats().observed, 0);

    sleep(LATENCY * 2).await;
    let state = cache.state::<usize>(&bills_key()).unwrap();
    assert_eq!(state.status, QueryStatus::Success);
    assert_eq!(state.data.as_deref(), Some(&1));
}

#[tokio::test(start_paused = true)]
async fn observer_refetch_ignores_freshness() {
    let cache = QueryCache::default();
    let calls = Arc::new(AtomicUsize::new(0));

    let mut observer = cache.observe(bills_key(), counting(&calls));
    observer.settled().await;
    assert_eq!(*observer.refetch().await.unwrap(), 2);
}

#[tokio::test(start_paused = true)]
async fn garbage_collection_spares_observed_entries() {
    let cache = QueryCache::new(CacheConfig::default().with_gc_time(Duration::from_secs(60)));
    let calls = Arc::new(AtomicUsize::new(0));

    cache.fetch(bills_key(), counting(&calls)).await.unwrap();
    let other = QueryKey::detail(EntityKind::Categories, 1);
    let mut observer = cache.observe(other.clone(), counting(&calls));
    observer.settled().await;

    sleep(Duration::from_secs(61)).await;
    assert_eq!(cache.collect_garbage(), 1);
    assert!(cache.state::<usize>(&bills_key()).is_none());
    assert!(cache.state::<usize>(&other).is_some());
}

#[tokio::test(start_paused = true)]
async fn periodic_gc_sweeps_idle_entries() {
    let cache = QueryCache::new(CacheConfig::default().with_gc_time(Duration::from_secs(10)));
    let calls = Arc::new(AtomicUsize::new(0));
    let gc = cache.spawn_gc(Duration::from_secs(5));

    cache.fetch(bills_key(), counting(&calls)).await.unwrap();
    assert_eq!(cache.stats().entries, 1);

    sleep(Duration::from_secs(21)).await;
    assert_eq!(cache.stats().entries, 0);
    gc.abort();
}

#[tokio::test(start_paused = true)]
async fn clear_closes_observers() {
    let cache = QueryCache::default();
    let calls = Arc::new(AtomicUsize::new(0));

    let mut observer = cache.observe(bills_key(), counting(&calls));
    observer.settled().await;
    cache.clear();

    assert!(!observer.changed().await);
    assert_eq!(cache.stats(), Default::default());
}

#[tokio::test(start_paused = true)]
async fn panicking_fetcher_does_not_wedge_the_entry() {
    let cache = QueryCache::new(CacheConfig::default().with_gc_time(Duration::from_secs(60)));
    let calls = Arc::new(AtomicUsize::new(0));

    let first = cache
        .fetch(bills_key(), || async {
            if true {
                panic!("fetcher bug");
            }
            Ok::<usize, ApiError>(0)
        })
        .await;
    assert!(first.is_err());
    let state = cache.state::<usize>(&bills_key()).unwrap();
    assert_eq!(state.status, QueryStatus::Error);
    assert_eq!(cache.stats().fetching, 0);

    let second = cache.fetch(bills_key(), counting(&calls)).await.unwrap();
    assert_eq!(*second, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    sleep(Duration::from_secs(61)).await;
    assert_eq!(cache.collect_garbage(), 1);
}

#[tokio::test(start_paused = true)]
async fn observed_panicking_fetch_settles_as_error() {
    let cache = QueryCache::default();

    let mut observer = cache.observe(bills_key(), || async {
        sleep(LATENCY).await;
        if true {
            panic!("fetcher bug");
        }
        Ok::<usize, ApiError>(0)
    });
    observer.settled().await;

    assert_eq!(observer.state().status, QueryStatus::Error);
    assert_eq!(cache.stats().fetching, 0);
}
