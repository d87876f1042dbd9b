//! Debouncing for user input.
//!
//! [`Debouncer`] collapses bursts of calls into one invocation carrying the
//! arguments of the last call. [`DebouncedValue`] builds on it to expose a
//! delayed view of a changing value through a `watch` channel, which is how
//! filter inputs are throttled before they reach list queries.
//!
//! Both need a tokio runtime. Calls made outside of one are dropped with a
//! warning instead of panicking.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

type Callback<A> = Box<dyn Fn(A) + Send + Sync>;

struct DebouncerInner<A> {
    delay: Duration,
    callback: Callback<A>,
    /// Bumped on every call; a timer only fires if it still holds the latest value.
    generation: AtomicU64,
    closed: AtomicBool,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<A> DebouncerInner<A> {
    fn lock_pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(|poisoned| {
            warn!("Debouncer mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

/// Collapses rapid calls into a single delayed invocation.
///
/// Dropping the debouncer cancels any pending invocation.
pub struct Debouncer<A: Send + 'static> {
    inner: Arc<DebouncerInner<A>>,
}

impl<A: Send + 'static> Debouncer<A> {
    pub fn new<F>(delay: Duration, callback: F) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(DebouncerInner {
                delay,
                callback: Box::new(callback),
                generation: AtomicU64::new(0),
                closed: AtomicBool::new(false),
                pending: Mutex::new(None),
            }),
        }
    }

    pub fn delay(&self) -> Duration {
        self.inner.delay
    }

    /// Schedules the callback with `args`, replacing any pending invocation.
    pub fn call(&self, args: A) {
        if self.inner.closed.load(Ordering::SeqCst) {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("Debouncer called outside of a tokio runtime; dropping call");
            return;
        };

        let deadline = Instant::now() + self.inner.delay;
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let weak: Weak<DebouncerInner<A>> = Arc::downgrade(&self.inner);

        let task = handle.spawn(async move {
            sleep_until(deadline).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.closed.load(Ordering::SeqCst)
                || inner.generation.load(Ordering::SeqCst) != generation
            {
                return;
            }
            (inner.callback)(args);
        });

        if let Some(previous) = self.inner.lock_pending().replace(task) {
            previous.abort();
        }
    }

    /// Cancels the pending invocation, if any.
    pub fn cancel(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(pending) = self.inner.lock_pending().take() {
            debug!("Debouncer: cancelling pending invocation");
            pending.abort();
        }
    }

    /// Returns true while an invocation is scheduled but has not fired.
    pub fn is_pending(&self) -> bool {
        self.inner
            .lock_pending()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl<A: Send + 'static> Drop for Debouncer<A> {
    fn drop(&mut self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.cancel();
    }
}

/// A delayed view of a changing value.
///
/// Every [`set`](Self::set) restarts the delay; subscribers only observe a
/// value once it stayed unchanged for the whole window.
pub struct DebouncedValue<T: Clone + PartialEq + Send + Sync + 'static> {
    sender: Arc<watch::Sender<T>>,
    debouncer: Debouncer<T>,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> DebouncedValue<T> {
    pub fn new(initial: T, delay: Duration) -> Self {
        let (sender, _) = watch::channel(initial);
        let sender = Arc::new(sender);
        let sink = Arc::clone(&sender);

        let debouncer = Debouncer::new(delay, move |value: T| {
            sink.send_if_modified(|current| {
                if *current == value {
                    false
                } else {
                    *current = value;
                    true
                }
            });
        });

        Self { sender, debouncer }
    }

    /// Records a new raw value; it is emitted after the delay unless replaced.
    pub fn set(&self, value: T) {
        self.debouncer.call(value);
    }

    /// The last emitted (settled) value.
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn recorder<A: Send + 'static>() -> (Arc<Mutex<Vec<(Duration, A)>>>, Instant) {
        (Arc::new(Mutex::new(Vec::new())), Instant::now())
    }

    #[tokio::test(start_paused = true)]
    async fn test_collapses_rapid_calls_into_last_arguments() {
        let (calls, start) = recorder::<&'static str>();
        let sink = Arc::clone(&calls);
        let debouncer = Debouncer::new(Duration::from_millis(500), move |query| {
            sink.lock().unwrap().push((start.elapsed(), query));
        });

        debouncer.call("a");
        sleep(Duration::from_millis(100)).await;
        debouncer.call("ab");
        sleep(Duration::from_millis(50)).await;
        debouncer.call("abc");

        sleep(Duration::from_millis(499)).await;
        assert!(calls.lock().unwrap().is_empty());
        assert!(debouncer.is_pending());

        sleep(Duration::from_millis(500)).await;
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (fired_at, args) = calls[0];
        assert_eq!(args, "abc");
        assert!(fired_at >= Duration::from_millis(650));
        assert!(fired_at < Duration::from_millis(660));
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_fire_separately() {
        let (calls, start) = recorder::<u32>();
        let sink = Arc::clone(&calls);
        let debouncer = Debouncer::new(Duration::from_millis(200), move |n| {
            sink.lock().unwrap().push((start.elapsed(), n));
        });

        debouncer.call(1);
        sleep(Duration::from_millis(300)).await;
        debouncer.call(2);
        sleep(Duration::from_millis(300)).await;

        let values: Vec<u32> = calls.lock().unwrap().iter().map(|(_, n)| *n).collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_invocation() {
        let (calls, start) = recorder::<u32>();
        let sink = Arc::clone(&calls);
        let debouncer = Debouncer::new(Duration::from_millis(500), move |n| {
            sink.lock().unwrap().push((start.elapsed(), n));
        });

        debouncer.call(7);
        sleep(Duration::from_millis(499)).await;
        drop(debouncer);

        sleep(Duration::from_secs(2)).await;
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_then_call_again() {
        let (calls, start) = recorder::<u32>();
        let sink = Arc::clone(&calls);
        let debouncer = Debouncer::new(Duration::from_millis(100), move |n| {
            sink.lock().unwrap().push((start.elapsed(), n));
        });

        debouncer.call(1);
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        sleep(Duration::from_millis(200)).await;
        assert!(calls.lock().unwrap().is_empty());

        debouncer.call(2);
        sleep(Duration::from_millis(200)).await;
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_call_outside_runtime_is_a_no_op() {
        let debouncer = Debouncer::new(Duration::from_millis(10), |_: u32| {
            panic!("must not fire");
        });
        debouncer.call(1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_value_emits_settled_value() {
        let value = DebouncedValue::new(String::new(), Duration::from_millis(300));
        let mut rx = value.subscribe();

        value.set("m".to_string());
        sleep(Duration::from_millis(100)).await;
        value.set("me".to_string());
        sleep(Duration::from_millis(100)).await;
        value.set("mercado".to_string());
        assert_eq!(value.get(), "");

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), "mercado");
        assert_eq!(value.get(), "mercado");
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_value_skips_unchanged_value() {
        let value = DebouncedValue::new(5u32, Duration::from_millis(50));
        let mut rx = value.subscribe();
        rx.borrow_and_update();

        value.set(6);
        sleep(Duration::from_millis(10)).await;
        value.set(5);
        sleep(Duration::from_millis(200)).await;

        assert!(!rx.has_changed().unwrap());
        assert_eq!(value.get(), 5);
    }
}
