use std::time::Duration;

/// Default time a successful result is served without refetching.
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(30);

/// Default idle time after which an unobserved entry is evicted.
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long a successful result counts as fresh.
    pub stale_time: Duration,
    /// How long an unobserved entry survives without being read.
    pub gc_time: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: DEFAULT_STALE_TIME,
            gc_time: DEFAULT_GC_TIME,
        }
    }
}

impl CacheConfig {
    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn with_gc_time(mut self, gc_time: Duration) -> Self {
        self.gc_time = gc_time;
        self
    }
}
