use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

/// Monotonic time source for limiters and caches
///
/// `now` is an offset from the clock's own epoch, so only differences
/// between two readings of the same clock are meaningful.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

/// Wall-clock backed source using `Instant`
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    /// Create a new clock with the current instant as epoch
    #[inline(always)]
    pub fn new() -> Self {
        Self { epoch: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline(always)]
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Manually advanced clock
///
/// Clones share the same reading, so a test can hand one clone to a limiter
/// and keep another to move time forward.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(by.as_nanos() as u64, Ordering::AcqRel);
    }

    /// Advance by fractional seconds
    pub fn advance_secs_f64(&self, secs: f64) {
        self.advance(Duration::from_secs_f64(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Acquire))
    }
}

/// Default shared clock handle
pub fn default_clock() -> Arc<dyn Clock> {
    Arc::new(MonotonicClock::new())
}
