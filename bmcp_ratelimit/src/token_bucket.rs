use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::RateLimitError;
use crate::error::Result;
use crate::limiter::RateLimiter;
use crate::time::Clock;
use crate::time::default_clock;

/// Weighted token bucket with fractional refill
///
/// Tokens refill continuously at `refill_per_minute / 60` per second and are
/// capped at `capacity`. A request of weight `cost` is admitted only if at
/// least `cost` whole tokens are present; a refused request leaves the
/// bucket untouched.
pub struct TokenBucket {
    /// Mutable state, refill and consume happen under the same lock
    state: Mutex<BucketState>,

    /// Maximum number of tokens
    capacity: u32,

    /// Tokens added per second
    refill_per_second: f64,

    clock: Arc<dyn Clock>,
}

#[derive(Debug, Clone, Copy)]
struct BucketState {
    tokens: f64,
    last_refill: Duration,
}

impl TokenBucket {
    /// Create a bucket that starts full
    ///
    /// Capacity and refill rate are coerced to at least 1.
    pub fn new(capacity: u32, refill_per_minute: u32) -> Self {
        Self::with_clock(capacity, refill_per_minute, default_clock())
    }

    /// Create a bucket reading time from the given clock
    pub fn with_clock(capacity: u32, refill_per_minute: u32, clock: Arc<dyn Clock>) -> Self {
        let capacity = capacity.max(1);
        let refill_per_second = f64::from(refill_per_minute.max(1)) / 60.0;
        let now = clock.now();

        Self { state: Mutex::new(BucketState { tokens: f64::from(capacity), last_refill: now }), capacity, refill_per_second, clock }
    }

    /// Create a builder for configuring a token bucket
    pub fn builder() -> TokenBucketBuilder {
        TokenBucketBuilder::new()
    }

    /// Add tokens for the time elapsed since the last refill
    #[inline(always)]
    fn refill(&self, state: &mut BucketState) {
        let now = self.clock.now();
        let elapsed = now.saturating_sub(state.last_refill);
        if elapsed.is_zero() {
            return;
        }

        state.tokens = (state.tokens + elapsed.as_secs_f64() * self.refill_per_second).min(f64::from(self.capacity));
        state.last_refill = now;
    }

    /// Take `cost` tokens if available
    ///
    /// Cost is coerced to at least 1.
    pub fn try_consume(&self, cost: u32) -> bool {
        let cost = f64::from(cost.max(1));
        let mut state = self.state.lock();
        self.refill(&mut state);

        if state.tokens >= cost {
            state.tokens -= cost;
            true
        } else {
            false
        }
    }

    /// Return tokens taken by a provisional consume, clamped to capacity
    pub fn refund(&self, cost: u32) {
        let cost = f64::from(cost.max(1));
        let mut state = self.state.lock();
        state.tokens = (state.tokens + cost).min(f64::from(self.capacity));
    }

    /// Current (fractional) token count after refill
    pub fn tokens(&self) -> f64 {
        let mut state = self.state.lock();
        self.refill(&mut state);
        state.tokens
    }

    /// Refill rate in tokens per second
    pub fn refill_per_second(&self) -> f64 {
        self.refill_per_second
    }
}

impl RateLimiter for TokenBucket {
    #[inline]
    fn try_acquire(&self, weight: u32) -> Result<()> {
        if self.try_consume(weight) { Ok(()) } else { Err(RateLimitError::Exceeded { weight: weight.max(1) }) }
    }

    fn available(&self) -> u32 {
        self.tokens().floor() as u32
    }

    fn capacity(&self) -> u32 {
        self.capacity
    }

    fn reset(&self) {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.tokens = f64::from(self.capacity);
        state.last_refill = now;
    }
}

impl std::fmt::Debug for TokenBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = *self.state.lock();
        f.debug_struct("TokenBucket")
            .field("capacity", &self.capacity)
            .field("refill_per_second", &self.refill_per_second)
            .field("tokens", &state.tokens)
            .finish()
    }
}

/// Builder for configuring a token bucket
pub struct TokenBucketBuilder {
    capacity: u32,
    refill_per_minute: Option<u32>,
    clock: Option<Arc<dyn Clock>>,
}

impl TokenBucketBuilder {
    /// Create a new builder, defaults to the Binance spot weight budget
    pub fn new() -> Self {
        Self { capacity: 1200, refill_per_minute: None, clock: None }
    }

    /// Set the bucket capacity (max tokens)
    pub fn capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the refill rate in tokens per minute
    pub fn refill_per_minute(mut self, rate: u32) -> Self {
        self.refill_per_minute = Some(rate);
        self
    }

    /// Set the refill rate in tokens per second
    pub fn refill_per_second(mut self, rate: u32) -> Self {
        self.refill_per_minute = Some(rate.saturating_mul(60));
        self
    }

    /// Read time from the given clock
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the bucket, refilling at `capacity` per minute unless set
    pub fn build(self) -> TokenBucket {
        let refill = self.refill_per_minute.unwrap_or(self.capacity);
        TokenBucket::with_clock(self.capacity, refill, self.clock.unwrap_or_else(default_clock))
    }
}

impl Default for TokenBucketBuilder {
    fn default() -> Self {
        Self::new()
    }
}
