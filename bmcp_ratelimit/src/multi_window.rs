use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::error::RateLimitError;
use crate::error::Result;
use crate::limiter::RateLimiter;
use crate::time::Clock;
use crate::time::default_clock;
use crate::token_bucket::TokenBucket;

/// Per-second and per-minute weight budgets enforced together
///
/// Binance charges every request against both a short burst window and a
/// sustained window. A request is admitted only if both buckets hold enough
/// tokens; the second-window bucket is checked first and refunded when the
/// minute-window bucket refuses, so a denial never changes either bucket.
pub struct MultiWindowLimiter {
    second: TokenBucket,
    minute: TokenBucket,

    /// Serializes the compound consume and its rollback
    gate: Mutex<()>,
}

/// Available tokens in each window at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowSnapshot {
    pub second_available: f64,
    pub second_capacity: u32,
    pub minute_available: f64,
    pub minute_capacity: u32,
}

impl MultiWindowLimiter {
    /// Create a limiter with the given weight budgets
    pub fn new(per_minute: u32, per_second: u32) -> Self {
        Self::with_clock(per_minute, per_second, default_clock())
    }

    /// Create a limiter whose two windows share the given clock
    pub fn with_clock(per_minute: u32, per_second: u32, clock: Arc<dyn Clock>) -> Self {
        let minute = TokenBucket::with_clock(per_minute, per_minute, Arc::clone(&clock));
        // The second window refills its whole capacity every second
        let second = TokenBucket::with_clock(per_second, per_second.saturating_mul(60), clock);

        Self { second, minute, gate: Mutex::new(()) }
    }

    /// Create a multi-window limiter builder
    pub fn builder() -> MultiWindowLimiterBuilder {
        MultiWindowLimiterBuilder::new()
    }

    /// Charge `cost` against both windows, or neither
    pub fn try_consume(&self, cost: u32) -> bool {
        let _guard = self.gate.lock();

        if !self.second.try_consume(cost) {
            return false;
        }

        if !self.minute.try_consume(cost) {
            self.second.refund(cost);
            return false;
        }

        true
    }

    /// Per-second bucket
    pub fn second_window(&self) -> &TokenBucket {
        &self.second
    }

    /// Per-minute bucket
    pub fn minute_window(&self) -> &TokenBucket {
        &self.minute
    }

    /// Token levels of both windows, read under the gate
    pub fn snapshot(&self) -> WindowSnapshot {
        let _guard = self.gate.lock();
        WindowSnapshot {
            second_available: self.second.tokens(),
            second_capacity: self.second.capacity(),
            minute_available: self.minute.tokens(),
            minute_capacity: self.minute.capacity(),
        }
    }
}

impl RateLimiter for MultiWindowLimiter {
    fn try_acquire(&self, weight: u32) -> Result<()> {
        if self.try_consume(weight) { Ok(()) } else { Err(RateLimitError::Exceeded { weight: weight.max(1) }) }
    }

    fn available(&self) -> u32 {
        let _guard = self.gate.lock();
        self.second.available().min(self.minute.available())
    }

    fn capacity(&self) -> u32 {
        self.second.capacity().min(self.minute.capacity())
    }

    fn reset(&self) {
        let _guard = self.gate.lock();
        self.second.reset();
        self.minute.reset();
    }
}

impl std::fmt::Debug for MultiWindowLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiWindowLimiter").field("second", &self.second).field("minute", &self.minute).finish()
    }
}

/// Builder for creating a multi-window limiter
pub struct MultiWindowLimiterBuilder {
    per_minute: Option<u32>,
    per_second: Option<u32>,
    clock: Option<Arc<dyn Clock>>,
}

impl MultiWindowLimiterBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self { per_minute: None, per_second: None, clock: None }
    }

    /// Sustained weight budget per minute
    pub fn per_minute(mut self, limit: u32) -> Self {
        self.per_minute = Some(limit);
        self
    }

    /// Burst weight budget per second, defaults to the per-minute budget
    pub fn per_second(mut self, limit: u32) -> Self {
        self.per_second = Some(limit);
        self
    }

    /// Read time from the given clock
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the limiter
    pub fn build(self) -> Result<MultiWindowLimiter> {
        let per_minute = self.per_minute.ok_or(RateLimitError::InvalidConfig("per-minute limit must be set"))?;
        let per_second = self.per_second.unwrap_or(per_minute);
        Ok(MultiWindowLimiter::with_clock(per_minute, per_second, self.clock.unwrap_or_else(default_clock)))
    }
}

impl Default for MultiWindowLimiterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
