use crate::error::Result;

/// Core trait for admission control
///
/// Implementations never block: a call either takes the requested weight
/// immediately or is refused with `RateLimitError::Exceeded`.
pub trait RateLimiter: Send + Sync {
    /// Try to acquire the given weight without blocking
    fn try_acquire(&self, weight: u32) -> Result<()>;

    /// Try to acquire a single unit of weight
    fn try_acquire_one(&self) -> Result<()> {
        self.try_acquire(1)
    }

    /// Whole tokens currently available
    fn available(&self) -> u32;

    /// Maximum capacity
    fn capacity(&self) -> u32;

    /// Restore the limiter to its initial, full state
    fn reset(&self);
}
