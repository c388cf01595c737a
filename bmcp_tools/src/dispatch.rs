//! Rate-limited dispatch
//!
//! Wraps an operation as: compute weight, ask the limiter, then either run
//! the operation or answer `rate_limit_exceeded` without running it.
//! Nothing here retries.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use bmcp_ratelimit::RateLimiter;
use tracing::debug;
use tracing::warn;

use crate::args::Args;
use crate::error::ToolError;
use crate::error::ToolResult;

/// Weight function over the call's arguments, `None` when it cannot decide
pub type CostFn = Arc<dyn Fn(&Args) -> Option<u32> + Send + Sync>;

/// Weight charged for a call
#[derive(Clone)]
pub enum Cost {
    Fixed(u32),
    Dynamic(CostFn),
}

impl Cost {
    pub fn dynamic(f: impl Fn(&Args) -> Option<u32> + Send + Sync + 'static) -> Self {
        Cost::Dynamic(Arc::new(f))
    }

    /// Evaluate once per call. Never below 1; a failed cost function charges 1.
    pub fn weight(&self, args: &Args) -> u32 {
        match self {
            Cost::Fixed(weight) => (*weight).max(1),
            Cost::Dynamic(f) => match f(args) {
                Some(weight) => weight.max(1),
                None => {
                    warn!("cost function could not compute a weight, charging 1");
                    1
                }
            },
        }
    }
}

impl fmt::Debug for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cost::Fixed(weight) => f.debug_tuple("Fixed").field(weight).finish(),
            Cost::Dynamic(_) => f.write_str("Dynamic"),
        }
    }
}

impl From<u32> for Cost {
    fn from(weight: u32) -> Self {
        Cost::Fixed(weight)
    }
}

/// Admission gate in front of one limiter
#[derive(Clone)]
pub struct RateLimitedDispatch {
    limiter: Arc<dyn RateLimiter>,
}

impl RateLimitedDispatch {
    pub fn new(limiter: Arc<dyn RateLimiter>) -> Self {
        Self { limiter }
    }

    /// Take `weight` from the limiter or fail with `rate_limit_exceeded`
    pub fn admit(&self, weight: u32) -> ToolResult<()> {
        match self.limiter.try_acquire(weight) {
            Ok(()) => {
                debug!(weight, "admitted");
                Ok(())
            }
            Err(err) => {
                debug!(weight, error = %err, "admission denied");
                Err(ToolError::rate_limited(weight))
            }
        }
    }

    pub fn call<F, T>(&self, cost: &Cost, args: Args, f: F) -> ToolResult<T>
    where
        F: FnOnce(Args) -> ToolResult<T>,
    {
        self.admit(cost.weight(&args))?;
        f(args)
    }

    /// Async version of call
    pub async fn call_async<F, Fut, T>(&self, cost: &Cost, args: Args, f: F) -> ToolResult<T>
    where
        F: FnOnce(Args) -> Fut,
        Fut: Future<Output = ToolResult<T>>,
    {
        self.admit(cost.weight(&args))?;
        f(args).await
    }
}

impl fmt::Debug for RateLimitedDispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimitedDispatch").field("available", &self.limiter.available()).field("capacity", &self.limiter.capacity()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use bmcp_ratelimit::ManualClock;
    use bmcp_ratelimit::MultiWindowLimiter;
    use bmcp_ratelimit::weight::depth_weight_from_arg;
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    fn args(value: serde_json::Value) -> Args {
        value.as_object().cloned().unwrap()
    }

    fn limiter(per_minute: u32, per_second: u32) -> Arc<MultiWindowLimiter> {
        Arc::new(MultiWindowLimiter::with_clock(per_minute, per_second, Arc::new(ManualClock::new())))
    }

    #[test]
    fn test_fixed_cost_floor() {
        assert_eq!(Cost::Fixed(0).weight(&Args::new()), 1);
        assert_eq!(Cost::Fixed(10).weight(&Args::new()), 10);
    }

    #[test]
    fn test_dynamic_cost_from_args() {
        let cost = Cost::dynamic(|a| Some(depth_weight_from_arg(a.get("limit"))));
        assert_eq!(cost.weight(&args(json!({ "limit": 1000 }))), 20);
        assert_eq!(cost.weight(&args(json!({}))), 5);
    }

    #[test]
    fn test_failed_cost_fn_charges_one() {
        let cost = Cost::dynamic(|_| None);
        assert_eq!(cost.weight(&Args::new()), 1);
    }

    #[test]
    fn test_admitted_call_runs_operation() {
        let dispatch = RateLimitedDispatch::new(limiter(10, 10));
        let result = dispatch.call(&Cost::Fixed(3), Args::new(), |_| Ok(42));

        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn test_denied_call_skips_operation() {
        let limiter = limiter(10, 2);
        let dispatch = RateLimitedDispatch::new(limiter.clone());
        let invoked = AtomicUsize::new(0);

        let result: ToolResult<()> = dispatch.call(&Cost::Fixed(5), Args::new(), |_| {
            invoked.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let err = result.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RateLimitExceeded);
        assert_eq!(err.details.unwrap()["weight"], 5);
        assert_eq!(invoked.load(Ordering::SeqCst), 0);

        // Denial leaves both windows untouched
        let snapshot = limiter.snapshot();
        assert_eq!(snapshot.second_available, 2.0);
        assert_eq!(snapshot.minute_available, 10.0);
    }

    #[test]
    fn test_operation_error_passes_through() {
        let dispatch = RateLimitedDispatch::new(limiter(10, 10));
        let result: ToolResult<()> = dispatch.call(&Cost::Fixed(1), Args::new(), |_| Err(ToolError::validation("bad")));

        assert_eq!(result.unwrap_err().kind, ErrorKind::ValidationError);
    }

    #[tokio::test]
    async fn test_call_async_charges_weight() {
        let limiter = limiter(30, 30);
        let dispatch = RateLimitedDispatch::new(limiter.clone());

        let value = dispatch.call_async(&Cost::Fixed(10), Args::new(), |_| async { Ok("done") }).await.unwrap();
        assert_eq!(value, "done");
        assert_eq!(limiter.snapshot().minute_available, 20.0);

        dispatch.call_async(&Cost::Fixed(10), Args::new(), |_| async { Ok(()) }).await.unwrap();
        dispatch.call_async(&Cost::Fixed(10), Args::new(), |_| async { Ok(()) }).await.unwrap();

        let denied = dispatch.call_async(&Cost::Fixed(1), Args::new(), |_| async { Ok(()) }).await;
        assert_eq!(denied.unwrap_err().kind, ErrorKind::RateLimitExceeded);
    }
}
