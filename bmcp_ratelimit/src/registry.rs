//! Named Binance limiters
//!
//! Binance meters its API surfaces independently:
//! - **spot**: `/api/v3` market data and trading
//! - **futures**: USD-M futures `/fapi`
//! - **sapi**: wallet and account utilities under `/sapi`
//!
//! Each surface gets its own per-second and per-minute weight budget.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::multi_window::MultiWindowLimiter;
use crate::multi_window::WindowSnapshot;
use crate::time::Clock;
use crate::time::default_clock;

/// Binance weight limit per minute for a default account
pub const DEFAULT_WEIGHT_PER_MINUTE: u32 = 1200;

/// Independently metered API surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiSurface {
    Spot,
    Futures,
    Sapi,
}

impl ApiSurface {
    pub const ALL: [ApiSurface; 3] = [ApiSurface::Spot, ApiSurface::Futures, ApiSurface::Sapi];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiSurface::Spot => "spot",
            ApiSurface::Futures => "futures",
            ApiSurface::Sapi => "sapi",
        }
    }
}

impl fmt::Display for ApiSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weight budgets of one surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowLimits {
    pub per_minute: u32,
    pub per_second: u32,
}

impl WindowLimits {
    /// Limits with the per-second budget defaulting to the per-minute budget
    pub fn new(per_minute: u32, per_second: Option<u32>) -> Self {
        Self { per_minute, per_second: per_second.unwrap_or(per_minute) }
    }
}

impl Default for WindowLimits {
    fn default() -> Self {
        Self::new(DEFAULT_WEIGHT_PER_MINUTE, None)
    }
}

/// Budgets for every surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LimiterConfig {
    pub spot: WindowLimits,
    pub futures: WindowLimits,
    pub sapi: WindowLimits,
}

impl LimiterConfig {
    pub fn limits(&self, surface: ApiSurface) -> WindowLimits {
        match surface {
            ApiSurface::Spot => self.spot,
            ApiSurface::Futures => self.futures,
            ApiSurface::Sapi => self.sapi,
        }
    }
}

/// One limiter per surface, created at startup and shared for the process lifetime
#[derive(Debug, Clone)]
pub struct LimiterSet {
    spot: Arc<MultiWindowLimiter>,
    futures: Arc<MultiWindowLimiter>,
    sapi: Arc<MultiWindowLimiter>,
}

impl LimiterSet {
    pub fn new(config: &LimiterConfig) -> Self {
        Self::with_clock(config, default_clock())
    }

    /// Build every limiter on a shared clock
    pub fn with_clock(config: &LimiterConfig, clock: Arc<dyn Clock>) -> Self {
        let build = |limits: WindowLimits| Arc::new(MultiWindowLimiter::with_clock(limits.per_minute, limits.per_second, Arc::clone(&clock)));

        Self { spot: build(config.spot), futures: build(config.futures), sapi: build(config.sapi) }
    }

    /// Limiter for the given surface
    pub fn get(&self, surface: ApiSurface) -> &Arc<MultiWindowLimiter> {
        match surface {
            ApiSurface::Spot => &self.spot,
            ApiSurface::Futures => &self.futures,
            ApiSurface::Sapi => &self.sapi,
        }
    }

    /// Snapshot of every surface, in `ApiSurface::ALL` order
    pub fn snapshot(&self) -> Vec<(ApiSurface, WindowSnapshot)> {
        ApiSurface::ALL.iter().map(|surface| (*surface, self.get(*surface).snapshot())).collect()
    }
}

impl Default for LimiterSet {
    fn default() -> Self {
        Self::new(&LimiterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RateLimiter;
    use crate::time::ManualClock;

    #[test]
    fn test_default_limits() {
        let limits = WindowLimits::default();
        assert_eq!(limits.per_minute, 1200);
        assert_eq!(limits.per_second, 1200);

        let limits = WindowLimits::new(600, Some(10));
        assert_eq!(limits.per_second, 10);
    }

    #[test]
    fn test_surfaces_are_independent() {
        let config = LimiterConfig { spot: WindowLimits::new(10, Some(10)), futures: WindowLimits::new(20, None), ..Default::default() };
        let set = LimiterSet::with_clock(&config, Arc::new(ManualClock::new()));

        assert!(set.get(ApiSurface::Spot).try_consume(10));
        assert!(!set.get(ApiSurface::Spot).try_consume(1));
        assert!(set.get(ApiSurface::Futures).try_consume(10));
        assert_eq!(set.get(ApiSurface::Futures).available(), 10);
        assert_eq!(set.get(ApiSurface::Sapi).capacity(), 1200);
    }

    #[test]
    fn test_clones_share_limiters() {
        let set = LimiterSet::with_clock(&LimiterConfig::default(), Arc::new(ManualClock::new()));
        let clone = set.clone();

        assert!(set.get(ApiSurface::Sapi).try_consume(200));
        assert_eq!(clone.get(ApiSurface::Sapi).available(), 1000);
    }

    #[test]
    fn test_snapshot_order() {
        let set = LimiterSet::default();
        let surfaces: Vec<_> = set.snapshot().into_iter().map(|(surface, _)| surface).collect();
        assert_eq!(surfaces, ApiSurface::ALL.to_vec());
    }

    #[test]
    fn test_surface_display() {
        assert_eq!(ApiSurface::Spot.to_string(), "spot");
        assert_eq!(ApiSurface::Sapi.as_str(), "sapi");
        assert_eq!(serde_json::to_value(ApiSurface::Futures).unwrap(), serde_json::json!("futures"));
    }
}
