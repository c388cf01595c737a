//! # bmcp_ratelimit
//!
//! Weighted admission control for the Binance REST surfaces

pub mod error;
pub mod limiter;
pub mod multi_window;
pub mod registry;
pub mod time;
pub mod token_bucket;
pub mod weight;

pub use error::RateLimitError;
pub use error::Result;
pub use limiter::RateLimiter;
pub use multi_window::MultiWindowLimiter;
pub use multi_window::MultiWindowLimiterBuilder;
pub use multi_window::WindowSnapshot;
pub use registry::ApiSurface;
pub use registry::LimiterConfig;
pub use registry::LimiterSet;
pub use registry::WindowLimits;
pub use time::Clock;
pub use time::ManualClock;
pub use time::MonotonicClock;
pub use token_bucket::TokenBucket;
pub use token_bucket::TokenBucketBuilder;
