//! # bmcp_tools
//!
//! Binance tools behind weighted admission, with uniform response envelopes

pub mod args;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod registry;
pub mod sanitize;
pub mod symbol_cache;
pub mod time_utils;
pub mod tools;
pub mod validation;

pub use args::Args;
pub use dispatch::Cost;
pub use dispatch::RateLimitedDispatch;
pub use envelope::Envelope;
pub use envelope::ToolOutput;
pub use error::ErrorKind;
pub use error::ToolError;
pub use error::ToolResult;
pub use registry::ToolContext;
pub use registry::ToolRegistry;
pub use registry::ToolSpec;
pub use symbol_cache::SymbolCache;
pub use symbol_cache::SymbolValidator;
pub use validation::ValidationError;
