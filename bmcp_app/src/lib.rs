//! # bmcp_app
//!
//! Configuration, logging and the stdio tool server behind `binance_mcp_server`

pub mod cli;
pub mod config;
pub mod protocol;
pub mod server;
pub mod shutdown_handler;
pub mod tracing_setup;

pub use config::ServerConfig;
pub use server::McpServer;

/// Process exit code for any startup failure
pub const STARTUP_FAILURE_EXIT_CODE: u8 = 84;
