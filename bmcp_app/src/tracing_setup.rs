use std::io;
use std::path::Path;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Initialise tracing on stderr, plus an hourly rolling file when `log_dir` is set
///
/// Stdout carries the protocol, so nothing is ever logged there. The
/// returned guard flushes the file writer and must live as long as `main`.
pub fn init(app_name: &str, default_level: Level, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Respects RUST_LOG, falls back to default_level
    let env_filter = EnvFilter::builder().with_default_directive(default_level.into()).from_env_lossy();

    let stderr_layer = fmt::layer().with_writer(io::stderr).with_target(true).with_line_number(true).with_ansi(false).compact();

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let _ = std::fs::create_dir_all(dir);

            let file_appender = tracing_appender::rolling::hourly(dir, format!("{app_name}.log"));
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer().with_writer(non_blocking).with_target(true).with_thread_ids(true).with_line_number(true).with_ansi(false).compact();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(env_filter).with(stderr_layer).with(file_layer).init();

    guard
}
