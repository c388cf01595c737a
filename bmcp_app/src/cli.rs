use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

/// Binance tools for language-model clients over stdio
#[derive(Debug, Parser)]
#[command(name = "binance_mcp_server", version, about)]
pub struct Cli {
    /// Use the Binance testnet regardless of BINANCE_TESTNET
    #[arg(long)]
    pub testnet: bool,

    /// Default log level when RUST_LOG is unset
    #[arg(long, default_value_t = Level::INFO)]
    pub log_level: Level,

    /// Also write hourly rolling log files to this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["binance_mcp_server"]).unwrap();
        assert!(!cli.testnet);
        assert_eq!(cli.log_level, Level::INFO);
        assert!(cli.log_dir.is_none());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from(["binance_mcp_server", "--testnet", "--log-level", "debug", "--log-dir", "/tmp/bmcp"]).unwrap();
        assert!(cli.testnet);
        assert_eq!(cli.log_level, Level::DEBUG);
        assert_eq!(cli.log_dir, Some(PathBuf::from("/tmp/bmcp")));
    }

    #[test]
    fn test_rejects_unknown_level() {
        assert!(Cli::try_parse_from(["binance_mcp_server", "--log-level", "loud"]).is_err());
    }
}
