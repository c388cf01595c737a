//! Server configuration from `BINANCE_*` environment variables
//!
//! | Variable | Default |
//! |----------|---------|
//! | `BINANCE_API_KEY` / `BINANCE_API_SECRET` | required |
//! | `BINANCE_TESTNET` | `false` |
//! | `BINANCE_{SPOT,FUTURES,SAPI}_WEIGHT_LIMIT_PER_MINUTE` | `1200` |
//! | `BINANCE_{SPOT,FUTURES,SAPI}_WEIGHT_LIMIT_PER_SECOND` | the per-minute value |
//! | `BINANCE_SYMBOL_CACHE_TTL_SECONDS` | `900` |
//! | `BINANCE_MCP_VALIDATE_SYMBOL_EXISTS` | `false` |

use std::fmt;
use std::time::Duration;

use ::config::Config;
use ::config::Environment;
use ::config::Map;
use bmcp_ratelimit::LimiterConfig;
use bmcp_ratelimit::WindowLimits;
use bmcp_ratelimit::registry::DEFAULT_WEIGHT_PER_MINUTE;
use bmcp_tools::sanitize::REDACTED;
use bmcp_tools::symbol_cache::DEFAULT_SYMBOL_CACHE_TTL;
use serde::Deserialize;
use thiserror::Error;

pub const ENV_PREFIX: &str = "BINANCE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

fn default_weight_limit() -> u32 {
    DEFAULT_WEIGHT_PER_MINUTE
}

fn default_cache_ttl() -> u64 {
    DEFAULT_SYMBOL_CACHE_TTL.as_secs()
}

#[derive(Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default)]
    pub testnet: bool,

    #[serde(default = "default_weight_limit")]
    pub spot_weight_limit_per_minute: u32,
    #[serde(default)]
    pub spot_weight_limit_per_second: Option<u32>,
    #[serde(default = "default_weight_limit")]
    pub futures_weight_limit_per_minute: u32,
    #[serde(default)]
    pub futures_weight_limit_per_second: Option<u32>,
    #[serde(default = "default_weight_limit")]
    pub sapi_weight_limit_per_minute: u32,
    #[serde(default)]
    pub sapi_weight_limit_per_second: Option<u32>,

    #[serde(default = "default_cache_ttl")]
    pub symbol_cache_ttl_seconds: u64,
    /// Opt-in listing check for every symbol argument
    #[serde(default)]
    pub mcp_validate_symbol_exists: bool,
}

impl ServerConfig {
    /// Load from the process environment and validate
    pub fn load() -> Result<Self> {
        Self::from_environment(Environment::with_prefix(ENV_PREFIX))
    }

    /// Load from an explicit variable map instead of the process environment
    pub fn from_vars(vars: Map<String, String>) -> Result<Self> {
        Self::from_environment(Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
    }

    fn from_environment(environment: Environment) -> Result<Self> {
        let config = Config::builder().add_source(environment.try_parsing(true)).build()?;

        let loaded: ServerConfig = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Collect every problem instead of stopping at the first
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.api_key.trim().is_empty() {
            problems.push(format!("{ENV_PREFIX}_API_KEY is required"));
        }
        if self.api_secret.trim().is_empty() {
            problems.push(format!("{ENV_PREFIX}_API_SECRET is required"));
        }

        let windows = [
            ("SPOT", self.spot_weight_limit_per_minute, self.spot_weight_limit_per_second),
            ("FUTURES", self.futures_weight_limit_per_minute, self.futures_weight_limit_per_second),
            ("SAPI", self.sapi_weight_limit_per_minute, self.sapi_weight_limit_per_second),
        ];
        for (surface, per_minute, per_second) in windows {
            if per_minute == 0 {
                problems.push(format!("{ENV_PREFIX}_{surface}_WEIGHT_LIMIT_PER_MINUTE must be greater than 0"));
            }
            if per_second == Some(0) {
                problems.push(format!("{ENV_PREFIX}_{surface}_WEIGHT_LIMIT_PER_SECOND must be greater than 0"));
            }
        }

        if problems.is_empty() { Ok(()) } else { Err(ConfigError::Invalid(problems)) }
    }

    pub fn limiter_config(&self) -> LimiterConfig {
        LimiterConfig {
            spot: WindowLimits::new(self.spot_weight_limit_per_minute, self.spot_weight_limit_per_second),
            futures: WindowLimits::new(self.futures_weight_limit_per_minute, self.futures_weight_limit_per_second),
            sapi: WindowLimits::new(self.sapi_weight_limit_per_minute, self.sapi_weight_limit_per_second),
        }
    }

    pub fn symbol_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.symbol_cache_ttl_seconds)
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("api_key", &REDACTED)
            .field("api_secret", &REDACTED)
            .field("testnet", &self.testnet)
            .field("limits", &self.limiter_config())
            .field("symbol_cache_ttl_seconds", &self.symbol_cache_ttl_seconds)
            .field("mcp_validate_symbol_exists", &self.mcp_validate_symbol_exists)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Map<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn credentials() -> Vec<(&'static str, &'static str)> {
        vec![("BINANCE_API_KEY", "test_key"), ("BINANCE_API_SECRET", "test_secret")]
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_vars(vars(&credentials())).unwrap();

        assert!(!config.testnet);
        assert!(!config.mcp_validate_symbol_exists);
        assert_eq!(config.symbol_cache_ttl(), Duration::from_secs(900));
        assert_eq!(config.limiter_config(), LimiterConfig::default());
    }

    #[test]
    fn test_overrides() {
        let mut pairs = credentials();
        pairs.extend([
            ("BINANCE_TESTNET", "true"),
            ("BINANCE_SPOT_WEIGHT_LIMIT_PER_MINUTE", "600"),
            ("BINANCE_SPOT_WEIGHT_LIMIT_PER_SECOND", "20"),
            ("BINANCE_FUTURES_WEIGHT_LIMIT_PER_MINUTE", "2400"),
            ("BINANCE_SYMBOL_CACHE_TTL_SECONDS", "60"),
            ("BINANCE_MCP_VALIDATE_SYMBOL_EXISTS", "true"),
        ]);

        let config = ServerConfig::from_vars(vars(&pairs)).unwrap();
        let limits = config.limiter_config();

        assert!(config.testnet);
        assert!(config.mcp_validate_symbol_exists);
        assert_eq!(limits.spot, WindowLimits { per_minute: 600, per_second: 20 });
        assert_eq!(limits.futures, WindowLimits { per_minute: 2400, per_second: 2400 });
        assert_eq!(limits.sapi, WindowLimits::default());
        assert_eq!(config.symbol_cache_ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_missing_credentials_listed() {
        let err = ServerConfig::from_vars(Map::new()).unwrap_err();

        let ConfigError::Invalid(problems) = err else {
            panic!("expected validation failure");
        };
        assert_eq!(problems, ["BINANCE_API_KEY is required", "BINANCE_API_SECRET is required"]);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let mut pairs = credentials();
        pairs.push(("BINANCE_SAPI_WEIGHT_LIMIT_PER_SECOND", "0"));

        let err = ServerConfig::from_vars(vars(&pairs)).unwrap_err();
        assert!(err.to_string().contains("BINANCE_SAPI_WEIGHT_LIMIT_PER_SECOND must be greater than 0"));
    }

    #[test]
    fn test_unparsable_number_is_load_error() {
        let mut pairs = credentials();
        pairs.push(("BINANCE_SPOT_WEIGHT_LIMIT_PER_MINUTE", "lots"));

        assert!(matches!(ServerConfig::from_vars(vars(&pairs)), Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_debug_hides_credentials() {
        let config = ServerConfig::from_vars(vars(&credentials())).unwrap();
        let debug = format!("{config:?}");

        assert!(!debug.contains("test_key"));
        assert!(!debug.contains("test_secret"));
    }
}
