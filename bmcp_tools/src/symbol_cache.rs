//! Cached view of the symbols currently listed on the exchange.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use bmcp_http::ExchangeClient;
use bmcp_http::ExchangeError;
use bmcp_ratelimit::Clock;
use bmcp_ratelimit::time::default_clock;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;
use tracing::info;

use crate::error::ToolError;
use crate::error::ToolResult;
use crate::validation::validate_symbol;

pub const DEFAULT_SYMBOL_CACHE_TTL: Duration = Duration::from_secs(900);

#[derive(Debug, Default)]
struct CacheState {
    symbols: HashSet<String>,
    refreshed_at: Option<Duration>,
}

/// Listed symbols, refreshed from `exchange_info` when never filled or older than the TTL
pub struct SymbolCache {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl SymbolCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, default_clock())
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { clock, ttl, state: Mutex::new(CacheState::default()) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether `symbol` (already normalized) is listed, refreshing first if stale
    pub async fn contains(&self, client: &dyn ExchangeClient, symbol: &str) -> Result<bool, ExchangeError> {
        let mut state = self.state.lock().await;

        let now = self.clock.now();
        let stale = match state.refreshed_at {
            Some(at) => now.saturating_sub(at) >= self.ttl,
            None => true,
        };

        if stale {
            let info = client.exchange_info().await?;
            state.symbols = listed_symbols(&info);
            state.refreshed_at = Some(now);
            info!(count = state.symbols.len(), "refreshed symbol cache");
        }

        Ok(state.symbols.contains(symbol))
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.symbols.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.symbols.is_empty()
    }
}

/// Symbols with status `TRADING` or spot trading allowed
pub fn listed_symbols(info: &Value) -> HashSet<String> {
    let Some(symbols) = info.get("symbols").and_then(Value::as_array) else {
        return HashSet::new();
    };

    symbols
        .iter()
        .filter(|s| s.get("status").and_then(Value::as_str) == Some("TRADING") || s.get("isSpotTradingAllowed").and_then(Value::as_bool) == Some(true))
        .filter_map(|s| s.get("symbol").and_then(Value::as_str))
        .map(str::to_uppercase)
        .collect()
}

/// Format validation plus the opt-in existence check
pub struct SymbolValidator {
    check_exists: bool,
    cache: SymbolCache,
}

impl SymbolValidator {
    pub fn new(check_exists: bool, cache: SymbolCache) -> Self {
        Self { check_exists, cache }
    }

    /// Format checks only
    pub fn format_only() -> Self {
        Self::new(false, SymbolCache::new(DEFAULT_SYMBOL_CACHE_TTL))
    }

    pub fn checks_existence(&self) -> bool {
        self.check_exists
    }

    pub fn cache(&self) -> &SymbolCache {
        &self.cache
    }

    pub async fn validate(&self, client: &dyn ExchangeClient, symbol: &str) -> ToolResult<String> {
        let symbol = validate_symbol(symbol)?;
        if !self.check_exists {
            return Ok(symbol);
        }

        match self.cache.contains(client, &symbol).await {
            Ok(true) => Ok(symbol),
            Ok(false) => {
                debug!(%symbol, "symbol not listed");
                Err(ToolError::validation(format!("Symbol '{symbol}' is not listed on Binance")))
            }
            Err(err) => Err(ToolError::from_exchange("Error refreshing symbol list", &err)),
        }
    }
}
