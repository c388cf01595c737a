//! Binance request weights
//!
//! Mirrors the published weight table for the endpoints the tools call.
//! Every function here is a pure function of its input and is evaluated
//! before the limiter is consulted.
//!
//! Reference: https://developers.binance.com/docs/binance-spot-api-docs/rest-api/limits

use serde_json::Value;

pub const PING: u32 = 1;
pub const TICKER: u32 = 1;
pub const TICKER_24H: u32 = 1;
pub const EXCHANGE_INFO: u32 = 10;
pub const ACCOUNT: u32 = 10;
pub const ALL_ORDERS: u32 = 10;
pub const CREATE_ORDER: u32 = 1;
pub const TRADE_FEE: u32 = 1;
pub const FUTURES_ACCOUNT: u32 = 5;
pub const POSITION_INFO: u32 = 5;
pub const INCOME_HISTORY: u32 = 30;

/// Weight charged when the depth limit is absent or unreadable
pub const DEFAULT_DEPTH_WEIGHT: u32 = 5;

/// Weight of `GET /api/v3/depth` for a given `limit`
pub fn estimate_weight_for_depth(limit: Option<i64>) -> u32 {
    let Some(limit) = limit else {
        return DEFAULT_DEPTH_WEIGHT;
    };

    match limit {
        ..=50 => 2,
        51..=100 => 5,
        101..=500 => 10,
        501..=1000 => 20,
        _ => 50,
    }
}

/// Depth weight from a raw tool argument
///
/// Integers are used as-is, floats are truncated and numeric strings are
/// parsed; anything else falls back to `DEFAULT_DEPTH_WEIGHT`.
pub fn depth_weight_from_arg(limit: Option<&Value>) -> u32 {
    let parsed = match limit {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    match parsed {
        Some(limit) => estimate_weight_for_depth(Some(limit)),
        None => DEFAULT_DEPTH_WEIGHT,
    }
}
