//! Built-in tools, one exchange call each
//!
//! Handlers receive arguments after admission, validate them, call the
//! exchange and reshape the payload. Exchange failures are mapped with a
//! per-tool context prefix.

pub mod account;
pub mod futures;
pub mod market;
pub mod server_info;

use bmcp_http::ExchangeError;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::error::ToolError;
use crate::error::ToolResult;
use crate::registry::ToolSpec;

/// Every tool in listing order
pub fn builtin() -> Vec<ToolSpec> {
    let mut tools = vec![server_info::spec()];
    tools.extend(market::specs());
    tools.extend(account::specs());
    tools.extend(futures::specs());
    tools
}

/// Closure mapping an exchange failure under `context`
pub(crate) fn exchange_error(context: &'static str) -> impl Fn(ExchangeError) -> ToolError {
    move |err| ToolError::from_exchange(context, &err)
}

/// Binance encodes decimals as strings; plain numbers are accepted too
pub(crate) fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Numeric field that must be present
pub(crate) fn number_field(object: &Value, key: &str) -> ToolResult<f64> {
    object.get(key).and_then(parse_number).ok_or_else(|| ToolError::internal(format!("Unexpected response: missing numeric field '{key}'")))
}

/// Numeric field that may be absent, defaulting to zero
pub(crate) fn number_or_zero(object: &Value, key: &str) -> f64 {
    object.get(key).and_then(parse_number).unwrap_or(0.0)
}

/// Items of a list payload, or a single object wrapped as one item
pub(crate) fn as_items(payload: Value) -> ToolResult<Vec<Value>> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(_) => Ok(vec![payload]),
        other => Err(ToolError::internal(format!("Unexpected response: expected a list, got {other}"))),
    }
}

/// JSON schema for an object with the given properties
pub(crate) fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

pub(crate) fn empty_schema() -> Value {
    object_schema(Value::Object(Map::new()), &[])
}

pub(crate) fn symbol_property() -> Value {
    json!({ "type": "string", "description": "Trading pair symbol, e.g. BTCUSDT" })
}
