#![allow(dead_code)]

use std::sync::Arc;

use bmcp_http::testing::MockExchange;
use bmcp_ratelimit::LimiterConfig;
use bmcp_ratelimit::LimiterSet;
use bmcp_ratelimit::ManualClock;
use bmcp_tools::Args;
use bmcp_tools::SymbolValidator;
use bmcp_tools::ToolContext;
use bmcp_tools::ToolRegistry;
use serde_json::Value;

pub fn args(value: Value) -> Args {
    value.as_object().cloned().unwrap_or_default()
}

/// Registry over `mock` with default budgets and format-only symbol checks
pub fn registry(mock: MockExchange) -> (ToolRegistry, Arc<MockExchange>) {
    registry_with(mock, LimiterConfig::default(), SymbolValidator::format_only())
}

/// Registry with custom budgets; limiter time is frozen
pub fn registry_with(mock: MockExchange, config: LimiterConfig, symbols: SymbolValidator) -> (ToolRegistry, Arc<MockExchange>) {
    let mock = Arc::new(mock);
    let limiters = Arc::new(LimiterSet::with_clock(&config, Arc::new(ManualClock::new())));

    let context = ToolContext { client: mock.clone(), symbols, limiters, testnet: true };

    (ToolRegistry::new(context), mock)
}

/// Invoke and return the envelope as JSON
pub async fn call(registry: &ToolRegistry, name: &str, arguments: Value) -> Value {
    registry.invoke(name, args(arguments)).await.to_value()
}

pub fn error_type(envelope: &Value) -> &str {
    envelope["error"]["type"].as_str().unwrap_or_default()
}
