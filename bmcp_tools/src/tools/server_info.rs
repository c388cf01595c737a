use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use super::empty_schema;
use crate::args::Args;
use crate::dispatch::Cost;
use crate::envelope::ToolOutput;
use crate::error::ToolResult;
use crate::registry::ToolContext;
use crate::registry::ToolSpec;

pub const SERVER_NAME: &str = "binance-mcp-server";

pub fn spec() -> ToolSpec {
    ToolSpec {
        name: "get_server_info",
        description: "Get server status, configuration and remaining rate-limit budget. Does not call Binance.",
        input_schema: empty_schema(),
        surface: None,
        cost: Cost::Fixed(0),
        handler: |ctx, args| Box::pin(get_server_info(ctx, args)),
    }
}

pub async fn get_server_info(ctx: &ToolContext, _args: Args) -> ToolResult<ToolOutput> {
    let rate_limits: Map<String, Value> =
        ctx.limiters.snapshot().into_iter().map(|(surface, snapshot)| (surface.to_string(), json!(snapshot))).collect();

    Ok(ToolOutput::new(json!({
        "name": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "testnet": ctx.testnet,
        "symbol_existence_check": ctx.symbols.checks_existence(),
        "symbol_cache_ttl_seconds": ctx.symbols.cache().ttl().as_secs(),
        "rate_limits": rate_limits,
    })))
}
