//! Signed USD-M futures tools.

use bmcp_http::IncomeQuery;
use bmcp_ratelimit::ApiSurface;
use bmcp_ratelimit::weight;
use serde_json::Value;
use serde_json::json;

use super::as_items;
use super::empty_schema;
use super::exchange_error;
use super::number_or_zero;
use super::object_schema;
use super::symbol_property;
use crate::args::Args;
use crate::args::optional_limit;
use crate::args::optional_str;
use crate::dispatch::Cost;
use crate::envelope::ToolOutput;
use crate::error::ToolResult;
use crate::registry::ToolContext;
use crate::registry::ToolSpec;
use crate::validation::validate_limit;

/// Binance caps income history pages at 1000 entries
pub const MAX_INCOME_LIMIT: i64 = 1000;

pub fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "get_futures_account",
            description: "Get the USD-M futures account summary with open positions only.",
            input_schema: empty_schema(),
            surface: Some(ApiSurface::Futures),
            cost: Cost::Fixed(weight::FUTURES_ACCOUNT),
            handler: |ctx, args| Box::pin(get_futures_account(ctx, args)),
        },
        ToolSpec {
            name: "get_position_info",
            description: "Get open USD-M futures positions, optionally for one symbol.",
            input_schema: object_schema(json!({ "symbol": symbol_property() }), &[]),
            surface: Some(ApiSurface::Futures),
            cost: Cost::Fixed(weight::POSITION_INFO),
            handler: |ctx, args| Box::pin(get_position_info(ctx, args)),
        },
        ToolSpec {
            name: "get_pnl",
            description: "Get realized PnL history for USD-M futures and its total.",
            input_schema: object_schema(
                json!({
                    "symbol": symbol_property(),
                    "limit": { "type": "integer", "minimum": 1, "maximum": MAX_INCOME_LIMIT },
                }),
                &[],
            ),
            surface: Some(ApiSurface::Futures),
            cost: Cost::Fixed(weight::INCOME_HISTORY),
            handler: |ctx, args| Box::pin(get_pnl(ctx, args)),
        },
    ]
}

fn is_open(position: &Value) -> bool {
    number_or_zero(position, "positionAmt") != 0.0
}

pub async fn get_futures_account(ctx: &ToolContext, _args: Args) -> ToolResult<ToolOutput> {
    let mut account = ctx.client.futures_account().await.map_err(exchange_error("Error fetching futures account"))?;

    let mut open_positions = 0;
    if let Some(positions) = account.get_mut("positions").and_then(Value::as_array_mut) {
        positions.retain(is_open);
        open_positions = positions.len();
    }

    Ok(ToolOutput::new(account).with_metadata("open_positions", open_positions))
}

pub async fn get_position_info(ctx: &ToolContext, args: Args) -> ToolResult<ToolOutput> {
    let symbol = match optional_str(&args, "symbol")? {
        Some(raw) => Some(ctx.symbols.validate(ctx.client.as_ref(), raw).await?),
        None => None,
    };

    let payload = ctx.client.futures_positions(symbol.clone()).await.map_err(exchange_error("Error fetching position information"))?;

    let positions: Vec<Value> = as_items(payload)?.into_iter().filter(is_open).collect();

    let count = positions.len();
    let mut output = ToolOutput::new(json!(positions)).with_metadata("count", count);
    if let Some(symbol) = symbol {
        output = output.with_metadata("requested_symbol", symbol);
    }
    Ok(output)
}

pub async fn get_pnl(ctx: &ToolContext, args: Args) -> ToolResult<ToolOutput> {
    let symbol = match optional_str(&args, "symbol")? {
        Some(raw) => Some(ctx.symbols.validate(ctx.client.as_ref(), raw).await?),
        None => None,
    };
    let limit = validate_limit(optional_limit(&args, "limit")?, MAX_INCOME_LIMIT)?;

    let payload = ctx.client.futures_income(IncomeQuery::realized_pnl(symbol, limit)).await.map_err(exchange_error("Error fetching PnL history"))?;

    let entries = as_items(payload)?;
    let total: f64 = entries.iter().map(|entry| number_or_zero(entry, "income")).sum();
    let count = entries.len();

    Ok(ToolOutput::new(json!({ "entries": entries, "total_realized_pnl": total })).with_metadata("count", count))
}
