//! Public market data and trading fee tools.

use bmcp_ratelimit::ApiSurface;
use bmcp_ratelimit::weight;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use super::as_items;
use super::empty_schema;
use super::exchange_error;
use super::number_field;
use super::object_schema;
use super::parse_number;
use super::symbol_property;
use crate::args::Args;
use crate::args::optional_limit;
use crate::args::optional_str;
use crate::args::required_str;
use crate::dispatch::Cost;
use crate::envelope::ToolOutput;
use crate::error::ToolError;
use crate::error::ToolResult;
use crate::registry::ToolContext;
use crate::registry::ToolFuture;
use crate::registry::ToolSpec;
use crate::validation::DEFAULT_MAX_LIMIT;
use crate::validation::validate_limit;
use crate::validation::validate_symbol;

/// Depth used by Binance when no limit is sent
pub const DEFAULT_DEPTH_LIMIT: u32 = 100;

pub fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "ping",
            description: "Test connectivity to the Binance REST API.",
            input_schema: empty_schema(),
            surface: Some(ApiSurface::Spot),
            cost: Cost::Fixed(weight::PING),
            handler: |ctx, args| Box::pin(ping(ctx, args)),
        },
        ToolSpec {
            name: "get_ticker_price",
            description: "Get the current price for a trading symbol.",
            input_schema: object_schema(json!({ "symbol": symbol_property() }), &["symbol"]),
            surface: Some(ApiSurface::Spot),
            cost: Cost::Fixed(weight::TICKER),
            handler: |ctx, args| Box::pin(get_ticker_price(ctx, args)),
        },
        ToolSpec {
            name: "get_24hr_ticker",
            description: "Get 24-hour price change statistics for a trading symbol.",
            input_schema: object_schema(json!({ "symbol": symbol_property() }), &["symbol"]),
            surface: Some(ApiSurface::Spot),
            cost: Cost::Fixed(weight::TICKER_24H),
            handler: |ctx, args| Box::pin(get_24hr_ticker(ctx, args)),
        },
        ToolSpec {
            name: "get_exchange_info",
            description: "Get exchange trading rules, or the rules of a single symbol when one is given.",
            input_schema: object_schema(json!({ "symbol": symbol_property() }), &[]),
            surface: Some(ApiSurface::Spot),
            cost: Cost::Fixed(weight::EXCHANGE_INFO),
            handler: |ctx, args| Box::pin(get_exchange_info(ctx, args)),
        },
        ToolSpec {
            name: "get_order_book",
            description: "Get the current order book (bids and asks) for a trading symbol, with spread.",
            input_schema: object_schema(
                json!({
                    "symbol": symbol_property(),
                    "limit": { "type": "integer", "minimum": 1, "maximum": DEFAULT_MAX_LIMIT, "description": "Depth per side (default 100)" },
                }),
                &["symbol"],
            ),
            surface: Some(ApiSurface::Spot),
            cost: Cost::dynamic(|args: &Args| Some(weight::depth_weight_from_arg(args.get("limit")))),
            handler: |ctx, args| Box::pin(get_order_book(ctx, args)),
        },
        ToolSpec {
            name: "get_fee_info",
            description: "Get maker and taker commission rates, for one symbol or for all symbols.",
            input_schema: object_schema(json!({ "symbol": symbol_property() }), &[]),
            surface: Some(ApiSurface::Sapi),
            cost: Cost::Fixed(weight::TRADE_FEE),
            handler: |ctx, args| Box::pin(get_fee_info(ctx, args)),
        },
    ]
}

pub async fn ping(ctx: &ToolContext, _args: Args) -> ToolResult<ToolOutput> {
    ctx.client.ping().await.map_err(exchange_error("Error pinging Binance"))?;
    Ok(ToolOutput::new(json!({ "status": "ok", "testnet": ctx.testnet })))
}

pub async fn get_ticker_price(ctx: &ToolContext, args: Args) -> ToolResult<ToolOutput> {
    let symbol = ctx.symbols.validate(ctx.client.as_ref(), required_str(&args, "symbol")?).await?;

    let ticker = ctx.client.symbol_ticker(symbol.clone()).await.map_err(exchange_error("Error fetching ticker price"))?;

    Ok(ToolOutput::new(json!({
        "symbol": ticker.get("symbol").and_then(Value::as_str).unwrap_or(&symbol),
        "price": number_field(&ticker, "price")?,
    })))
}

const TICKER_24H_FIELDS: [(&str, &str); 13] = [
    ("priceChange", "price_change"),
    ("priceChangePercent", "price_change_percent"),
    ("weightedAvgPrice", "weighted_avg_price"),
    ("prevClosePrice", "prev_close_price"),
    ("lastPrice", "last_price"),
    ("bidPrice", "bid_price"),
    ("askPrice", "ask_price"),
    ("openPrice", "open_price"),
    ("highPrice", "high_price"),
    ("lowPrice", "low_price"),
    ("volume", "volume"),
    ("quoteVolume", "quote_volume"),
    ("lastQty", "last_quantity"),
];

pub async fn get_24hr_ticker(ctx: &ToolContext, args: Args) -> ToolResult<ToolOutput> {
    let symbol = ctx.symbols.validate(ctx.client.as_ref(), required_str(&args, "symbol")?).await?;

    let ticker = ctx.client.ticker_24h(symbol.clone()).await.map_err(exchange_error("Error fetching 24hr ticker"))?;

    let mut data = Map::new();
    data.insert("symbol".into(), Value::String(symbol));
    for (source, target) in TICKER_24H_FIELDS {
        data.insert(target.into(), json!(number_field(&ticker, source)?));
    }
    for (source, target) in [("openTime", "open_time"), ("closeTime", "close_time"), ("count", "count")] {
        data.insert(target.into(), ticker.get(source).cloned().unwrap_or(Value::Null));
    }

    Ok(ToolOutput::new(Value::Object(data)))
}

pub async fn get_exchange_info(ctx: &ToolContext, args: Args) -> ToolResult<ToolOutput> {
    let symbol = optional_str(&args, "symbol")?.map(validate_symbol).transpose()?;

    let info = ctx.client.exchange_info().await.map_err(exchange_error("Error fetching exchange info"))?;

    let symbols = info.get("symbols").and_then(Value::as_array).ok_or_else(|| ToolError::internal("Unexpected response: missing 'symbols'"))?;

    let Some(symbol) = symbol else {
        return Ok(ToolOutput::new(json!({
            "timezone": info.get("timezone").cloned().unwrap_or(Value::Null),
            "server_time": info.get("serverTime").cloned().unwrap_or(Value::Null),
            "rate_limits": info.get("rateLimits").cloned().unwrap_or_else(|| json!([])),
            "exchange_filters": info.get("exchangeFilters").cloned().unwrap_or_else(|| json!([])),
            "symbols_count": symbols.len(),
        })));
    };

    let Some(found) = symbols.iter().find(|s| s.get("symbol").and_then(Value::as_str) == Some(symbol.as_str())) else {
        return Err(ToolError::validation(format!("Symbol {symbol} not found on exchange")));
    };

    let field = |key: &str| found.get(key).cloned().unwrap_or(Value::Null);

    Ok(ToolOutput::new(json!({
        "symbol": symbol,
        "status": field("status"),
        "base_asset": field("baseAsset"),
        "quote_asset": field("quoteAsset"),
        "base_precision": field("baseAssetPrecision"),
        "quote_precision": field("quotePrecision"),
        "order_types": field("orderTypes"),
        "iceberg_allowed": field("icebergAllowed"),
        "filters": field("filters"),
    })))
}

/// One side of the book as `(price, quantity)` pairs
fn parse_levels(book: &Value, side: &str) -> ToolResult<Vec<(f64, f64)>> {
    let levels = book.get(side).and_then(Value::as_array).ok_or_else(|| ToolError::internal(format!("Unexpected response: missing '{side}'")))?;

    levels
        .iter()
        .map(|level| match (level.get(0).and_then(parse_number), level.get(1).and_then(parse_number)) {
            (Some(price), Some(quantity)) => Ok((price, quantity)),
            _ => Err(ToolError::internal(format!("Unexpected response: malformed level in '{side}'"))),
        })
        .collect()
}

fn level_json(&(price, quantity): &(f64, f64)) -> Value {
    json!({ "price": price, "quantity": quantity })
}

pub async fn get_order_book(ctx: &ToolContext, args: Args) -> ToolResult<ToolOutput> {
    let symbol = ctx.symbols.validate(ctx.client.as_ref(), required_str(&args, "symbol")?).await?;
    let limit = validate_limit(optional_limit(&args, "limit")?, DEFAULT_MAX_LIMIT)?;

    let book = ctx.client.order_book(symbol.clone(), limit).await.map_err(exchange_error("Error fetching order book"))?;

    let mut bids = parse_levels(&book, "bids")?;
    let mut asks = parse_levels(&book, "asks")?;
    bids.sort_by(|a, b| b.0.total_cmp(&a.0));
    asks.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut data = Map::new();
    data.insert("symbol".into(), Value::String(symbol));
    data.insert("lastUpdateId".into(), book.get("lastUpdateId").cloned().unwrap_or(Value::Null));
    data.insert("bids".into(), bids.iter().map(level_json).collect());
    data.insert("asks".into(), asks.iter().map(level_json).collect());
    data.insert("bidCount".into(), json!(bids.len()));
    data.insert("askCount".into(), json!(asks.len()));

    let best_bid = bids.first();
    let best_ask = asks.first();
    if let Some(level) = best_bid {
        data.insert("bestBid".into(), level_json(level));
    }
    if let Some(level) = best_ask {
        data.insert("bestAsk".into(), level_json(level));
    }

    let spread = match (best_bid, best_ask) {
        (Some(bid), Some(ask)) => Some(ask.0 - bid.0),
        _ => None,
    };
    let spread_percent = match (spread, best_bid) {
        (Some(spread), Some(bid)) if bid.0 > 0.0 => Some(spread * 100.0 / bid.0),
        _ => None,
    };
    data.insert("spread".into(), json!(spread));
    data.insert("spreadPercent".into(), json!(spread_percent));

    Ok(ToolOutput::new(Value::Object(data))
        .with_metadata("requested_limit", limit.unwrap_or(DEFAULT_DEPTH_LIMIT))
        .with_metadata("actual_bids", bids.len())
        .with_metadata("actual_asks", asks.len()))
}

fn fee_entry(item: &Value) -> ToolResult<(String, Value)> {
    let symbol = item.get("symbol").and_then(Value::as_str).ok_or_else(|| ToolError::internal("Unexpected response: fee entry without symbol"))?;
    let maker = number_field(item, "makerCommission")?;
    let taker = number_field(item, "takerCommission")?;

    let entry = json!({
        "symbol": symbol,
        "makerCommission": maker,
        "takerCommission": taker,
        "makerCommissionPercent": format!("{:.4}%", maker * 100.0),
        "takerCommissionPercent": format!("{:.4}%", taker * 100.0),
    });

    Ok((symbol.to_string(), entry))
}

pub async fn get_fee_info(ctx: &ToolContext, args: Args) -> ToolResult<ToolOutput> {
    let symbol = match optional_str(&args, "symbol")? {
        Some(raw) => Some(ctx.symbols.validate(ctx.client.as_ref(), raw).await?),
        None => None,
    };

    let payload = ctx.client.trade_fee(symbol.clone()).await.map_err(exchange_error("Error fetching fee information"))?;

    let mut fees = as_items(payload)?.iter().map(fee_entry).collect::<ToolResult<Vec<_>>>()?;
    fees.sort_by(|a, b| a.0.cmp(&b.0));

    let count = fees.len();
    let data: Vec<Value> = fees.into_iter().map(|(_, entry)| entry).collect();

    let mut output = ToolOutput::new(Value::Array(data)).with_metadata("count", count).with_metadata("fee_type", "trading_fees");
    if let Some(symbol) = symbol {
        output = output.with_metadata("requested_symbol", symbol);
    }

    Ok(output)
}
