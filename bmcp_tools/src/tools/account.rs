//! Signed spot account tools.

use bmcp_http::OrderRequest;
use bmcp_ratelimit::ApiSurface;
use bmcp_ratelimit::weight;
use serde_json::Value;
use serde_json::json;
use tracing::info;

use super::empty_schema;
use super::exchange_error;
use super::number_or_zero;
use super::object_schema;
use super::symbol_property;
use crate::args::Args;
use crate::args::optional_f64;
use crate::args::required_f64;
use crate::args::required_str;
use crate::dispatch::Cost;
use crate::envelope::ToolOutput;
use crate::error::ToolError;
use crate::error::ToolResult;
use crate::registry::ToolContext;
use crate::registry::ToolSpec;
use crate::validation::validate_order_type;
use crate::validation::validate_positive_number;
use crate::validation::validate_side;

pub fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "get_orders",
            description: "Get all orders (open, filled and cancelled) on the account for a symbol.",
            input_schema: object_schema(json!({ "symbol": symbol_property() }), &["symbol"]),
            surface: Some(ApiSurface::Spot),
            cost: Cost::Fixed(weight::ALL_ORDERS),
            handler: |ctx, args| Box::pin(get_orders(ctx, args)),
        },
        ToolSpec {
            name: "create_order",
            description: "Place a new spot order. LIMIT-style orders require a price.",
            input_schema: object_schema(
                json!({
                    "symbol": symbol_property(),
                    "side": { "type": "string", "enum": ["BUY", "SELL"] },
                    "order_type": {
                        "type": "string",
                        "enum": ["LIMIT", "MARKET", "STOP_LOSS", "STOP_LOSS_LIMIT", "TAKE_PROFIT", "TAKE_PROFIT_LIMIT", "LIMIT_MAKER"],
                    },
                    "quantity": { "type": "number", "exclusiveMinimum": 0 },
                    "price": { "type": "number", "exclusiveMinimum": 0 },
                }),
                &["symbol", "side", "order_type", "quantity"],
            ),
            surface: Some(ApiSurface::Spot),
            cost: Cost::Fixed(weight::CREATE_ORDER),
            handler: |ctx, args| Box::pin(create_order(ctx, args)),
        },
        ToolSpec {
            name: "get_account",
            description: "Get spot account permissions and non-zero balances.",
            input_schema: empty_schema(),
            surface: Some(ApiSurface::Spot),
            cost: Cost::Fixed(weight::ACCOUNT),
            handler: |ctx, args| Box::pin(get_account(ctx, args)),
        },
    ]
}

pub async fn get_orders(ctx: &ToolContext, args: Args) -> ToolResult<ToolOutput> {
    let symbol = ctx.symbols.validate(ctx.client.as_ref(), required_str(&args, "symbol")?).await?;

    let orders = ctx.client.all_orders(symbol.clone()).await.map_err(exchange_error("Error fetching orders"))?;

    let count = orders.as_array().map(Vec::len).unwrap_or_default();
    Ok(ToolOutput::new(json!({ "symbol": symbol, "orders": orders })).with_metadata("count", count))
}

pub async fn create_order(ctx: &ToolContext, args: Args) -> ToolResult<ToolOutput> {
    let symbol = ctx.symbols.validate(ctx.client.as_ref(), required_str(&args, "symbol")?).await?;
    let side = validate_side(required_str(&args, "side")?)?;
    let order_type = validate_order_type(required_str(&args, "order_type")?)?;
    let quantity = validate_positive_number(required_f64(&args, "quantity")?, "quantity", 0.0, None)?;
    let price = optional_f64(&args, "price")?.map(|p| validate_positive_number(p, "price", 0.0, None)).transpose()?;

    if order_type.requires_price() && price.is_none() {
        return Err(ToolError::validation(format!("Price is required for {order_type} orders")));
    }

    let order = OrderRequest {
        symbol,
        side,
        order_type,
        quantity,
        price: if order_type.requires_price() { price } else { None },
        time_in_force: None,
    };

    info!(symbol = %order.symbol, side = %order.side, order_type = %order.order_type, quantity = order.quantity, price = ?order.price, "creating order");

    let placed = ctx.client.create_order(order).await.map_err(exchange_error("Error creating order"))?;
    Ok(ToolOutput::new(placed))
}

pub async fn get_account(ctx: &ToolContext, _args: Args) -> ToolResult<ToolOutput> {
    let account = ctx.client.account().await.map_err(exchange_error("Error fetching account information"))?;

    let all_balances = account.get("balances").and_then(Value::as_array).ok_or_else(|| ToolError::internal("Unexpected response: missing 'balances'"))?;

    let balances: Vec<Value> = all_balances
        .iter()
        .filter_map(|balance| {
            let free = number_or_zero(balance, "free");
            let locked = number_or_zero(balance, "locked");
            (free + locked > 0.0).then(|| {
                json!({
                    "asset": balance.get("asset").cloned().unwrap_or(Value::Null),
                    "free": free,
                    "locked": locked,
                    "total": free + locked,
                })
            })
        })
        .collect();

    let non_zero = balances.len();
    let total = all_balances.len();

    let field = |key: &str| account.get(key).cloned().unwrap_or(Value::Null);
    let data = json!({
        "account_type": field("accountType"),
        "can_trade": field("canTrade"),
        "can_withdraw": field("canWithdraw"),
        "can_deposit": field("canDeposit"),
        "update_time": field("updateTime"),
        "permissions": field("permissions"),
        "balances": balances,
    });

    Ok(ToolOutput::new(data).with_metadata("non_zero_balances", non_zero).with_metadata("total_assets", total))
}
