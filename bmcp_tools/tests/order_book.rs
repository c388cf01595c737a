mod common;

use bmcp_http::testing::MockExchange;
use bmcp_http::testing::MockFailure;
use bmcp_ratelimit::LimiterConfig;
use bmcp_ratelimit::WindowLimits;
use bmcp_tools::SymbolValidator;
use common::call;
use common::error_type;
use common::registry;
use common::registry_with;
use serde_json::Value;
use serde_json::json;

fn book() -> Value {
    json!({
        "lastUpdateId": 1027024,
        "bids": [["3.98000000", "100.00000000"], ["4.00000000", "431.00000000"], ["3.99000000", "200.00000000"]],
        "asks": [["4.02000000", "25.00000000"], ["4.00000200", "12.00000000"], ["4.01000000", "50.00000000"]]
    })
}

#[tokio::test]
async fn test_default_limit_sorted_with_spread() {
    let (registry, mock) = registry(MockExchange::new().with_response("order_book", book()));

    let result = call(&registry, "get_order_book", json!({ "symbol": "btcusdt" })).await;
    assert_eq!(result["success"], true);

    let data = &result["data"];
    assert_eq!(data["symbol"], "BTCUSDT");
    assert_eq!(data["lastUpdateId"], 1027024);
    assert_eq!(data["bidCount"], 3);
    assert_eq!(data["askCount"], 3);

    let bid_prices: Vec<f64> = data["bids"].as_array().unwrap().iter().map(|l| l["price"].as_f64().unwrap()).collect();
    let ask_prices: Vec<f64> = data["asks"].as_array().unwrap().iter().map(|l| l["price"].as_f64().unwrap()).collect();
    assert_eq!(bid_prices, [4.0, 3.99, 3.98]);
    assert_eq!(ask_prices, [4.000002, 4.01, 4.02]);

    assert_eq!(data["bestBid"]["price"], 4.0);
    assert_eq!(data["bestBid"]["quantity"], 431.0);
    assert_eq!(data["bestAsk"]["price"], 4.000002);
    assert!((data["spread"].as_f64().unwrap() - 0.000002).abs() < 1e-9);
    assert!(data["spreadPercent"].is_number());

    let metadata = &result["metadata"];
    assert_eq!(metadata["requested_limit"], 100);
    assert_eq!(metadata["actual_bids"], 3);
    assert_eq!(metadata["actual_asks"], 3);

    // No limit is forwarded when the caller gave none
    assert_eq!(mock.last_args("order_book"), Some(json!({ "symbol": "BTCUSDT", "limit": null })));
}

#[tokio::test]
async fn test_custom_limit_forwarded() {
    let (registry, mock) = registry(MockExchange::new().with_response("order_book", book()));

    let result = call(&registry, "get_order_book", json!({ "symbol": "ETHUSDT", "limit": 10 })).await;

    assert_eq!(result["metadata"]["requested_limit"], 10);
    assert_eq!(mock.last_args("order_book").unwrap()["limit"], 10);
}

#[tokio::test]
async fn test_empty_book_has_null_spread() {
    let empty = json!({ "lastUpdateId": 1027026, "bids": [], "asks": [] });
    let (registry, _mock) = registry(MockExchange::new().with_response("order_book", empty));

    let result = call(&registry, "get_order_book", json!({ "symbol": "ADAUSDT" })).await;
    let data = &result["data"];

    assert_eq!(data["bidCount"], 0);
    assert_eq!(data["askCount"], 0);
    assert!(data["spread"].is_null());
    assert!(data["spreadPercent"].is_null());
    assert!(data.get("bestBid").is_none());
    assert!(data.get("bestAsk").is_none());
}

#[tokio::test]
async fn test_spread_percent_relative_to_best_bid() {
    let tight = json!({ "lastUpdateId": 1, "bids": [["100.0", "10.0"]], "asks": [["101.0", "5.0"]] });
    let (registry, _mock) = registry(MockExchange::new().with_response("order_book", tight));

    let result = call(&registry, "get_order_book", json!({ "symbol": "TESTUSDT" })).await;

    assert_eq!(result["data"]["spread"], 1.0);
    assert_eq!(result["data"]["spreadPercent"], 1.0);
}

#[tokio::test]
async fn test_invalid_symbols_never_reach_exchange() {
    let (registry, mock) = registry(MockExchange::new().with_response("order_book", book()));

    for symbol in ["BT", "123$%", "", "   "] {
        let result = call(&registry, "get_order_book", json!({ "symbol": symbol })).await;
        assert_eq!(result["success"], false);
        assert_eq!(error_type(&result), "validation_error", "symbol {symbol:?}");
    }

    assert_eq!(mock.call_count("order_book"), 0);
}

#[tokio::test]
async fn test_invalid_limits_rejected() {
    let (registry, mock) = registry(MockExchange::new().with_response("order_book", book()));

    for limit in [json!(-1), json!(0), json!(10000), json!("invalid"), json!(2.5)] {
        let result = call(&registry, "get_order_book", json!({ "symbol": "BTCUSDT", "limit": limit })).await;
        assert_eq!(error_type(&result), "validation_error", "limit {limit}");
    }

    assert_eq!(mock.call_count("order_book"), 0);
}

#[tokio::test]
async fn test_api_error_mapped_with_code() {
    let failure = MockFailure::Api { code: -1121, message: "Invalid symbol.".into() };
    let (registry, _mock) = registry(MockExchange::new().with_failure("order_book", failure));

    let result = call(&registry, "get_order_book", json!({ "symbol": "INVALID" })).await;

    assert_eq!(error_type(&result), "binance_api_error");
    assert!(result["error"]["message"].as_str().unwrap().starts_with("Error fetching order book"));
    assert_eq!(result["error"]["details"]["code"], -1121);
}

#[tokio::test]
async fn test_transport_error_mapped() {
    let (registry, _mock) = registry(MockExchange::new().with_failure("order_book", MockFailure::Transport("Network error".into())));

    let result = call(&registry, "get_order_book", json!({ "symbol": "BTCUSDT" })).await;

    assert_eq!(error_type(&result), "binance_api_error");
    assert!(result["error"]["message"].as_str().unwrap().contains("Network error"));
    assert!(result["error"].get("details").is_none());
}

#[tokio::test]
async fn test_malformed_levels_are_internal_error() {
    let broken = json!({ "lastUpdateId": 1, "bids": [["x"]], "asks": [] });
    let (registry, _mock) = registry(MockExchange::new().with_response("order_book", broken));

    let result = call(&registry, "get_order_book", json!({ "symbol": "BTCUSDT" })).await;
    assert_eq!(error_type(&result), "internal_error");
}

#[tokio::test]
async fn test_depth_weight_charged_against_spot() {
    let config = LimiterConfig { spot: WindowLimits::new(30, None), ..Default::default() };
    let (registry, mock) = registry_with(MockExchange::new().with_response("order_book", book()), config, SymbolValidator::format_only());

    // limit 1000 weighs 20, leaving 10
    let first = call(&registry, "get_order_book", json!({ "symbol": "BTCUSDT", "limit": 1000 })).await;
    assert_eq!(first["success"], true);

    let second = call(&registry, "get_order_book", json!({ "symbol": "BTCUSDT", "limit": 1000 })).await;
    assert_eq!(error_type(&second), "rate_limit_exceeded");
    assert_eq!(second["error"]["details"]["weight"], 20);
    assert_eq!(second["error"]["message"], "API rate limit exceeded. Please try again later.");

    // limit 500 weighs 10 and still fits
    let third = call(&registry, "get_order_book", json!({ "symbol": "BTCUSDT", "limit": 500 })).await;
    assert_eq!(third["success"], true);

    assert_eq!(mock.call_count("order_book"), 2);
}
