//! In-memory `ExchangeClient` for tests.
//!
//! Responses are keyed by trait method name (`"order_book"`, `"trade_fee"`,
//! ...). Every call is recorded with its arguments so tests can assert on
//! what reached the exchange, and on what did not.

use std::collections::HashMap;
use std::future;

use parking_lot::Mutex;
use serde_json::Value;
use serde_json::json;

use crate::errors::ExchangeError;
use crate::exchange::ExchangeClient;
use crate::exchange::ExchangeFuture;
use crate::types::IncomeQuery;
use crate::types::OrderRequest;

/// Scripted failure, converted to an `ExchangeError` on each call
#[derive(Debug, Clone)]
pub enum MockFailure {
    Api { code: i64, message: String },
    Transport(String),
    InvalidResponse(String),
    SignerMissing(&'static str),
}

impl From<&MockFailure> for ExchangeError {
    fn from(failure: &MockFailure) -> Self {
        match failure {
            MockFailure::Api { code, message } => ExchangeError::Api { code: *code, message: message.clone() },
            MockFailure::Transport(msg) => ExchangeError::Transport(msg.clone()),
            MockFailure::InvalidResponse(msg) => ExchangeError::InvalidResponse(msg.clone()),
            MockFailure::SignerMissing(endpoint) => ExchangeError::SignerMissing { endpoint: *endpoint },
        }
    }
}

/// One recorded exchange call
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub method: &'static str,
    pub args: Value,
}

type Scripted = Result<Value, MockFailure>;

#[derive(Debug, Default)]
pub struct MockExchange {
    responses: Mutex<HashMap<&'static str, Scripted>>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockExchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method` with `value` on every call
    pub fn with_response(self, method: &'static str, value: Value) -> Self {
        self.set_response(method, value);
        self
    }

    /// Fail `method` with `failure` on every call
    pub fn with_failure(self, method: &'static str, failure: MockFailure) -> Self {
        self.set_failure(method, failure);
        self
    }

    pub fn set_response(&self, method: &'static str, value: Value) {
        self.responses.lock().insert(method, Ok(value));
    }

    pub fn set_failure(&self, method: &'static str, failure: MockFailure) {
        self.responses.lock().insert(method, Err(failure));
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.method == method).count()
    }

    /// Arguments of the most recent call to `method`
    pub fn last_args(&self, method: &str) -> Option<Value> {
        self.calls.lock().iter().rev().find(|c| c.method == method).map(|c| c.args.clone())
    }

    fn answer(&self, method: &'static str, args: Value) -> ExchangeFuture<'_> {
        self.calls.lock().push(MockCall { method, args });

        let result = match self.responses.lock().get(method) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(failure)) => Err(ExchangeError::from(failure)),
            None => Err(ExchangeError::Transport(format!("no mock response for {method}"))),
        };

        Box::pin(future::ready(result))
    }
}

impl ExchangeClient for MockExchange {
    fn ping(&self) -> ExchangeFuture<'_> {
        self.answer("ping", Value::Null)
    }

    fn server_time(&self) -> ExchangeFuture<'_> {
        self.answer("server_time", Value::Null)
    }

    fn symbol_ticker(&self, symbol: String) -> ExchangeFuture<'_> {
        self.answer("symbol_ticker", json!({ "symbol": symbol }))
    }

    fn ticker_24h(&self, symbol: String) -> ExchangeFuture<'_> {
        self.answer("ticker_24h", json!({ "symbol": symbol }))
    }

    fn exchange_info(&self) -> ExchangeFuture<'_> {
        self.answer("exchange_info", Value::Null)
    }

    fn order_book(&self, symbol: String, limit: Option<u32>) -> ExchangeFuture<'_> {
        self.answer("order_book", json!({ "symbol": symbol, "limit": limit }))
    }

    fn trade_fee(&self, symbol: Option<String>) -> ExchangeFuture<'_> {
        self.answer("trade_fee", json!({ "symbol": symbol }))
    }

    fn all_orders(&self, symbol: String) -> ExchangeFuture<'_> {
        self.answer("all_orders", json!({ "symbol": symbol }))
    }

    fn create_order(&self, order: OrderRequest) -> ExchangeFuture<'_> {
        let args = serde_json::to_value(&order).unwrap_or(Value::Null);
        self.answer("create_order", args)
    }

    fn account(&self) -> ExchangeFuture<'_> {
        self.answer("account", Value::Null)
    }

    fn futures_account(&self) -> ExchangeFuture<'_> {
        self.answer("futures_account", Value::Null)
    }

    fn futures_positions(&self, symbol: Option<String>) -> ExchangeFuture<'_> {
        self.answer("futures_positions", json!({ "symbol": symbol }))
    }

    fn futures_income(&self, query: IncomeQuery) -> ExchangeFuture<'_> {
        let args = serde_json::to_value(&query).unwrap_or(Value::Null);
        self.answer("futures_income", args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_response_and_recording() {
        let mock = MockExchange::new().with_response("symbol_ticker", json!({ "symbol": "BTCUSDT", "price": "1.0" }));

        let value = mock.symbol_ticker("BTCUSDT".into()).await.unwrap();
        assert_eq!(value["price"], "1.0");
        assert_eq!(mock.call_count("symbol_ticker"), 1);
        assert_eq!(mock.last_args("symbol_ticker"), Some(json!({ "symbol": "BTCUSDT" })));
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let mock = MockExchange::new().with_failure("account", MockFailure::Api { code: -2015, message: "Invalid API-key".into() });

        let err = mock.account().await.unwrap_err();
        assert_eq!(err.code(), Some(-2015));
    }

    #[tokio::test]
    async fn test_unscripted_method_fails() {
        let mock = MockExchange::new();
        assert!(mock.ping().await.is_err());
        assert_eq!(mock.calls().len(), 1);
    }
}
