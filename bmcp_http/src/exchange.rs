use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::errors::Result;
use crate::types::IncomeQuery;
use crate::types::OrderRequest;

/// Boxed response future returned by every exchange call
pub type ExchangeFuture<'a> = Pin<Box<dyn Future<Output = Result<Value>> + Send + 'a>>;

/// Exchange operations the tools are built on
///
/// Responses are the exchange's JSON payloads, passed through untouched.
/// Implementations own timeouts and cancellation; callers never retry.
pub trait ExchangeClient: Send + Sync {
    /// Test connectivity to the REST API
    fn ping(&self) -> ExchangeFuture<'_>;

    /// Exchange server time
    fn server_time(&self) -> ExchangeFuture<'_>;

    /// Latest price for a symbol
    fn symbol_ticker(&self, symbol: String) -> ExchangeFuture<'_>;

    /// 24-hour rolling statistics for a symbol
    fn ticker_24h(&self, symbol: String) -> ExchangeFuture<'_>;

    /// Trading rules and the full instrument list
    fn exchange_info(&self) -> ExchangeFuture<'_>;

    /// Depth snapshot, exchange default depth when `limit` is `None`
    fn order_book(&self, symbol: String, limit: Option<u32>) -> ExchangeFuture<'_>;

    /// Maker/taker commission rates, all symbols when `symbol` is `None`
    fn trade_fee(&self, symbol: Option<String>) -> ExchangeFuture<'_>;

    /// Every order on the account for a symbol
    fn all_orders(&self, symbol: String) -> ExchangeFuture<'_>;

    /// Place a new spot order
    fn create_order(&self, order: OrderRequest) -> ExchangeFuture<'_>;

    /// Spot account balances and permissions
    fn account(&self) -> ExchangeFuture<'_>;

    /// USD-M futures account summary
    fn futures_account(&self) -> ExchangeFuture<'_>;

    /// USD-M futures position risk
    fn futures_positions(&self, symbol: Option<String>) -> ExchangeFuture<'_>;

    /// USD-M futures income history
    fn futures_income(&self, query: IncomeQuery) -> ExchangeFuture<'_>;
}
