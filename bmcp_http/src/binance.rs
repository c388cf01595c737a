use std::sync::Arc;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::client::HttpClient;
use crate::client::HttpClientConfig;
use crate::errors::ExchangeError;
use crate::errors::Result;
use crate::exchange::ExchangeClient;
use crate::exchange::ExchangeFuture;
use crate::signer::RequestSigner;
use crate::types::IncomeQuery;
use crate::types::OrderRequest;

const SPOT_BASE_URL: &str = "https://api.binance.com";
const SPOT_TESTNET_URL: &str = "https://testnet.binance.vision";
const FUTURES_BASE_URL: &str = "https://fapi.binance.com";
const FUTURES_TESTNET_URL: &str = "https://testnet.binancefuture.com";

const DEFAULT_RECV_WINDOW_MS: u64 = 5000;

/// Which REST host a request goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Market {
    Spot,
    Futures,
}

/// Binance REST client for spot, SAPI and USD-M futures endpoints
pub struct BinanceClient {
    http: HttpClient,
    spot_url: String,
    futures_url: String,
    testnet: bool,
    api_key: Option<String>,
    signer: Option<Arc<dyn RequestSigner>>,
    recv_window: u64,
}

impl BinanceClient {
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> BinanceClientBuilder {
        BinanceClientBuilder::default()
    }

    pub fn is_testnet(&self) -> bool {
        self.testnet
    }

    /// True when signed endpoints can be called
    pub fn can_sign(&self) -> bool {
        self.api_key.is_some() && self.signer.is_some()
    }

    pub fn spot_url(&self) -> &str {
        &self.spot_url
    }

    pub fn futures_url(&self) -> &str {
        &self.futures_url
    }

    fn url(&self, market: Market, path: &str) -> String {
        match market {
            Market::Spot => format!("{}{}", self.spot_url, path),
            Market::Futures => format!("{}{}", self.futures_url, path),
        }
    }

    async fn public_get(&self, market: Market, path: &'static str, params: Vec<(&'static str, String)>) -> Result<Value> {
        debug!(path, "public request");
        let request = self.http.get(&self.url(market, path)).query(&params);
        self.http.send_json(request).await
    }

    async fn signed(&self, method: Method, market: Market, path: &'static str, params: Vec<(&'static str, String)>) -> Result<Value> {
        let (Some(api_key), Some(signer)) = (&self.api_key, &self.signer) else {
            return Err(ExchangeError::SignerMissing { endpoint: path });
        };

        debug!(path, %method, "signed request");

        let query = signed_query(&params, timestamp_ms(), self.recv_window, signer.as_ref());
        let url = format!("{}?{}", self.url(market, path), query);

        let request = match method {
            Method::POST => self.http.post(&url),
            _ => self.http.get(&url),
        };

        self.http.send_json(request.header("X-MBX-APIKEY", api_key)).await
    }
}

/// Encode `params` plus `timestamp`/`recvWindow` and append the signature
/// computed over exactly that string.
pub fn signed_query(params: &[(&str, String)], timestamp: u64, recv_window: u64, signer: &dyn RequestSigner) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.append_pair("timestamp", &timestamp.to_string());
    serializer.append_pair("recvWindow", &recv_window.to_string());

    let mut query = serializer.finish();
    let signature = signer.sign(&query);
    query.push_str("&signature=");
    query.push_str(&signature);
    query
}

fn timestamp_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or_default()
}

fn symbol_param(symbol: Option<String>) -> Vec<(&'static str, String)> {
    symbol.map(|s| vec![("symbol", s)]).unwrap_or_default()
}

impl ExchangeClient for BinanceClient {
    fn ping(&self) -> ExchangeFuture<'_> {
        Box::pin(self.public_get(Market::Spot, "/api/v3/ping", Vec::new()))
    }

    fn server_time(&self) -> ExchangeFuture<'_> {
        Box::pin(self.public_get(Market::Spot, "/api/v3/time", Vec::new()))
    }

    fn symbol_ticker(&self, symbol: String) -> ExchangeFuture<'_> {
        Box::pin(self.public_get(Market::Spot, "/api/v3/ticker/price", vec![("symbol", symbol)]))
    }

    fn ticker_24h(&self, symbol: String) -> ExchangeFuture<'_> {
        Box::pin(self.public_get(Market::Spot, "/api/v3/ticker/24hr", vec![("symbol", symbol)]))
    }

    fn exchange_info(&self) -> ExchangeFuture<'_> {
        Box::pin(self.public_get(Market::Spot, "/api/v3/exchangeInfo", Vec::new()))
    }

    fn order_book(&self, symbol: String, limit: Option<u32>) -> ExchangeFuture<'_> {
        let mut params = vec![("symbol", symbol)];
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }
        Box::pin(self.public_get(Market::Spot, "/api/v3/depth", params))
    }

    fn trade_fee(&self, symbol: Option<String>) -> ExchangeFuture<'_> {
        Box::pin(self.signed(Method::GET, Market::Spot, "/sapi/v1/asset/tradeFee", symbol_param(symbol)))
    }

    fn all_orders(&self, symbol: String) -> ExchangeFuture<'_> {
        Box::pin(self.signed(Method::GET, Market::Spot, "/api/v3/allOrders", vec![("symbol", symbol)]))
    }

    fn create_order(&self, order: OrderRequest) -> ExchangeFuture<'_> {
        Box::pin(self.signed(Method::POST, Market::Spot, "/api/v3/order", order.params()))
    }

    fn account(&self) -> ExchangeFuture<'_> {
        Box::pin(self.signed(Method::GET, Market::Spot, "/api/v3/account", Vec::new()))
    }

    fn futures_account(&self) -> ExchangeFuture<'_> {
        Box::pin(self.signed(Method::GET, Market::Futures, "/fapi/v2/account", Vec::new()))
    }

    fn futures_positions(&self, symbol: Option<String>) -> ExchangeFuture<'_> {
        Box::pin(self.signed(Method::GET, Market::Futures, "/fapi/v2/positionRisk", symbol_param(symbol)))
    }

    fn futures_income(&self, query: IncomeQuery) -> ExchangeFuture<'_> {
        Box::pin(self.signed(Method::GET, Market::Futures, "/fapi/v1/income", query.params()))
    }
}

/// Builder for configuring the Binance client
pub struct BinanceClientBuilder {
    http_config: HttpClientConfig,
    testnet: bool,
    spot_url: Option<String>,
    futures_url: Option<String>,
    api_key: Option<String>,
    signer: Option<Arc<dyn RequestSigner>>,
    recv_window: u64,
}

impl Default for BinanceClientBuilder {
    fn default() -> Self {
        Self {
            http_config: HttpClientConfig::default(),
            testnet: false,
            spot_url: None,
            futures_url: None,
            api_key: None,
            signer: None,
            recv_window: DEFAULT_RECV_WINDOW_MS,
        }
    }
}

impl BinanceClientBuilder {
    /// Route spot and futures calls to the testnet hosts
    pub fn testnet(mut self, testnet: bool) -> Self {
        self.testnet = testnet;
        self
    }

    /// Override the spot host (e.g. a local mock server)
    pub fn spot_url(mut self, url: impl Into<String>) -> Self {
        self.spot_url = Some(url.into());
        self
    }

    pub fn futures_url(mut self, url: impl Into<String>) -> Self {
        self.futures_url = Some(url.into());
        self
    }

    pub fn http_config(mut self, config: HttpClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// API key sent as `X-MBX-APIKEY` on signed endpoints
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn recv_window(mut self, millis: u64) -> Self {
        self.recv_window = millis;
        self
    }

    pub fn build(self) -> Result<BinanceClient> {
        let http = HttpClient::with_config(self.http_config)?;

        let (spot_default, futures_default) =
            if self.testnet { (SPOT_TESTNET_URL, FUTURES_TESTNET_URL) } else { (SPOT_BASE_URL, FUTURES_BASE_URL) };

        Ok(BinanceClient {
            http,
            spot_url: self.spot_url.unwrap_or_else(|| spot_default.to_string()),
            futures_url: self.futures_url.unwrap_or_else(|| futures_default.to_string()),
            testnet: self.testnet,
            api_key: self.api_key,
            signer: self.signer,
            recv_window: self.recv_window,
        })
    }
}
