use std::time::Duration;

use reqwest::Client;
use reqwest::ClientBuilder;
use reqwest::RequestBuilder;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::errors::ExchangeError;
use crate::errors::Result;

/// Configuration for the pooled HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Maximum idle connections per host (default: 10)
    pub pool_max_idle_per_host: usize,

    /// Idle timeout for pooled connections (default: 90s)
    pub pool_idle_timeout: Duration,

    /// Connection establishment timeout (default: 10s)
    pub connect_timeout: Duration,

    /// Total request timeout (default: 30s)
    pub request_timeout: Duration,

    /// TCP keepalive interval (default: 60s)
    pub tcp_keepalive: Duration,

    pub tcp_nodelay: bool,

    /// HTTP/2 keep-alive interval (default: 30s)
    pub http2_keep_alive_interval: Duration,

    /// Enable Hickory DNS for async resolution (default: true)
    pub hickory_dns: bool,

    /// `User-Agent` header sent with every request
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: 10,
            pool_idle_timeout: Duration::from_secs(90),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            tcp_keepalive: Duration::from_secs(60),
            tcp_nodelay: true,
            http2_keep_alive_interval: Duration::from_secs(30),
            hickory_dns: true,
            user_agent: concat!("binance-mcp-server/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpClientConfig {
    /// Shorter timeouts, used for the startup connectivity probe
    pub fn fast_fail() -> Self {
        Self { connect_timeout: Duration::from_secs(5), request_timeout: Duration::from_secs(10), ..Default::default() }
    }
}

/// Thin wrapper over a pooled `reqwest::Client` that turns exchange
/// responses into JSON values or `ExchangeError`s.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout)
            .tcp_nodelay(config.tcp_nodelay)
            .tcp_keepalive(Some(config.tcp_keepalive))
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .use_rustls_tls()
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .http2_keep_alive_interval(Some(config.http2_keep_alive_interval))
            .gzip(true)
            .brotli(true);

        if config.hickory_dns {
            builder = builder.hickory_dns(true);
        }

        let client = builder.build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }

    /// Send a prepared request and decode the JSON body
    pub async fn send_json(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        debug!(status = status.as_u16(), bytes = bytes.len(), "exchange response");

        if !status.is_success() {
            return Err(parse_error_body(status, &bytes));
        }

        if bytes.is_empty() {
            return Ok(Value::Object(Default::default()));
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    code: i64,
    msg: String,
}

/// Map a non-2xx response body to an error.
///
/// Binance answers rejections with `{"code": -1121, "msg": "..."}`; anything
/// else is reported by status alone.
pub fn parse_error_body(status: StatusCode, body: &[u8]) -> ExchangeError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(error) => ExchangeError::Api { code: error.code, message: error.msg },
        Err(_) => ExchangeError::InvalidResponse(format!("HTTP {}", status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpClientConfig::default();
        assert_eq!(config.pool_max_idle_per_host, 10);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.tcp_nodelay);
        assert!(config.user_agent.starts_with("binance-mcp-server/"));
    }

    #[test]
    fn test_fast_fail_config() {
        let config = HttpClientConfig::fast_fail();
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.hickory_dns);
    }

    #[test]
    fn test_client_creation() {
        assert!(HttpClient::new().is_ok());
    }

    #[test]
    fn test_parse_api_error_body() {
        let err = parse_error_body(StatusCode::BAD_REQUEST, br#"{"code":-1121,"msg":"Invalid symbol."}"#);
        assert!(matches!(err, ExchangeError::Api { code: -1121, ref message } if message == "Invalid symbol."));
    }

    #[test]
    fn test_parse_non_json_error_body() {
        let err = parse_error_body(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>");
        assert_eq!(err.to_string(), "Invalid response: HTTP 502 Bad Gateway");
    }
}
