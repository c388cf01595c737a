//! Newline-delimited JSON-RPC tool server
//!
//! One request per line on the reader, one response per line on the writer.
//! Requests are handled strictly in arrival order; notifications get no
//! reply. The loop ends on EOF or when shutdown is requested.

use std::io;
use std::sync::Arc;

use bmcp_http::ExchangeClient;
use bmcp_ratelimit::LimiterSet;
use bmcp_tools::Args;
use bmcp_tools::SymbolCache;
use bmcp_tools::SymbolValidator;
use bmcp_tools::ToolContext;
use bmcp_tools::ToolRegistry;
use bmcp_tools::tools::server_info::SERVER_NAME;
use serde_json::Value;
use serde_json::json;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tokio::sync::watch;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::config::ServerConfig;
use crate::protocol::JSONRPC_VERSION;
use crate::protocol::Request;
use crate::protocol::Response;
use crate::protocol::RpcError;
use crate::protocol::negotiate_version;
use crate::shutdown_handler;

pub const INSTRUCTIONS: &str = "Access to Binance market data, spot account and order tools, and USD-M futures account tools. \
Every tool returns an envelope with `success`; failures carry an error `type` of validation_error, rate_limit_exceeded, \
binance_api_error, internal_error or tool_error. Calls are charged against Binance request weights; use get_server_info to \
inspect the remaining budget without spending any.";

pub struct McpServer {
    registry: ToolRegistry,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Wire limiters, symbol validation and tools for `client`
    pub fn from_config(config: &ServerConfig, client: Arc<dyn ExchangeClient>) -> Self {
        let limiters = Arc::new(LimiterSet::new(&config.limiter_config()));
        let symbols = SymbolValidator::new(config.mcp_validate_symbol_exists, SymbolCache::new(config.symbol_cache_ttl()));

        let context = ToolContext { client, symbols, limiters, testnet: config.testnet };

        Self::new(ToolRegistry::new(context))
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Serve until EOF on `reader` or shutdown
    pub async fn run<R, W>(&self, reader: R, mut writer: W, mut shutdown: watch::Receiver<bool>) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        loop {
            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = shutdown_handler::requested(&mut shutdown) => {
                    info!("Shutdown requested, stopping server");
                    break;
                }
            };

            let Some(line) = line else {
                info!("Input closed, stopping server");
                break;
            };

            if let Some(response) = self.handle_line(&line).await {
                writer.write_all(response.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        Ok(())
    }

    /// Handle one raw line, returning the serialized response if one is due
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        if line.trim().is_empty() {
            return None;
        }

        let response = match serde_json::from_str::<Value>(line) {
            Ok(value) => self.handle_value(value).await?,
            Err(err) => Response::failure(Value::Null, RpcError::parse_error(err)),
        };

        match serde_json::to_string(&response) {
            Ok(text) => Some(text),
            Err(err) => {
                warn!(%err, "failed to serialize response");
                None
            }
        }
    }

    pub async fn handle_value(&self, value: Value) -> Option<Response> {
        let id = value.get("id").cloned().unwrap_or(Value::Null);

        if !value.is_object() {
            return Some(Response::failure(Value::Null, RpcError::invalid_request("expected a JSON object")));
        }

        let request: Request = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(err) => return Some(Response::failure(id, RpcError::invalid_request(err))),
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(Response::failure(id, RpcError::invalid_request("jsonrpc must be \"2.0\"")));
        }

        self.handle_request(request).await
    }

    pub async fn handle_request(&self, request: Request) -> Option<Response> {
        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "notification received");
            return None;
        };

        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.initialize(request.params.as_ref())),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.registry.list() })),
            "tools/call" => self.call_tool(request.params).await,
            other => Err(RpcError::method_not_found(other)),
        };

        Some(match outcome {
            Ok(result) => Response::success(id, result),
            Err(error) => Response::failure(id, error),
        })
    }

    fn initialize(&self, params: Option<&Value>) -> Value {
        let requested = params.and_then(|p| p.get("protocolVersion")).and_then(Value::as_str);
        let version = negotiate_version(requested);

        info!(requested = ?requested, version, "client initialized");

        json!({
            "protocolVersion": version,
            "capabilities": { "tools": { "listChanged": false } },
            "serverInfo": { "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") },
            "instructions": INSTRUCTIONS,
        })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, RpcError> {
        let Some(Value::Object(mut params)) = params else {
            return Err(RpcError::invalid_params("expected an object with 'name'"));
        };

        let name = match params.remove("name") {
            Some(Value::String(name)) => name,
            _ => return Err(RpcError::invalid_params("'name' must be a string")),
        };

        let arguments: Args = match params.remove("arguments") {
            None | Some(Value::Null) => Args::new(),
            Some(Value::Object(arguments)) => arguments,
            Some(_) => return Err(RpcError::invalid_params("'arguments' must be an object")),
        };

        let envelope = self.registry.invoke(&name, arguments).await;
        let structured = envelope.to_value();
        let text = serde_json::to_string(&structured).map_err(RpcError::internal)?;

        Ok(json!({
            "content": [{ "type": "text", "text": text }],
            "structuredContent": structured,
            "isError": !envelope.is_success(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use bmcp_http::testing::MockExchange;

    use super::*;

    fn server() -> McpServer {
        let config = ServerConfig::from_vars([("BINANCE_API_KEY", "k"), ("BINANCE_API_SECRET", "s")].iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()).unwrap();
        McpServer::from_config(&config, Arc::new(MockExchange::new()))
    }

    #[tokio::test]
    async fn test_blank_line_ignored() {
        assert!(server().handle_line("   ").await.is_none());
    }

    #[tokio::test]
    async fn test_parse_error() {
        let response: Value = serde_json::from_str(&server().handle_line("{not json").await.unwrap()).unwrap();
        assert_eq!(response["error"]["code"], -32700);
        assert!(response["id"].is_null());
    }

    #[tokio::test]
    async fn test_wrong_version_is_invalid_request() {
        let response = server().handle_value(json!({ "jsonrpc": "1.0", "id": 3, "method": "ping" })).await.unwrap();
        assert_eq!(response.error.unwrap().code, -32600);
        assert_eq!(response.id, json!(3));
    }

    #[tokio::test]
    async fn test_batch_rejected() {
        let response = server().handle_value(json!([{ "jsonrpc": "2.0", "id": 1, "method": "ping" }])).await.unwrap();
        assert_eq!(response.error.unwrap().code, -32600);
    }
}
