use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bmcp_http::ExchangeClient;
use bmcp_ratelimit::ApiSurface;
use bmcp_ratelimit::LimiterSet;
use bmcp_ratelimit::RateLimiter;
use serde_json::Value;
use serde_json::json;
use tracing::debug;
use tracing::error;
use tracing::warn;

use crate::args::Args;
use crate::dispatch::Cost;
use crate::dispatch::RateLimitedDispatch;
use crate::envelope::Envelope;
use crate::envelope::ToolOutput;
use crate::error::ErrorKind;
use crate::error::ToolError;
use crate::error::ToolResult;
use crate::sanitize::sanitize_message;
use crate::symbol_cache::SymbolValidator;
use crate::tools;

pub type ToolFuture<'a> = Pin<Box<dyn Future<Output = ToolResult<ToolOutput>> + Send + 'a>>;

pub type ToolHandler = for<'a> fn(&'a ToolContext, Args) -> ToolFuture<'a>;

/// Everything a tool handler may use
pub struct ToolContext {
    pub client: Arc<dyn ExchangeClient>,
    pub symbols: SymbolValidator,
    pub limiters: Arc<LimiterSet>,
    pub testnet: bool,
}

/// Static description of one tool
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
    /// Limiter the call is charged against, `None` for local-only tools
    pub surface: Option<ApiSurface>,
    pub cost: Cost,
    pub handler: ToolHandler,
}

impl ToolSpec {
    /// Entry as listed to protocol clients
    pub fn descriptor(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema,
        })
    }
}

impl std::fmt::Debug for ToolSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSpec").field("name", &self.name).field("surface", &self.surface).field("cost", &self.cost).finish()
    }
}

/// Named tools with one admission gate per API surface
pub struct ToolRegistry {
    context: ToolContext,
    tools: Vec<ToolSpec>,
    index: HashMap<&'static str, usize>,
    gates: HashMap<ApiSurface, RateLimitedDispatch>,
}

impl ToolRegistry {
    /// Registry with every built-in tool
    pub fn new(context: ToolContext) -> Self {
        Self::with_tools(context, tools::builtin())
    }

    pub fn with_tools(context: ToolContext, tools: Vec<ToolSpec>) -> Self {
        let index = tools.iter().enumerate().map(|(i, spec)| (spec.name, i)).collect();

        let gates = ApiSurface::ALL
            .iter()
            .map(|&surface| {
                let limiter: Arc<dyn RateLimiter> = context.limiters.get(surface).clone();
                (surface, RateLimitedDispatch::new(limiter))
            })
            .collect();

        Self { context, tools, index, gates }
    }

    pub fn context(&self) -> &ToolContext {
        &self.context
    }

    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|spec| spec.name).collect()
    }

    /// Descriptors in registration order
    pub fn list(&self) -> Vec<Value> {
        self.tools.iter().map(ToolSpec::descriptor).collect()
    }

    /// Run a tool. Every outcome, including an unknown name, is an envelope.
    pub async fn invoke(&self, name: &str, args: Args) -> Envelope {
        let Some(spec) = self.get(name) else {
            return Envelope::error(&ToolError::tool(format!("Unknown tool: {name}")));
        };

        debug!(tool = name, "invoking tool");

        let result = match spec.surface.and_then(|surface| self.gates.get(&surface)) {
            Some(gate) => gate.call_async(&spec.cost, args, |args| (spec.handler)(&self.context, args)).await,
            None => (spec.handler)(&self.context, args).await,
        };

        if let Err(err) = &result {
            match err.kind {
                ErrorKind::RateLimitExceeded => {
                    let weight = err.details.as_ref().and_then(|d| d.get("weight")).and_then(Value::as_u64).unwrap_or_default();
                    let surface = spec.surface.map(|s| s.as_str()).unwrap_or("none");
                    warn!(tool = name, surface, weight, "rate limit exceeded");
                }
                ErrorKind::ValidationError => {
                    debug!(tool = name, message = %err.message, "validation failed");
                }
                _ => {
                    error!(tool = name, kind = %err.kind, message = %sanitize_message(&err.message), "tool call failed");
                }
            }
        }

        Envelope::from_result(result)
    }
}
