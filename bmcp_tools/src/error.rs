use std::fmt;

use bmcp_http::ExchangeError;
use bmcp_http::ExchangeErrorKind;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::validation::ValidationError;

/// Closed error taxonomy reported to tool callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad input, rejected before any network call
    ValidationError,
    /// Admission denied by the limiter
    RateLimitExceeded,
    /// Exchange rejected the call or could not be reached
    BinanceApiError,
    /// Exchange answered with something we could not interpret
    InternalError,
    /// Local fault in the tool itself
    ToolError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::RateLimitExceeded => "rate_limit_exceeded",
            ErrorKind::BinanceApiError => "binance_api_error",
            ErrorKind::InternalError => "internal_error",
            ErrorKind::ToolError => "tool_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const RATE_LIMIT_MESSAGE: &str = "API rate limit exceeded. Please try again later.";

/// Failure of a single tool call.
///
/// Messages and details are raw here; sanitization happens when the error is
/// rendered into an envelope.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message}")]
pub struct ToolError {
    pub kind: ErrorKind,
    pub message: String,
    pub details: Option<Map<String, Value>>,
}

impl ToolError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), details: None }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.get_or_insert_with(Map::new).insert(key.into(), value.into());
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
    }

    /// Admission denied for a call of the given weight
    pub fn rate_limited(weight: u32) -> Self {
        Self::new(ErrorKind::RateLimitExceeded, RATE_LIMIT_MESSAGE).with_detail("weight", weight)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalError, message)
    }

    pub fn tool(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ToolError, message)
    }

    /// Map an exchange failure, prefixing the message with what the tool was doing
    pub fn from_exchange(context: &str, err: &ExchangeError) -> Self {
        match err.kind() {
            ExchangeErrorKind::Api => {
                let error = Self::new(ErrorKind::BinanceApiError, format!("{context}: {err}"));
                match err.code() {
                    Some(code) => error.with_detail("code", code),
                    None => error,
                }
            }
            ExchangeErrorKind::Transport => Self::new(ErrorKind::BinanceApiError, format!("{context}: {err}")),
            ExchangeErrorKind::Decode => Self::internal(format!("{context}: {err}")),
            ExchangeErrorKind::Client => Self::tool(format!("Tool execution failed: {err}")),
        }
    }
}

impl From<ValidationError> for ToolError {
    fn from(err: ValidationError) -> Self {
        Self::validation(err.to_string())
    }
}

pub type ToolResult<T> = Result<T, ToolError>;
