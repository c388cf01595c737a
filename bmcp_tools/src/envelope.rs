use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::error::ErrorKind;
use crate::error::ToolError;
use crate::error::ToolResult;
use crate::sanitize::sanitize_details;
use crate::sanitize::sanitize_message;
use crate::time_utils::unix_timestamp_ms;

/// Payload produced by a tool handler before it is wrapped
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub data: Value,
    pub metadata: Option<Map<String, Value>>,
}

impl ToolOutput {
    pub fn new(data: Value) -> Self {
        Self { data, metadata: None }
    }

    /// Append a metadata entry; insertion order is kept
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.get_or_insert_with(Map::new).insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessEnvelope {
    pub success: bool,
    pub data: Value,
    pub timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
    pub timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
}

/// Uniform response returned by every tool call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    Success(SuccessEnvelope),
    Error(ErrorEnvelope),
}

impl Envelope {
    pub fn success(output: ToolOutput) -> Self {
        Envelope::Success(SuccessEnvelope {
            success: true,
            data: output.data,
            timestamp: unix_timestamp_ms(),
            metadata: output.metadata.filter(|m| !m.is_empty()),
        })
    }

    /// Error envelope with message and details sanitized
    pub fn error(err: &ToolError) -> Self {
        Envelope::Error(ErrorEnvelope {
            success: false,
            error: ErrorBody {
                kind: err.kind,
                message: sanitize_message(&err.message),
                timestamp: unix_timestamp_ms(),
                details: err.details.as_ref().filter(|d| !d.is_empty()).map(sanitize_details),
            },
        })
    }

    pub fn from_result(result: ToolResult<ToolOutput>) -> Self {
        match result {
            Ok(output) => Self::success(output),
            Err(err) => Self::error(&err),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Envelope::Success(_) => None,
            Envelope::Error(envelope) => Some(envelope.error.kind),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
