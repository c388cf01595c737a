use thiserror::Error;

/// Failure reported by the exchange client
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// The exchange rejected the request with a machine-readable code
    #[error("APIError(code={code}): {message}")]
    Api { code: i64, message: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No request signer configured for signed endpoint {endpoint}")]
    SignerMissing { endpoint: &'static str },
}

/// Coarse classification used when mapping failures for callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeErrorKind {
    /// Rejected by the exchange, carries a code
    Api,
    /// Request never produced a usable exchange answer
    Transport,
    /// Answer arrived but could not be understood
    Decode,
    /// Local client setup is incomplete
    Client,
}

impl ExchangeError {
    pub fn kind(&self) -> ExchangeErrorKind {
        match self {
            ExchangeError::Api { .. } => ExchangeErrorKind::Api,
            ExchangeError::Request(_) | ExchangeError::Transport(_) | ExchangeError::InvalidResponse(_) => ExchangeErrorKind::Transport,
            ExchangeError::Decode(_) => ExchangeErrorKind::Decode,
            ExchangeError::SignerMissing { .. } => ExchangeErrorKind::Client,
        }
    }

    /// Exchange error code, only present for API-level rejections
    pub fn code(&self) -> Option<i64> {
        match self {
            ExchangeError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExchangeError>;
