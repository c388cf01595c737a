use std::fmt;

/// Result type for rate limiting operations
pub type Result<T> = std::result::Result<T, RateLimitError>;

/// Errors that can occur during rate limiting operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitError {
    /// Admission denied, not enough tokens for the requested weight
    Exceeded { weight: u32 },

    /// Invalid configuration
    InvalidConfig(&'static str),
}

impl RateLimitError {
    /// Weight that was refused, if this is an admission denial
    pub fn weight(&self) -> Option<u32> {
        match self {
            RateLimitError::Exceeded { weight } => Some(*weight),
            RateLimitError::InvalidConfig(_) => None,
        }
    }
}

impl fmt::Display for RateLimitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateLimitError::Exceeded { weight } => write!(f, "Rate limit exceeded (weight {})", weight),
            RateLimitError::InvalidConfig(msg) => write!(f, "Invalid rate limiter configuration: {}", msg),
        }
    }
}

impl std::error::Error for RateLimitError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(RateLimitError::Exceeded { weight: 5 }.to_string(), "Rate limit exceeded (weight 5)");
        assert_eq!(RateLimitError::InvalidConfig("zero").to_string(), "Invalid rate limiter configuration: zero");
    }

    #[test]
    fn test_weight() {
        assert_eq!(RateLimitError::Exceeded { weight: 7 }.weight(), Some(7));
        assert_eq!(RateLimitError::InvalidConfig("x").weight(), None);
    }
}
