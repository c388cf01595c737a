//! Input normalization and bounds checks.
//!
//! Every validator either returns the normalized value or a
//! `ValidationError`; nothing here touches the network.

use bmcp_http::OrderSide;
use bmcp_http::OrderType;
use thiserror::Error;

/// Absolute ceiling for quantities and prices
pub const MAX_SANE_VALUE: f64 = 1e15;

/// Default upper bound for pagination and depth limits
pub const DEFAULT_MAX_LIMIT: i64 = 5000;

const MIN_SYMBOL_LEN: usize = 3;
const MAX_SYMBOL_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Normalize a trading pair symbol to its uppercase alphanumeric form
pub fn validate_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(ValidationError::new("Symbol must be a non-empty string"));
    }

    let len = symbol.chars().count();
    if len < MIN_SYMBOL_LEN {
        return Err(ValidationError::new("Symbol must be at least 3 characters long"));
    }
    if len > MAX_SYMBOL_LEN {
        return Err(ValidationError::new("Symbol must be at most 20 characters long"));
    }

    let cleaned: String = symbol.chars().filter(char::is_ascii_alphanumeric).collect();
    if cleaned.len() < MIN_SYMBOL_LEN {
        return Err(ValidationError::new("Symbol must be at least 3 characters long after removing special characters"));
    }

    if cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(ValidationError::new("Symbol cannot start with a number or be purely numeric"));
    }

    Ok(cleaned)
}

pub fn validate_side(side: &str) -> Result<OrderSide> {
    match side.trim().to_uppercase().as_str() {
        "BUY" => Ok(OrderSide::Buy),
        "SELL" => Ok(OrderSide::Sell),
        "" => Err(ValidationError::new("Order side must be a non-empty string")),
        _ => Err(ValidationError::new("Invalid order side. Must be 'BUY' or 'SELL'.")),
    }
}

pub fn validate_order_type(order_type: &str) -> Result<OrderType> {
    let normalized = order_type.trim().to_uppercase();
    if normalized.is_empty() {
        return Err(ValidationError::new("Order type must be a non-empty string"));
    }

    OrderType::ALL.iter().copied().find(|t| t.as_str() == normalized).ok_or_else(|| {
        let valid: Vec<&str> = OrderType::ALL.iter().map(|t| t.as_str()).collect();
        ValidationError::new(format!("Invalid order type. Must be one of: {}", valid.join(", ")))
    })
}

/// Check `min < value <= max` and the absolute sanity bound
pub fn validate_positive_number(value: f64, field: &str, min: f64, max: Option<f64>) -> Result<f64> {
    if !value.is_finite() {
        return Err(ValidationError::new(format!("{field} must be a number")));
    }
    if value <= min {
        return Err(ValidationError::new(format!("{field} must be greater than {min}")));
    }
    if let Some(max) = max
        && value > max
    {
        return Err(ValidationError::new(format!("{field} must be less than or equal to {max}")));
    }
    if value > MAX_SANE_VALUE {
        return Err(ValidationError::new(format!("{field} value is too large")));
    }
    Ok(value)
}

/// Bound a pagination or depth limit to `1..=max`
pub fn validate_limit(limit: Option<i64>, max: i64) -> Result<Option<u32>> {
    let Some(limit) = limit else {
        return Ok(None);
    };

    if limit <= 0 {
        return Err(ValidationError::new("Limit must be greater than 0"));
    }
    if limit > max {
        return Err(ValidationError::new(format!("Limit must be less than or equal to {max}")));
    }

    u32::try_from(limit).map(Some).map_err(|_| ValidationError::new("Limit is out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_normalization() {
        assert_eq!(validate_symbol("BTCUSDT").unwrap(), "BTCUSDT");
        assert_eq!(validate_symbol("btcusdt ").unwrap(), "BTCUSDT");
        assert_eq!(validate_symbol(" eth-usdt").unwrap(), "ETHUSDT");
    }

    #[test]
    fn test_symbol_rejections() {
        for bad in ["", "   ", "BT", "123ABC", "123$%", "1INCHUSDT", "A$B%", "ABCDEFGHIJKLMNOPQRSTUV"] {
            assert!(validate_symbol(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_symbol_rejection_messages() {
        assert_eq!(validate_symbol("BT").unwrap_err().message(), "Symbol must be at least 3 characters long");
        assert_eq!(validate_symbol("123ABC").unwrap_err().message(), "Symbol cannot start with a number or be purely numeric");
    }

    #[test]
    fn test_side() {
        assert_eq!(validate_side("buy").unwrap(), OrderSide::Buy);
        assert_eq!(validate_side(" Sell ").unwrap(), OrderSide::Sell);
        assert!(validate_side("hold").is_err());
        assert!(validate_side("").is_err());
    }

    #[test]
    fn test_order_type_lists_valid_set() {
        assert_eq!(validate_order_type("stop_loss_limit").unwrap(), OrderType::StopLossLimit);

        let err = validate_order_type("TRAILING").unwrap_err();
        assert_eq!(
            err.message(),
            "Invalid order type. Must be one of: LIMIT, MARKET, STOP_LOSS, STOP_LOSS_LIMIT, TAKE_PROFIT, TAKE_PROFIT_LIMIT, LIMIT_MAKER"
        );
    }

    #[test]
    fn test_positive_number_bounds() {
        assert_eq!(validate_positive_number(0.5, "quantity", 0.0, None).unwrap(), 0.5);
        assert!(validate_positive_number(0.0, "quantity", 0.0, None).is_err());
        assert!(validate_positive_number(-1.0, "quantity", 0.0, None).is_err());
        assert!(validate_positive_number(11.0, "price", 0.0, Some(10.0)).is_err());
        assert!(validate_positive_number(2e15, "price", 0.0, None).is_err());
        assert!(validate_positive_number(f64::NAN, "price", 0.0, None).is_err());
        assert!(validate_positive_number(f64::INFINITY, "price", 0.0, None).is_err());
    }

    #[test]
    fn test_positive_number_messages() {
        let err = validate_positive_number(0.0, "quantity", 0.0, None).unwrap_err();
        assert_eq!(err.message(), "quantity must be greater than 0");

        let err = validate_positive_number(2e15, "price", 0.0, None).unwrap_err();
        assert_eq!(err.message(), "price value is too large");
    }

    #[test]
    fn test_limit() {
        assert_eq!(validate_limit(None, DEFAULT_MAX_LIMIT).unwrap(), None);
        assert_eq!(validate_limit(Some(100), DEFAULT_MAX_LIMIT).unwrap(), Some(100));
        assert_eq!(validate_limit(Some(5000), DEFAULT_MAX_LIMIT).unwrap(), Some(5000));
        assert!(validate_limit(Some(0), DEFAULT_MAX_LIMIT).is_err());
        assert!(validate_limit(Some(-1), DEFAULT_MAX_LIMIT).is_err());
        assert!(validate_limit(Some(10_000), DEFAULT_MAX_LIMIT).is_err());
        assert!(validate_limit(Some(1001), 1000).is_err());
    }
}
