//! Typed access to JSON tool arguments.

use serde_json::Map;
use serde_json::Value;

use crate::validation::Result;
use crate::validation::ValidationError;

/// Arguments of a single tool call
pub type Args = Map<String, Value>;

fn present<'a>(args: &'a Args, key: &str) -> Option<&'a Value> {
    args.get(key).filter(|v| !v.is_null())
}

pub fn required_str<'a>(args: &'a Args, key: &str) -> Result<&'a str> {
    match present(args, key) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(ValidationError::new(format!("{key} must be a string"))),
        None => Err(ValidationError::new(format!("{key} is required"))),
    }
}

/// Absent, null and blank strings all read as `None`
pub fn optional_str<'a>(args: &'a Args, key: &str) -> Result<Option<&'a str>> {
    match present(args, key) {
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(ValidationError::new(format!("{key} must be a string"))),
        None => Ok(None),
    }
}

fn number(value: &Value, key: &str) -> Result<f64> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| ValidationError::new(format!("{key} must be a number"))),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| ValidationError::new(format!("{key} must be a number"))),
        _ => Err(ValidationError::new(format!("{key} must be a number"))),
    }
}

/// Numbers and numeric strings are accepted
pub fn required_f64(args: &Args, key: &str) -> Result<f64> {
    match present(args, key) {
        Some(value) => number(value, key),
        None => Err(ValidationError::new(format!("{key} is required"))),
    }
}

pub fn optional_f64(args: &Args, key: &str) -> Result<Option<f64>> {
    present(args, key).map(|value| number(value, key)).transpose()
}

/// Integer limit; whole floats like `10.0` pass, `2.5` and strings do not
pub fn optional_limit(args: &Args, key: &str) -> Result<Option<i64>> {
    let Some(value) = present(args, key) else {
        return Ok(None);
    };

    let as_int = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64).map(|f| f as i64)),
        _ => None,
    };

    as_int.map(Some).ok_or_else(|| ValidationError::new("Limit must be an integer"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn args(value: Value) -> Args {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_required_str() {
        let a = args(json!({ "symbol": "BTCUSDT", "n": 1 }));
        assert_eq!(required_str(&a, "symbol").unwrap(), "BTCUSDT");
        assert_eq!(required_str(&a, "n").unwrap_err().message(), "n must be a string");
        assert_eq!(required_str(&a, "side").unwrap_err().message(), "side is required");
    }

    #[test]
    fn test_optional_str_blank_is_none() {
        let a = args(json!({ "symbol": "", "other": null, "x": "ETHUSDT" }));
        assert_eq!(optional_str(&a, "symbol").unwrap(), None);
        assert_eq!(optional_str(&a, "other").unwrap(), None);
        assert_eq!(optional_str(&a, "missing").unwrap(), None);
        assert_eq!(optional_str(&a, "x").unwrap(), Some("ETHUSDT"));
    }

    #[test]
    fn test_numbers() {
        let a = args(json!({ "q": 0.5, "p": "50000.25", "bad": "abc", "flag": true }));
        assert_eq!(required_f64(&a, "q").unwrap(), 0.5);
        assert_eq!(required_f64(&a, "p").unwrap(), 50000.25);
        assert!(required_f64(&a, "bad").is_err());
        assert!(required_f64(&a, "flag").is_err());
        assert!(required_f64(&a, "missing").is_err());
        assert_eq!(optional_f64(&a, "missing").unwrap(), None);
    }

    #[test]
    fn test_optional_limit() {
        let a = args(json!({ "a": 10, "b": 10.0, "c": 2.5, "d": "invalid", "e": null, "f": -1 }));
        assert_eq!(optional_limit(&a, "a").unwrap(), Some(10));
        assert_eq!(optional_limit(&a, "b").unwrap(), Some(10));
        assert!(optional_limit(&a, "c").is_err());
        assert!(optional_limit(&a, "d").is_err());
        assert_eq!(optional_limit(&a, "e").unwrap(), None);
        assert_eq!(optional_limit(&a, "f").unwrap(), Some(-1));
    }
}
