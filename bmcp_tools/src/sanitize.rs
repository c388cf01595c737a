use std::sync::LazyLock;

use regex::Regex;
use serde_json::Map;
use serde_json::Value;

pub const REDACTED: &str = "[REDACTED]";

/// Detail keys whose values are never shown, compared lowercase
const SENSITIVE_KEYS: [&str; 5] = ["api_key", "secret", "password", "token", "key"];

static SENSITIVE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b[A-Za-z0-9]{32,}\b",
        r"(?i)api[_\s-]*key[:\s=]*[A-Za-z0-9]+",
        r"(?i)secret[:\s=]*[A-Za-z0-9]+",
        r"(?i)token[:\s=]*[A-Za-z0-9]+",
        r"(?i)password[:\s=]*[A-Za-z0-9]+",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Replace secret-looking substrings with the redaction marker
pub fn sanitize_message(message: &str) -> String {
    SENSITIVE_PATTERNS
        .iter()
        .fold(message.to_string(), |text, pattern| pattern.replace_all(&text, REDACTED).into_owned())
}

pub fn is_sensitive_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    SENSITIVE_KEYS.contains(&lower.as_str())
}

/// Sanitize an error detail map, recursing into nested objects and arrays
pub fn sanitize_details(details: &Map<String, Value>) -> Map<String, Value> {
    details
        .iter()
        .map(|(key, value)| {
            let value = if is_sensitive_key(key) { Value::String(REDACTED.to_string()) } else { sanitize_value(value) };
            (key.clone(), value)
        })
        .collect()
}

fn sanitize_value(value: &Value) -> Value {
    match value {
        Value::String(text) => Value::String(sanitize_message(text)),
        Value::Object(map) => Value::Object(sanitize_details(map)),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_value).collect()),
        other => other.clone(),
    }
}
