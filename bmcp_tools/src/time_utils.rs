use std::time::SystemTime;
use std::time::UNIX_EPOCH;

#[inline]
/// Current Unix timestamp in milliseconds, as stamped on every envelope
pub fn unix_timestamp_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_is_milliseconds() {
        let ts = unix_timestamp_ms();
        // Past 2023-11 and not in microseconds
        assert!(ts > 1_700_000_000_000);
        assert!(ts < 10_000_000_000_000);
    }
}
