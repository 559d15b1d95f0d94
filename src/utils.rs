// Utility functions
use chrono::{DateTime, Duration, Utc};

/// Start of the lookback window ending at `now`.
pub fn lookback_start(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::days(days)
}

/// Parses an epoch-milliseconds string as sent by the exchange.
pub fn parse_millis(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_lookback_start() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let start = lookback_start(now, 120);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_millis() {
        let ts = parse_millis("1700000000000").unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
        assert!(parse_millis("abc").is_none());
    }
}
