//! Timestamp utilities

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp as RFC 3339 with a `Z` suffix (e.g. `2025-11-16T09:30:00.123456Z`)
pub fn to_rfc3339_z(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Milliseconds since the Unix epoch
pub fn unix_millis(timestamp: DateTime<Utc>) -> i64 {
    timestamp.timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800);
    }

    #[tokio::test]
    async fn test_now_successive_calls_advance() {
        let time1 = now();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let time2 = now();
        assert!(time2 > time1);
    }

    #[test]
    fn test_rfc3339_z_uses_zulu_suffix() {
        let ts = Utc.with_ymd_and_hms(2025, 11, 16, 9, 30, 0).unwrap();
        assert_eq!(to_rfc3339_z(ts), "2025-11-16T09:30:00.000000Z");
    }

    #[test]
    fn test_unix_millis() {
        let ts = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 1).unwrap();
        assert_eq!(unix_millis(ts), 1000);
    }
}
