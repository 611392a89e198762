/// Utilities for formatting dates in API query parameters
///
/// The complaints API parses `from`/`to`/`since` as ISO date-times and
/// `referenceDate` as a plain ISO date.
use chrono::{DateTime, SecondsFormat, Utc};

/// Format a timestamp as an ISO date-time query parameter
/// Example: 2024-03-15 14:02:26.123 UTC -> "2024-03-15T14:02:26.123Z"
pub fn to_iso_param(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Format a timestamp as a `referenceDate` query parameter
/// Example: 2024-03-15 14:02:26 UTC -> "2024-03-15"
pub fn to_reference_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_to_iso_param() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 15, 14, 2, 26).unwrap();
        assert_eq!(to_iso_param(ts), "2024-03-15T14:02:26.000Z");
    }

    #[test]
    fn test_to_reference_date() {
        let ts = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(to_reference_date(ts), "2024-12-31");
    }
}
