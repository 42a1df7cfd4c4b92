use chrono::{DateTime, NaiveDate, NaiveDateTime};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp leniently, normalising offsets to UTC.
///
/// Accepts RFC 3339 (`2024-01-01T10:00:00Z`, `...+02:00`), naive date-times
/// with `T` or space separators, and bare dates (midnight). Anything else
/// yields `None` rather than an error.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.naive_utc());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_rfc3339_normalised_to_utc() {
        let ts = parse_timestamp("2024-01-01T10:00:00+02:00").unwrap();
        assert_eq!(ts.hour(), 8);

        let ts = parse_timestamp("2024-01-01T10:00:00Z").unwrap();
        assert_eq!(ts.hour(), 10);
    }

    #[test]
    fn test_naive_formats() {
        let ts = parse_timestamp("2023-07-15 14:30:00").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.hour()), (2023, 7, 14));

        let ts = parse_timestamp("2023-07-15T14:30").unwrap();
        assert_eq!(ts.minute(), 30);

        let ts = parse_timestamp("2023-07-15").unwrap();
        assert_eq!(ts.hour(), 0);
    }

    #[test]
    fn test_unparsable_is_none() {
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("2023-13-45"), None);
    }
}
