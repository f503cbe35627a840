use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Accepts RFC 3339 plus the space-separated and date-only forms the backend emits.
/// Naive timestamps are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let with_t = raw.replacen(' ', "T", 1);
    if let Ok(dt) = DateTime::parse_from_rfc3339(&with_t) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&with_t, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `mm:ss` countdown label.
pub fn format_countdown(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_backend_timestamp_shapes() {
        let expected = Utc.with_ymd_and_hms(2025, 9, 26, 18, 48, 9).unwrap();
        assert_eq!(parse_timestamp("2025-09-26T18:48:09Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-09-26T20:48:09+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-09-26 18:48:09"), Some(expected));
        assert_eq!(parse_timestamp("2025-09-26T18:48:09.000"), Some(expected));
        assert!(parse_timestamp("2025-09-26").is_some());
        assert_eq!(parse_timestamp("soon"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn countdown_is_zero_padded() {
        assert_eq!(format_countdown(120), "02:00");
        assert_eq!(format_countdown(1800), "30:00");
        assert_eq!(format_countdown(59), "00:59");
        assert_eq!(format_countdown(0), "00:00");
    }
}
