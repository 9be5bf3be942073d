//! Time related utils.

use chrono::SecondsFormat;
use chrono::Utc;

/// DateTime is the alias for `chrono::DateTime<Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into RFC 1123 http date: "Mon, 02 Jan 2006 15:04:05 GMT"
///
/// The day of month is always two digits wide, Azure rejects "Mon, 2 Jan".
pub fn format_http_date(t: DateTime) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Format time into date: "2022-03-13"
pub fn format_date(t: DateTime) -> String {
    t.format("%Y-%m-%d").to_string()
}

/// Format time into ISO 8601 without fractional seconds: "2022-03-13T07:20:04Z"
pub fn format_iso8601(t: DateTime) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse time from RFC 3339: "2022-03-13T07:20:04Z"
pub fn parse_rfc3339(s: &str) -> crate::Result<DateTime> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|v| v.with_timezone(&Utc))
        .map_err(|e| crate::Error::unexpected("parse rfc3339 time failed").with_source(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_time() -> DateTime {
        parse_rfc3339("2022-03-01T08:02:04Z").expect("must be valid")
    }

    #[test]
    fn test_format_http_date_is_zero_padded() {
        assert_eq!(format_http_date(test_time()), "Tue, 01 Mar 2022 08:02:04 GMT");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(test_time()), "2022-03-01");
    }

    #[test]
    fn test_format_iso8601() {
        assert_eq!(format_iso8601(test_time()), "2022-03-01T08:02:04Z");
    }
}
