//! Due date parsing.
//!
//! Clients send due dates either as full RFC 3339 timestamps or as plain
//! calendar dates. Both are normalised to an RFC 3339 UTC string before they
//! reach the store, but readers must still cope with values that were
//! written by older clients and no longer parse.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use thiserror::Error;

const NAIVE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid due date \"{0}\"")]
pub struct InvalidDueDate(pub String);

/// Parse a due date. Values without an offset are taken as UTC.
pub fn parse_due_date(raw: &str) -> Result<DateTime<Utc>, InvalidDueDate> {
    let value = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| InvalidDueDate(raw.to_string()))
}

/// Parse and re-render a client supplied due date in the stored form.
pub fn normalize_due_date(raw: &str) -> Result<String, InvalidDueDate> {
    parse_due_date(raw).map(|parsed| parsed.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339_with_offset() {
        let parsed = parse_due_date("2024-03-10T12:30:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 10, 10, 30, 0).unwrap());
    }

    #[test]
    fn plain_date_is_midnight_utc() {
        let parsed = parse_due_date("2024-03-10").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn local_datetime_without_offset_is_utc() {
        let parsed = parse_due_date("2024-03-10T08:15").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 10, 8, 15, 0).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            parse_due_date("not-a-date"),
            Err(InvalidDueDate("not-a-date".to_string()))
        );
        assert!(parse_due_date("").is_err());
        assert!(parse_due_date("2024-02-30").is_err());
    }

    #[test]
    fn normalizes_to_millisecond_zulu_form() {
        assert_eq!(
            normalize_due_date("2024-03-10").unwrap(),
            "2024-03-10T00:00:00.000Z"
        );
    }
}
