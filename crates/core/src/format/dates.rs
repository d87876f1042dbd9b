//! Date helpers for display strings and input controls.
//!
//! Stored dates are calendar dates (`NaiveDate`). A bare `yyyy-mm-dd` string is
//! never routed through a UTC instant, so the calendar day cannot shift with
//! the host timezone.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::constants::{DISPLAY_DATE_FORMAT, INPUT_DATE_FORMAT};
use crate::models::YearMonth;

/// Formats a date for display, e.g. `31/12/2024`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Formats a date for an input control, e.g. `2024-12-31`.
pub fn format_date_input(date: NaiveDate) -> String {
    date.format(INPUT_DATE_FORMAT).to_string()
}

/// Parses a stored date representation into a calendar date.
///
/// Accepts `yyyy-mm-dd`, `yyyy-mm-ddTHH:MM:SS[.fff]` and RFC 3339 timestamps.
/// Timestamps keep the calendar date they were written with.
pub fn parse_date_input(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, INPUT_DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.date_naive());
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(timestamp.date());
    }
    None
}

/// Formats a stored date string for display, returning the input unchanged
/// when it cannot be parsed.
pub fn format_date_str(value: &str) -> String {
    parse_date_input(value)
        .map(format_date)
        .unwrap_or_else(|| value.to_string())
}

/// Formats an invoice reference month for display, e.g. `12/2024`.
pub fn format_month_reference(month: YearMonth) -> String {
    format!("{:02}/{}", month.month(), month.year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_bare_date_keeps_calendar_day() {
        let date = parse_date_input("2024-12-31").unwrap();
        assert_eq!(date.day(), 31);
        assert_eq!(date.month(), 12);
        assert_eq!(date.year(), 2024);
        assert_eq!(format_date(date), "31/12/2024");
    }

    #[test]
    fn test_timestamps_keep_written_date() {
        assert_eq!(
            parse_date_input("2024-12-31T23:30:00-03:00"),
            NaiveDate::from_ymd_opt(2024, 12, 31)
        );
        assert_eq!(
            parse_date_input("2024-01-01T00:00:00Z"),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(
            parse_date_input("2024-03-15T10:20:30.123"),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
    }

    #[test]
    fn test_input_round_trip() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        let input = format_date_input(date);
        assert_eq!(input, "2025-02-03");
        assert_eq!(parse_date_input(&input), Some(date));
    }

    #[test]
    fn test_unparseable_values() {
        assert_eq!(parse_date_input(""), None);
        assert_eq!(parse_date_input("31/12/2024"), None);
        assert_eq!(format_date_str("not a date"), "not a date");
        assert_eq!(format_date_str("2024-12-31"), "31/12/2024");
    }

    #[test]
    fn test_month_reference() {
        let month = YearMonth::new(2024, 3).unwrap();
        assert_eq!(format_month_reference(month), "03/2024");
    }
}
