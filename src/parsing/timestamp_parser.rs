use super::row_parser::RawValue;
use crate::error::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

/// Days between the spreadsheet epoch (1899-12-30) and the Unix epoch.
const SPREADSHEET_EPOCH_OFFSET_DAYS: f64 = 25569.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Naive layouts tried after RFC 3339. All are read as UTC.
const NAIVE_DATETIME_FORMATS: [&str; 4] =
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Turns raw timestamp cells into milliseconds since the epoch.
///
/// Text is tried as RFC 3339, then as a naive ISO-like date or date-time, then
/// as `M/D/YY H:MM`. Numbers are spreadsheet serial dates.
pub struct TimestampParser {
    slash_datetime_regex: Regex,
}

impl TimestampParser {
    pub fn new() -> Result<Self> {
        Ok(TimestampParser {
            slash_datetime_regex: Regex::new(
                r"(\d{1,2})/(\d{1,2})/(\d{2,4})\s+(\d{1,2}):(\d{2})",
            )?,
        })
    }

    pub fn parse(&self, value: &RawValue) -> Option<u64> {
        match value {
            RawValue::Text(text) => self.parse_text(text),
            RawValue::Number(serial) => parse_serial_date(*serial),
        }
    }

    pub fn parse_text(&self, text: &str) -> Option<u64> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
            return millis_from_epoch(datetime.timestamp_millis());
        }

        for format in NAIVE_DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
                return millis_from_epoch(naive.and_utc().timestamp_millis());
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            let midnight = date.and_hms_opt(0, 0, 0)?;
            return millis_from_epoch(midnight.and_utc().timestamp_millis());
        }

        self.parse_slash_datetime(text)
    }

    /// `month/day/year hour:minute`, two-digit years land in 2000-2099.
    fn parse_slash_datetime(&self, text: &str) -> Option<u64> {
        let captures = self.slash_datetime_regex.captures(text)?;
        let field = |i: usize| captures.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

        let month = field(1)?;
        let day = field(2)?;
        let year = field(3)?;
        let hour = field(4)?;
        let minute = field(5)?;

        let full_year = if year < 100 { 2000 + year } else { year };
        let naive = NaiveDate::from_ymd_opt(i32::try_from(full_year).ok()?, month, day)?
            .and_hms_opt(hour, minute, 0)?;
        millis_from_epoch(naive.and_utc().timestamp_millis())
    }
}

/// Spreadsheet serial date (days since 1899-12-30, fractional part = time of day).
pub fn parse_serial_date(serial: f64) -> Option<u64> {
    if !serial.is_finite() {
        return None;
    }
    let millis = ((serial - SPREADSHEET_EPOCH_OFFSET_DAYS) * MILLIS_PER_DAY).round();
    if millis < 0.0 || millis > u64::MAX as f64 {
        return None;
    }
    Some(millis as u64)
}

fn millis_from_epoch(millis: i64) -> Option<u64> {
    u64::try_from(millis).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const JAN_1_2024_10AM: u64 = 1_704_103_200_000;

    fn parser() -> TimestampParser {
        TimestampParser::new().unwrap()
    }

    #[test]
    fn test_rfc3339() {
        let p = parser();
        assert_eq!(p.parse_text("2024-01-01T10:00:00Z"), Some(JAN_1_2024_10AM));
        assert_eq!(p.parse_text("2024-01-01T10:00:00.000Z"), Some(JAN_1_2024_10AM));
        assert_eq!(p.parse_text("2024-01-01T12:00:00+02:00"), Some(JAN_1_2024_10AM));
    }

    #[test]
    fn test_naive_formats_are_utc() {
        let p = parser();
        assert_eq!(p.parse_text("2024-01-01T10:00:00"), Some(JAN_1_2024_10AM));
        assert_eq!(p.parse_text("2024-01-01 10:00:00"), Some(JAN_1_2024_10AM));
        assert_eq!(p.parse_text("2024-01-01 10:00"), Some(JAN_1_2024_10AM));
        assert_eq!(p.parse_text("2024-01-01"), Some(JAN_1_2024_10AM - 10 * 3_600_000));
    }

    #[test]
    fn test_slash_fallback() {
        let p = parser();
        assert_eq!(p.parse_text("1/1/24 10:00"), Some(JAN_1_2024_10AM));
        assert_eq!(p.parse_text("01/01/2024 10:00"), Some(JAN_1_2024_10AM));
        assert_eq!(p.parse_text("13/45/24 10:00"), None);
    }

    #[test]
    fn test_serial_date() {
        // 45292 = 2024-01-01, 10:00 = 10/24 of a day
        let serial = 45292.0 + 10.0 / 24.0;
        assert_eq!(parse_serial_date(serial), Some(JAN_1_2024_10AM));
        assert_eq!(parser().parse(&RawValue::Number(serial)), Some(JAN_1_2024_10AM));
        assert_eq!(parse_serial_date(100.0), None);
        assert_eq!(parse_serial_date(f64::NAN), None);
    }

    #[test]
    fn test_garbage() {
        let p = parser();
        assert_eq!(p.parse_text(""), None);
        assert_eq!(p.parse_text("not a date"), None);
        assert_eq!(p.parse_text("1969-12-31T23:59:59Z"), None);
    }
}
