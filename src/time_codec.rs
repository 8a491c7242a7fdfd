//! Time-of-day codec
//!
//! Every time value entering the engine is reduced to an integer count of
//! minutes since midnight. Seconds are truncated, never rounded.

use crate::error::{OccupancyError, Result};
use chrono::{NaiveTime, Timelike};
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// A time-of-day value in one of the representations upstream loaders produce
#[derive(Debug, Clone, PartialEq)]
pub enum TimeValue {
    /// Wall-clock time
    Clock(NaiveTime),
    /// Elapsed time since midnight (spreadsheet durations)
    SinceMidnight(Duration),
    /// Already-converted minute count
    Minutes(u32),
    /// `H:MM` or `H:MM:SS` text
    Text(String),
}

impl From<NaiveTime> for TimeValue {
    fn from(time: NaiveTime) -> Self {
        TimeValue::Clock(time)
    }
}

impl From<Duration> for TimeValue {
    fn from(duration: Duration) -> Self {
        TimeValue::SinceMidnight(duration)
    }
}

impl From<&str> for TimeValue {
    fn from(text: &str) -> Self {
        TimeValue::Text(text.to_string())
    }
}

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d{1,2}):([0-5]\d)(?::([0-5]\d))?\s*$").expect("static time pattern")
    })
}

/// Convert any supported time value to minutes since midnight
pub fn to_minutes(value: &TimeValue) -> Result<u32> {
    match value {
        TimeValue::Clock(time) => Ok(time.hour() * 60 + time.minute()),
        TimeValue::SinceMidnight(duration) => u32::try_from(duration.as_secs() / 60)
            .map_err(|_| OccupancyError::InvalidTimeFormat(format!("{:?}", duration))),
        TimeValue::Minutes(minutes) => Ok(*minutes),
        TimeValue::Text(text) => parse_time_text(text),
    }
}

/// Parse `H:MM` / `H:MM:SS` text into minutes since midnight
///
/// Hours are not capped at 23 so that overnight end times such as `25:10`
/// survive as 1510.
pub fn parse_time_text(text: &str) -> Result<u32> {
    let caps = time_pattern()
        .captures(text)
        .ok_or_else(|| OccupancyError::InvalidTimeFormat(text.to_string()))?;

    let hours: u32 = caps[1]
        .parse()
        .map_err(|_| OccupancyError::InvalidTimeFormat(text.to_string()))?;
    let minutes: u32 = caps[2]
        .parse()
        .map_err(|_| OccupancyError::InvalidTimeFormat(text.to_string()))?;

    Ok(hours * 60 + minutes)
}

/// Render minutes since midnight as `H:MM`
pub fn format_minutes(minutes: u32) -> String {
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_time() {
        let time = NaiveTime::from_hms_opt(8, 44, 59).unwrap();
        assert_eq!(to_minutes(&TimeValue::from(time)).unwrap(), 524);
    }

    #[test]
    fn test_duration_since_midnight_truncates_seconds() {
        let duration = Duration::from_secs(13 * 3600 + 39 * 60 + 45);
        assert_eq!(to_minutes(&TimeValue::from(duration)).unwrap(), 819);
    }

    #[test]
    fn test_duration_beyond_u32_minutes_rejected() {
        let duration = Duration::from_secs(u64::MAX);
        assert_eq!(
            to_minutes(&TimeValue::from(duration)),
            Err(OccupancyError::InvalidTimeFormat(format!("{:?}", duration)))
        );
        let largest = Duration::from_secs(u64::from(u32::MAX) * 60);
        assert_eq!(to_minutes(&TimeValue::from(largest)).unwrap(), u32::MAX);
    }

    #[test]
    fn test_text_forms() {
        assert_eq!(parse_time_text("9:00").unwrap(), 540);
        assert_eq!(parse_time_text("09:00").unwrap(), 540);
        assert_eq!(parse_time_text("14:13:27").unwrap(), 853);
        assert_eq!(parse_time_text(" 0:00 ").unwrap(), 0);
        assert_eq!(parse_time_text("23:59").unwrap(), 1439);
    }

    #[test]
    fn test_overnight_text() {
        assert_eq!(parse_time_text("25:10").unwrap(), 1510);
    }

    #[test]
    fn test_invalid_text() {
        for bad in ["", "9", "9:7", "9:60", "9:00:75", "nine:00", "9.30", "123:00", "9:00:"] {
            assert_eq!(
                parse_time_text(bad),
                Err(OccupancyError::InvalidTimeFormat(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_minutes_passthrough() {
        assert_eq!(to_minutes(&TimeValue::Minutes(1200)).unwrap(), 1200);
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(540), "9:00");
        assert_eq!(format_minutes(1230), "20:30");
        assert_eq!(format_minutes(5), "0:05");
    }
}
