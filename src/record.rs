//! Interval records: raw input rows and their parsed, resolved form

use crate::error::{OccupancyError, Result};
use crate::time_codec::{to_minutes, TimeValue};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Surgery category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Scheduled,
    Urgent,
    Emergency,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Scheduled, Category::Urgent, Category::Emergency];

    /// Parse an English or Japanese category label
    pub fn parse(label: &str) -> Result<Self> {
        let trimmed = label.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "scheduled" | "定時" => Ok(Category::Scheduled),
            "urgent" | "臨時" => Ok(Category::Urgent),
            "emergency" | "緊急" => Ok(Category::Emergency),
            _ => Err(OccupancyError::InvalidCategory(label.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Scheduled => "scheduled",
            Category::Urgent => "urgent",
            Category::Emergency => "emergency",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse an English (`Mon`, `monday`) or Japanese (`月`, `月曜`, `月曜日`) weekday label
pub fn parse_weekday(label: &str) -> Result<Weekday> {
    let trimmed = label.trim();
    let japanese = trimmed.trim_end_matches('日').trim_end_matches('曜');
    let weekday = match japanese {
        "月" => Some(Weekday::Mon),
        "火" => Some(Weekday::Tue),
        "水" => Some(Weekday::Wed),
        "木" => Some(Weekday::Thu),
        "金" => Some(Weekday::Fri),
        "土" => Some(Weekday::Sat),
        "日" => Some(Weekday::Sun),
        _ => None,
    };
    // a bare "日" is eaten by the suffix trim
    let weekday = weekday.or(match trimmed {
        "日" | "日曜" | "日曜日" => Some(Weekday::Sun),
        _ => None,
    });

    weekday
        .or_else(|| trimmed.parse::<Weekday>().ok())
        .ok_or_else(|| OccupancyError::InvalidWeekday(label.to_string()))
}

/// Japanese report label for a weekday (`月曜日`)
pub fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "月曜日",
        Weekday::Tue => "火曜日",
        Weekday::Wed => "水曜日",
        Weekday::Thu => "木曜日",
        Weekday::Fri => "金曜日",
        Weekday::Sat => "土曜日",
        Weekday::Sun => "日曜日",
    }
}

/// Parse `YYYY-MM-DD`, `YYYY/MM/DD`, or `YYYY-MM-DD HH:MM:SS`
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let trimmed = text.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y/%m/%d"))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date())
        })
        .map_err(|_| OccupancyError::InvalidDate(text.to_string()))
}

/// One input row as delivered by the data-loading collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// Opaque management id, carried through untouched
    #[serde(default)]
    pub management_id: String,
    pub date: String,
    #[serde(default)]
    pub weekday: String,
    pub room: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub category: String,
}

/// A parsed surgery interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalRecord {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub room: String,
    /// Inclusive start minute
    pub start: u32,
    /// Inclusive end minute
    pub end: u32,
    pub category: Category,
}

impl IntervalRecord {
    /// Parse a raw row; an empty weekday label falls back to the date's weekday
    pub fn from_raw(row: &RawRow) -> Result<Self> {
        let date = parse_date(&row.date)?;
        let weekday = if row.weekday.trim().is_empty() {
            date.weekday()
        } else {
            parse_weekday(&row.weekday)?
        };
        let start = to_minutes(&TimeValue::Text(row.start.clone()))?;
        let end = to_minutes(&TimeValue::Text(row.end.clone()))?;
        let category = Category::parse(&row.category)?;

        Ok(Self {
            date,
            weekday,
            room: row.room.trim().to_string(),
            start,
            end,
            category,
        })
    }

    /// Start after end; kept as-is but surfaced in diagnostics
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}
