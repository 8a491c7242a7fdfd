// Integration test utilities
//
// Builders for room tables, raw rows and on-disk fixtures shared by the
// scenario, CLI and property tests.

#![allow(dead_code)]

use ortrend::config::EngineConfig;
use ortrend::record::RawRow;
use ortrend::registry::RoomRow;
use std::fs;
use std::path::{Path, PathBuf};

/// Room table used across scenarios: one split room, one angiography suite
pub const ROOMS_TOML: &str = r#"
excluded_weekdays = ["土曜日", ""]

[[room]]
id = "01A"
weight = 0.5

[[room]]
id = "01B"
weight = 0

[[room]]
id = "02"
weight = 1.0

[[room]]
id = "03"
weight = "1"

[[room]]
id = "09"
weight = 1.0

[[room]]
id = "ｱﾝｷﾞｵ"
weight = 0.5

[[room]]
id = "合計"
"#;

pub fn standard_rooms() -> Vec<RoomRow> {
    vec![
        RoomRow::new("01A", 0.5),
        RoomRow::new("01B", 0.0),
        RoomRow::new("02", 1.0),
        RoomRow::new("03", 1.0),
        RoomRow::new("09", 1.0),
        RoomRow::new("ｱﾝｷﾞｵ", 0.5),
    ]
}

pub fn standard_config() -> EngineConfig {
    EngineConfig {
        excluded_weekdays: vec!["土曜日".to_string()],
        rooms: standard_rooms(),
        ..EngineConfig::default()
    }
}

pub fn row(date: &str, room: &str, start: &str, end: &str, category: &str) -> RawRow {
    RawRow {
        management_id: format!("{}-{}-{}", date, room, start),
        date: date.to_string(),
        weekday: String::new(),
        room: room.to_string(),
        start: start.to_string(),
        end: end.to_string(),
        category: category.to_string(),
    }
}

/// Render rows as a records CSV with the standard header
pub fn records_csv(rows: &[RawRow]) -> String {
    let mut csv = String::from("management_id,date,weekday,room,start,end,category\n");
    for r in rows {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            r.management_id, r.date, r.weekday, r.room, r.start, r.end, r.category
        ));
    }
    csv
}

pub fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// A small week of surgeries (2025-09-01 is a Monday, 2025-09-06 a Saturday)
pub fn sample_week() -> Vec<RawRow> {
    vec![
        row("2025-09-01", "09", "8:44", "13:39", "定時"),
        row("2025-09-01", "02", "9:05", "11:30", "定時"),
        row("2025-09-01", "01B", "10:00", "12:00", "臨時"),
        row("2025-09-02", "03", "8:30", "16:00", "定時"),
        row("2025-09-02", "09", "14:13", "15:50", "緊急"),
        row("2025-09-03", "ｱﾝｷﾞｵ", "13:00", "14:45", "臨時"),
        row("2025-09-03", "02", "8:50", "12:10", "定時"),
        row("2025-09-06", "02", "9:00", "12:00", "定時"),
        row("2025-09-06", "HYBRID", "9:00", "12:00", "定時"),
    ]
}
