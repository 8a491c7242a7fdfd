//! CSV output format for occupancy curves
//!
//! One row per curve, one column per anchor, for spreadsheet analysis and
//! machine parsing. The per-day verification table has its own layout.

use crate::aggregate::OccupancyCurve;
use crate::engine::EngineReport;
use crate::time_codec::format_minutes;

/// CSV record for a single curve
#[derive(Debug, Clone)]
pub struct CsvCurve {
    /// Grouping, e.g. `overall`, `weekday`, `weekday-scheduled`
    pub section: String,
    /// Series name within the section, e.g. `scheduled`, `月曜日`
    pub series: String,
    pub day_count: usize,
    pub values: Vec<f64>,
}

/// CSV output formatter
#[derive(Debug)]
pub struct CsvOutput {
    anchors: Vec<u32>,
    places: usize,
    curves: Vec<CsvCurve>,
}

impl CsvOutput {
    /// Create a new CSV output formatter
    pub fn new(anchors: &[u32], places: u32) -> Self {
        Self {
            anchors: anchors.to_vec(),
            places: places as usize,
            curves: Vec::new(),
        }
    }

    /// Every curve of a report: overall categories, then each weekday
    pub fn from_report(report: &EngineReport) -> Self {
        let mut output = Self::new(&report.anchors, report.output_places);
        let overall = &report.overall;
        for (name, curve) in [
            ("combined", &overall.combined),
            ("scheduled", &overall.scheduled),
            ("urgent", &overall.urgent),
            ("emergency", &overall.emergency),
        ] {
            output.add_curve("overall", name, curve);
        }
        for weekday in &report.weekdays {
            output.add_curve("weekday", &weekday.label, &weekday.combined);
        }
        for weekday in &report.weekdays {
            output.add_curve("weekday-scheduled", &weekday.label, &weekday.scheduled);
        }
        output
    }

    /// Add a curve to the output
    pub fn add_curve(&mut self, section: &str, series: &str, curve: &OccupancyCurve) {
        self.curves.push(CsvCurve {
            section: section.to_string(),
            series: series.to_string(),
            day_count: curve.day_count,
            values: curve.values.clone(),
        });
    }

    fn header(&self) -> String {
        let mut headers = vec!["section".to_string(), "series".to_string(), "days".to_string()];
        headers.extend(self.anchors.iter().map(|&a| format_minutes(a)));
        headers.join(",")
    }

    /// Escape CSV field (handle commas, quotes, line breaks)
    fn escape_field(field: &str) -> String {
        if field.contains([',', '"', '\n', '\r']) {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn format_curve(&self, curve: &CsvCurve) -> String {
        let mut fields = vec![
            Self::escape_field(&curve.section),
            Self::escape_field(&curve.series),
            curve.day_count.to_string(),
        ];
        fields.extend(
            curve
                .values
                .iter()
                .map(|v| format!("{:.*}", self.places, v)),
        );
        fields.join(",")
    }

    /// Generate complete CSV output
    pub fn to_csv(&self) -> String {
        let mut output = self.header();
        output.push('\n');
        for curve in &self.curves {
            output.push_str(&self.format_curve(curve));
            output.push('\n');
        }
        output
    }
}

/// Per-day verification table: one row per date, one column per anchor
pub fn day_table_csv(curve: &OccupancyCurve, detail_places: u32) -> String {
    let places = detail_places as usize;
    let mut output = String::from("date,weekday");
    for &anchor in &curve.anchors {
        output.push(',');
        output.push_str(&format_minutes(anchor));
    }
    output.push('\n');

    for day in &curve.days {
        output.push_str(&format!("{},{}", day.date, day.weekday));
        for value in &day.values {
            output.push_str(&format!(",{:.*}", places, value));
        }
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::DayProfile;
    use chrono::{NaiveDate, Weekday};

    fn curve() -> OccupancyCurve {
        OccupancyCurve {
            anchors: vec![540, 570],
            values: vec![1.5, 0.25],
            totals: vec![3.0, 0.5],
            day_count: 2,
            days: vec![DayProfile {
                date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
                weekday: Weekday::Mon,
                values: vec![1.5, 0.3333],
            }],
        }
    }

    #[test]
    fn test_csv_header() {
        let output = CsvOutput::new(&[480, 510], 2);
        assert_eq!(output.header(), "section,series,days,8:00,8:30");
    }

    #[test]
    fn test_csv_escape_field_simple() {
        assert_eq!(CsvOutput::escape_field("scheduled"), "scheduled");
    }

    #[test]
    fn test_csv_escape_field_with_comma() {
        assert_eq!(CsvOutput::escape_field("a,b"), "\"a,b\"");
    }

    #[test]
    fn test_csv_escape_field_with_quote() {
        assert_eq!(CsvOutput::escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_csv_escape_field_with_line_breaks() {
        assert_eq!(CsvOutput::escape_field("a\nb"), "\"a\nb\"");
        assert_eq!(CsvOutput::escape_field("a\rb"), "\"a\rb\"");
    }

    #[test]
    fn test_csv_rows_use_output_places() {
        let mut output = CsvOutput::new(&[540, 570], 2);
        output.add_curve("overall", "combined", &curve());
        let csv = output.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "overall,combined,2,1.50,0.25");
    }

    #[test]
    fn test_day_table() {
        let csv = day_table_csv(&curve(), 4);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "date,weekday,9:00,9:30");
        assert_eq!(lines[1], "2025-09-01,Mon,1.5000,0.3333");
    }
}
