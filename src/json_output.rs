//! JSON output format for occupancy reports
//!
//! Curves are emitted as ordered `(time, value)` points so consumers never
//! need to know the anchor layout.

use crate::aggregate::OccupancyCurve;
use crate::consistency::ConsistencyReport;
use crate::engine::EngineReport;
use crate::time_codec::format_minutes;
use crate::utilization::VariantResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One (anchor, value) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonPoint {
    /// `H:MM`
    pub time: String,
    /// Minutes since midnight
    pub minute: u32,
    pub value: f64,
}

/// A day-averaged curve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonCurve {
    pub day_count: usize,
    pub points: Vec<JsonPoint>,
}

impl From<&OccupancyCurve> for JsonCurve {
    fn from(curve: &OccupancyCurve) -> Self {
        Self {
            day_count: curve.day_count,
            points: curve
                .points()
                .into_iter()
                .map(|(minute, value)| JsonPoint {
                    time: format_minutes(minute),
                    minute,
                    value,
                })
                .collect(),
        }
    }
}

/// Overall curves by category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOverall {
    pub combined: JsonCurve,
    pub scheduled: JsonCurve,
    pub urgent: JsonCurve,
    pub emergency: JsonCurve,
}

/// Curves for one weekday
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonWeekday {
    /// Short English name (`Mon`)
    pub weekday: String,
    /// Report label (`月曜日`)
    pub label: String,
    pub combined: JsonCurve,
    pub scheduled: JsonCurve,
}

/// Utilization rates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonUtilization {
    pub start: String,
    pub end: String,
    pub denominator: String,
    pub capacity: f64,
    pub combined_percent: f64,
    pub scheduled_percent: f64,
}

/// Input accounting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonDiagnostics {
    pub input_rows: usize,
    pub resolved_records: usize,
    pub merged_records: usize,
    pub inverted_intervals: usize,
    pub excluded_by_weekday: usize,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub unknown_rooms: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dropped_rooms: Vec<String>,
}

/// JSON output structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    /// Format version
    pub version: String,
    pub semantics: String,
    pub ceiling: f64,
    pub input_digest: String,
    pub overall: JsonOverall,
    pub weekdays: Vec<JsonWeekday>,
    pub consistency: ConsistencyReport,
    pub utilization: JsonUtilization,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_rate: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub calibration: Vec<VariantResult>,
    pub diagnostics: JsonDiagnostics,
}

impl JsonOutput {
    /// Build the JSON view of a report
    pub fn from_report(report: &EngineReport) -> Self {
        let overall = &report.overall;
        let u = &report.utilization;
        let d = &report.diagnostics;

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            semantics: report.semantics.clone(),
            ceiling: report.ceiling,
            input_digest: report.input_digest.clone(),
            overall: JsonOverall {
                combined: (&overall.combined).into(),
                scheduled: (&overall.scheduled).into(),
                urgent: (&overall.urgent).into(),
                emergency: (&overall.emergency).into(),
            },
            weekdays: report
                .weekdays
                .iter()
                .map(|w| JsonWeekday {
                    weekday: w.weekday.to_string(),
                    label: w.label.clone(),
                    combined: (&w.combined).into(),
                    scheduled: (&w.scheduled).into(),
                })
                .collect(),
            consistency: report.consistency.clone(),
            utilization: JsonUtilization {
                start: format_minutes(u.start),
                end: format_minutes(u.end),
                denominator: u.denominator.clone(),
                capacity: u.capacity,
                combined_percent: u.combined,
                scheduled_percent: u.scheduled,
            },
            target_rate: report.target_rate,
            calibration: report.calibration.clone(),
            diagnostics: JsonDiagnostics {
                input_rows: d.input_rows,
                resolved_records: d.resolved_records,
                merged_records: d.merged_records,
                inverted_intervals: d.inverted_intervals,
                excluded_by_weekday: d.excluded_by_weekday,
                unknown_rooms: d.unknown_rooms.clone(),
                dropped_rooms: d.dropped_rooms.clone(),
            },
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> OccupancyCurve {
        OccupancyCurve {
            anchors: vec![480, 510],
            values: vec![0.5, 1.25],
            totals: vec![1.0, 2.5],
            day_count: 2,
            days: Vec::new(),
        }
    }

    #[test]
    fn test_curve_points() {
        let json: JsonCurve = (&curve()).into();
        assert_eq!(json.day_count, 2);
        assert_eq!(json.points.len(), 2);
        assert_eq!(json.points[1].time, "8:30");
        assert_eq!(json.points[1].minute, 510);
        assert_eq!(json.points[1].value, 1.25);
    }

    #[test]
    fn test_curve_serialization() {
        let json: JsonCurve = (&curve()).into();
        let text = serde_json::to_string(&json).unwrap();
        assert!(text.contains("\"time\":\"8:00\""));
        assert!(text.contains("\"value\":0.5"));
    }

    #[test]
    fn test_optional_fields_omitted() {
        let diagnostics = JsonDiagnostics {
            input_rows: 1,
            resolved_records: 1,
            merged_records: 0,
            inverted_intervals: 0,
            excluded_by_weekday: 0,
            unknown_rooms: BTreeMap::new(),
            dropped_rooms: Vec::new(),
        };
        let text = serde_json::to_string(&diagnostics).unwrap();
        assert!(!text.contains("unknown_rooms"));
        assert!(!text.contains("dropped_rooms"));
    }
}
