//! Consistency Checker
//!
//! Cross-checks the per-category aggregates against the combined one, cell by
//! cell, and flags any cell above the theoretical ceiling (sum of active
//! weights). Neither finding is an error: a partition mismatch is expected
//! whenever two categories touch the same room in the same window (each split
//! counts the room, the combined view counts it once), and ceiling violations
//! are defects for a human reviewer to chase.

use crate::aggregate::OccupancyCurve;
use crate::time_codec::format_minutes;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Float slack on top of the configured tolerance
const COMPARE_SLACK: f64 = 1e-9;

/// The four parallel aggregates the checker reconciles
#[derive(Debug, Clone, Copy)]
pub struct CategoryCurves<'a> {
    pub scheduled: &'a OccupancyCurve,
    pub urgent: &'a OccupancyCurve,
    pub emergency: &'a OccupancyCurve,
    pub combined: &'a OccupancyCurve,
}

impl<'a> CategoryCurves<'a> {
    fn tables(&self) -> [(&'static str, &'a OccupancyCurve); 4] {
        [
            ("scheduled", self.scheduled),
            ("urgent", self.urgent),
            ("emergency", self.emergency),
            ("combined", self.combined),
        ]
    }
}

/// A (date, anchor) cell where the category split does not add up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellMismatch {
    pub date: NaiveDate,
    pub anchor: u32,
    pub partition_sum: f64,
    pub combined: f64,
}

/// A cell above the weight ceiling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CeilingViolation {
    pub table: String,
    pub date: NaiveDate,
    pub anchor: u32,
    pub value: f64,
}

/// Result of a consistency pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub tolerance: f64,
    pub ceiling: f64,
    pub cells_checked: usize,
    pub mismatch_count: usize,
    /// First mismatching cells, in date/anchor order
    pub mismatches: Vec<CellMismatch>,
    /// Largest cell across all four tables
    pub max_observed: f64,
    pub ceiling_violations: Vec<CeilingViolation>,
}

impl ConsistencyReport {
    /// Every partition cell reconciles with the combined cell
    pub fn is_reconciled(&self) -> bool {
        self.mismatch_count == 0
    }

    /// Any cell above the ceiling
    pub fn has_defects(&self) -> bool {
        !self.ceiling_violations.is_empty()
    }

    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();

        if self.is_reconciled() {
            report.push_str("Category split reconciles with combined\n");
        } else {
            report.push_str(&format!(
                "Category split differs from combined in {} of {} cells (tolerance {})\n",
                self.mismatch_count, self.cells_checked, self.tolerance
            ));
            for m in &self.mismatches {
                report.push_str(&format!(
                    "  {} {}: split={:.4} combined={:.4}\n",
                    m.date,
                    format_minutes(m.anchor),
                    m.partition_sum,
                    m.combined
                ));
            }
            if self.mismatches.len() < self.mismatch_count {
                report.push_str(&format!(
                    "  ... {} more\n",
                    self.mismatch_count - self.mismatches.len()
                ));
            }
        }

        report.push_str(&format!(
            "Max observed: {:.4} (ceiling {:.4})\n",
            self.max_observed, self.ceiling
        ));

        if self.has_defects() {
            report.push_str(&format!(
                "CEILING VIOLATIONS: {}\n",
                self.ceiling_violations.len()
            ));
            for v in &self.ceiling_violations {
                report.push_str(&format!(
                    "  [{}] {} {}: {:.4}\n",
                    v.table,
                    v.date,
                    format_minutes(v.anchor),
                    v.value
                ));
            }
        }

        report
    }
}

/// Cell-level reconciliation of category aggregates
#[derive(Debug, Clone)]
pub struct ConsistencyChecker {
    tolerance: f64,
    ceiling: f64,
    max_listed: usize,
}

impl ConsistencyChecker {
    /// `ceiling` is the sum of active room weights
    pub fn new(tolerance: f64, ceiling: f64) -> Self {
        Self {
            tolerance,
            ceiling,
            max_listed: 20,
        }
    }

    /// Cap on mismatching cells listed individually in the report
    pub fn with_max_listed(mut self, max_listed: usize) -> Self {
        self.max_listed = max_listed;
        self
    }

    pub fn check(&self, curves: &CategoryCurves<'_>) -> ConsistencyReport {
        let anchors = &curves.combined.anchors;

        let dates: BTreeSet<NaiveDate> = curves
            .tables()
            .iter()
            .flat_map(|(_, curve)| curve.days.iter().map(|d| d.date))
            .collect();

        let cell = |curve: &OccupancyCurve, date: NaiveDate, i: usize| -> f64 {
            curve
                .day(date)
                .and_then(|d| d.values.get(i).copied())
                .unwrap_or(0.0)
        };

        let mut cells_checked = 0;
        let mut mismatch_count = 0;
        let mut mismatches = Vec::new();

        for &date in &dates {
            for (i, &anchor) in anchors.iter().enumerate() {
                cells_checked += 1;
                let partition_sum = cell(curves.scheduled, date, i)
                    + cell(curves.urgent, date, i)
                    + cell(curves.emergency, date, i);
                let combined = cell(curves.combined, date, i);

                if (partition_sum - combined).abs() > self.tolerance + COMPARE_SLACK {
                    mismatch_count += 1;
                    if mismatches.len() < self.max_listed {
                        mismatches.push(CellMismatch {
                            date,
                            anchor,
                            partition_sum,
                            combined,
                        });
                    }
                }
            }
        }

        let mut max_observed: f64 = 0.0;
        let mut ceiling_violations = Vec::new();
        for (table, curve) in curves.tables() {
            for day in &curve.days {
                for (&anchor, &value) in curve.anchors.iter().zip(&day.values) {
                    max_observed = max_observed.max(value);
                    if value > self.ceiling + self.tolerance + COMPARE_SLACK {
                        tracing::warn!(
                            "Ceiling violation in {} table: {} {} = {:.4} > {:.4}",
                            table,
                            day.date,
                            format_minutes(anchor),
                            value,
                            self.ceiling
                        );
                        ceiling_violations.push(CeilingViolation {
                            table: table.to_string(),
                            date: day.date,
                            anchor,
                            value,
                        });
                    }
                }
            }
        }

        if mismatch_count > 0 {
            tracing::info!(
                "{} of {} cells differ between category split and combined",
                mismatch_count,
                cells_checked
            );
        }

        ConsistencyReport {
            tolerance: self.tolerance,
            ceiling: self.ceiling,
            cells_checked,
            mismatch_count,
            mismatches,
            max_observed,
            ceiling_violations,
        }
    }
}
