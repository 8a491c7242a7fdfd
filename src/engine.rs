//! Occupancy engine: one batch pass from raw rows to a structured report
//!
//! The engine owns the configuration-derived state (registry, anchors,
//! weekday sets) built once in [`OccupancyEngine::new`]; [`OccupancyEngine::run`]
//! is then a pure function of the input rows.

use crate::aggregate::{DayAggregator, OccupancyCurve};
use crate::anchors::AnchorSet;
use crate::config::EngineConfig;
use crate::consistency::{CategoryCurves, ConsistencyChecker, ConsistencyReport};
use crate::error::{OccupancyError, Result};
use crate::filter::{resolve_records, RecordFilter};
use crate::record::{weekday_label, Category, IntervalRecord, RawRow};
use crate::registry::RoomRegistry;
use crate::time_codec::format_minutes;
use crate::utilization::{utilization_rate, Calibration, VariantResult};
use chrono::Weekday;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Category-split curves with the weekday exclusion applied
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBreakdown {
    pub combined: OccupancyCurve,
    pub scheduled: OccupancyCurve,
    pub urgent: OccupancyCurve,
    pub emergency: OccupancyCurve,
}

/// Curves for a single weekday (weekday exclusion not applied)
#[derive(Debug, Clone, PartialEq)]
pub struct WeekdayBreakdown {
    pub weekday: Weekday,
    /// Report label (`月曜日`)
    pub label: String,
    pub combined: OccupancyCurve,
    pub scheduled: OccupancyCurve,
}

/// Utilization rates over the configured anchor range
#[derive(Debug, Clone, PartialEq)]
pub struct UtilizationSummary {
    pub start: u32,
    pub end: u32,
    pub denominator: String,
    pub capacity: f64,
    /// Percent, rounded to output places
    pub combined: f64,
    pub scheduled: f64,
}

/// What happened to the input along the way
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    pub input_rows: usize,
    pub resolved_records: usize,
    /// Unknown room → excluded record count
    pub unknown_rooms: BTreeMap<String, usize>,
    pub merged_records: usize,
    pub inverted_intervals: usize,
    pub excluded_by_weekday: usize,
    /// Zero-weight rooms with no merge target
    pub dropped_rooms: Vec<String>,
}

impl Diagnostics {
    pub fn unknown_count(&self) -> usize {
        self.unknown_rooms.values().sum()
    }
}

/// Complete result of one engine run
#[derive(Debug, Clone, PartialEq)]
pub struct EngineReport {
    /// Semantics description, e.g. `window-overlap(-14/+15)`
    pub semantics: String,
    pub anchors: Vec<u32>,
    pub output_places: u32,
    /// Sum of active room weights
    pub ceiling: f64,
    pub overall: CategoryBreakdown,
    pub weekdays: Vec<WeekdayBreakdown>,
    pub consistency: ConsistencyReport,
    pub utilization: UtilizationSummary,
    pub target_rate: Option<f64>,
    pub calibration: Vec<VariantResult>,
    pub diagnostics: Diagnostics,
    /// SHA-256 of the normalized records, hex encoded
    pub input_digest: String,
}

impl EngineReport {
    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let places = self.output_places as usize;
        let mut report = String::new();
        let d = &self.diagnostics;

        report.push_str(&format!("Semantics: {}\n", self.semantics));
        report.push_str(&format!(
            "Records: {} input, {} resolved, {} merged, {} in unknown rooms, {} inverted\n",
            d.input_rows,
            d.resolved_records,
            d.merged_records,
            d.unknown_count(),
            d.inverted_intervals
        ));
        if !d.dropped_rooms.is_empty() {
            report.push_str(&format!(
                "Dropped zero-weight rooms: {}\n",
                d.dropped_rooms.join(", ")
            ));
        }
        report.push_str(&format!(
            "Days: {} (ceiling {:.2})\n",
            self.overall.combined.day_count, self.ceiling
        ));
        report.push_str(&format!("Input digest: {}\n\n", self.input_digest));

        report.push_str("Overall occupancy\n");
        report.push_str(&curve_table(
            &self.anchors,
            &[
                ("combined", &self.overall.combined),
                ("scheduled", &self.overall.scheduled),
                ("urgent", &self.overall.urgent),
                ("emergency", &self.overall.emergency),
            ],
            places,
        ));

        if !self.weekdays.is_empty() {
            let combined: Vec<(&str, &OccupancyCurve)> = self
                .weekdays
                .iter()
                .map(|w| (w.label.as_str(), &w.combined))
                .collect();
            let scheduled: Vec<(&str, &OccupancyCurve)> = self
                .weekdays
                .iter()
                .map(|w| (w.label.as_str(), &w.scheduled))
                .collect();
            report.push_str("\nPer weekday, all categories\n");
            report.push_str(&curve_table(&self.anchors, &combined, places));
            report.push_str("\nPer weekday, scheduled\n");
            report.push_str(&curve_table(&self.anchors, &scheduled, places));
        }

        report.push('\n');
        report.push_str(&self.consistency.to_report_string());

        let u = &self.utilization;
        report.push_str(&format!(
            "\nUtilization {}-{} ({} = {:.2}): combined {:.*}%, scheduled {:.*}%\n",
            format_minutes(u.start),
            format_minutes(u.end),
            u.denominator,
            u.capacity,
            places,
            u.combined,
            places,
            u.scheduled
        ));

        if !self.calibration.is_empty() {
            match self.target_rate {
                Some(target) => report.push_str(&format!("\nCalibration (target {})\n", target)),
                None => report.push_str("\nCalibration\n"),
            }
            for result in &self.calibration {
                let distance = result
                    .distance
                    .map(|v| format!(" ({:+.*})", places, v))
                    .unwrap_or_default();
                report.push_str(&format!(
                    "  {:<32} {:<28} {:>8.*}%{}\n",
                    result.label, result.semantics, places, result.rate, distance
                ));
            }
        }

        report
    }
}

fn curve_table(anchors: &[u32], columns: &[(&str, &OccupancyCurve)], places: usize) -> String {
    let mut table = format!("{:<6}", "time");
    for (name, _) in columns {
        table.push_str(&format!(" {:>10}", name));
    }
    table.push('\n');
    for (i, &anchor) in anchors.iter().enumerate() {
        table.push_str(&format!("{:<6}", format_minutes(anchor)));
        for (_, curve) in columns {
            let value = curve.values.get(i).copied().unwrap_or(0.0);
            table.push_str(&format!(" {:>10.*}", places, value));
        }
        table.push('\n');
    }
    table
}

/// SHA-256 over the normalized records, in input order
pub fn digest_records(records: &[IntervalRecord]) -> String {
    let mut hasher = Sha256::new();
    for r in records {
        hasher.update(
            format!(
                "{}|{}|{}|{}|{}|{}\n",
                r.date, r.weekday, r.room, r.start, r.end, r.category
            )
            .as_bytes(),
        );
    }
    hex::encode(hasher.finalize())
}

/// Parse raw rows, tagging any failure with its 1-based row number
pub fn parse_rows(rows: &[RawRow]) -> Result<Vec<IntervalRecord>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| IntervalRecord::from_raw(row).map_err(|e| e.at_row(i + 1)))
        .collect()
}

/// Configured occupancy engine
#[derive(Debug, Clone)]
pub struct OccupancyEngine {
    config: EngineConfig,
    registry: RoomRegistry,
    anchors: AnchorSet,
    excluded_weekdays: Vec<Weekday>,
    report_weekdays: Vec<Weekday>,
    utilization_range: (u32, u32),
}

impl OccupancyEngine {
    /// Validate the configuration and build the room registry
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate().map_err(OccupancyError::InvalidConfig)?;
        let anchors = config.anchors.build().map_err(OccupancyError::InvalidConfig)?;
        let excluded_weekdays = config
            .excluded_weekday_set()
            .map_err(OccupancyError::InvalidConfig)?;
        let report_weekdays = config
            .report_weekday_list()
            .map_err(OccupancyError::InvalidConfig)?;
        let utilization_range = config
            .utilization
            .range()
            .map_err(OccupancyError::InvalidConfig)?;

        let registry = RoomRegistry::from_rows(&config.rooms);
        if registry.room_count() == 0 {
            tracing::warn!("Room table has no active rooms; every record will be excluded");
        }
        tracing::debug!(
            "Registry: {} active room(s), {} merged, {} dropped, ceiling {:.2}",
            registry.room_count(),
            registry.merge_map().len(),
            registry.dropped_rooms().len(),
            registry.total_weight()
        );

        Ok(Self {
            config,
            registry,
            anchors,
            excluded_weekdays,
            report_weekdays,
            utilization_range,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn anchors(&self) -> &AnchorSet {
        &self.anchors
    }

    /// Parse and process raw rows; any malformed row aborts the run
    pub fn run(&self, rows: &[RawRow]) -> Result<EngineReport> {
        let records = parse_rows(rows)?;
        Ok(self.run_records(records))
    }

    /// Process already-parsed records
    pub fn run_records(&self, records: Vec<IntervalRecord>) -> EngineReport {
        let input_rows = records.len();
        let inverted_intervals = records.iter().filter(|r| r.is_inverted()).count();
        if inverted_intervals > 0 {
            tracing::warn!(
                "{} record(s) end before they start; kept as-is",
                inverted_intervals
            );
        }
        let input_digest = digest_records(&records);

        let resolved = resolve_records(records, &self.registry);
        let rounding = self.config.rounding;
        let sampler = self.config.semantics.sampler();
        let aggregator =
            DayAggregator::new(&self.anchors, sampler.as_ref(), &self.registry, rounding);

        let overall_filter =
            RecordFilter::all().excluding_weekdays(self.excluded_weekdays.iter().copied());
        let overall_records = overall_filter.apply(&resolved.records);
        let excluded_by_weekday = resolved.records.len() - overall_records.len();

        let for_category = |category: Category| {
            let filter = overall_filter.clone().category(category);
            aggregator.aggregate(&filter.apply(&resolved.records))
        };
        let overall = CategoryBreakdown {
            combined: aggregator.aggregate(&overall_records),
            scheduled: for_category(Category::Scheduled),
            urgent: for_category(Category::Urgent),
            emergency: for_category(Category::Emergency),
        };

        let weekdays = self
            .report_weekdays
            .iter()
            .map(|&weekday| {
                let filter = RecordFilter::all().weekday(weekday);
                let scheduled_filter = filter.clone().category(Category::Scheduled);
                WeekdayBreakdown {
                    weekday,
                    label: weekday_label(weekday).to_string(),
                    combined: aggregator.aggregate(&filter.apply(&resolved.records)),
                    scheduled: aggregator.aggregate(&scheduled_filter.apply(&resolved.records)),
                }
            })
            .collect();

        let consistency =
            ConsistencyChecker::new(self.config.tolerance, self.registry.total_weight())
                .with_max_listed(self.config.max_listed_mismatches)
                .check(&CategoryCurves {
                    scheduled: &overall.scheduled,
                    urgent: &overall.urgent,
                    emergency: &overall.emergency,
                    combined: &overall.combined,
                });

        let denominator = self.config.utilization.denominator;
        let capacity = denominator.resolve(&self.registry);
        let utilization = UtilizationSummary {
            start: self.utilization_range.0,
            end: self.utilization_range.1,
            denominator: denominator.to_string(),
            capacity,
            combined: rounding.output(utilization_rate(
                &overall.combined,
                self.utilization_range,
                capacity,
            )),
            scheduled: rounding.output(utilization_rate(
                &overall.scheduled,
                self.utilization_range,
                capacity,
            )),
        };

        let calibration = if self.config.variants.is_empty() {
            Vec::new()
        } else {
            Calibration {
                records: &overall_records,
                registry: &self.registry,
                anchors: &self.anchors,
                rounding,
                range: self.utilization_range,
                default_denominator: denominator,
            }
            .compare_variants(&self.config.variants, self.config.target_rate)
        };

        let diagnostics = Diagnostics {
            input_rows,
            resolved_records: resolved.records.len(),
            unknown_rooms: resolved.unknown_rooms,
            merged_records: resolved.merged_count,
            inverted_intervals,
            excluded_by_weekday,
            dropped_rooms: self.registry.dropped_rooms().to_vec(),
        };

        tracing::info!(
            "Processed {} record(s) over {} day(s): {} mismatching cell(s), max {:.4} of {:.4}",
            input_rows,
            overall.combined.day_count,
            consistency.mismatch_count,
            consistency.max_observed,
            consistency.ceiling
        );

        EngineReport {
            semantics: self.config.semantics.to_string(),
            anchors: self.anchors.minutes().to_vec(),
            output_places: rounding.output_places,
            ceiling: self.registry.total_weight(),
            overall,
            weekdays,
            consistency,
            utilization,
            target_rate: self.config.target_rate,
            calibration,
            diagnostics,
            input_digest,
        }
    }
}
