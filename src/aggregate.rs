//! Day Aggregator
//!
//! Groups resolved records by calendar date, samples every day at every
//! anchor, and averages over the number of distinct days actually present.

use crate::anchors::AnchorSet;
use crate::record::IntervalRecord;
use crate::registry::RoomRegistry;
use crate::rounding::RoundingConfig;
use crate::sampler::{DayGroup, OccupancySampler};
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One day's row of the per-day verification table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayProfile {
    pub date: NaiveDate,
    pub weekday: Weekday,
    /// Occupancy per anchor, rounded to detail places
    pub values: Vec<f64>,
}

/// Day-averaged occupancy per anchor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyCurve {
    pub anchors: Vec<u32>,
    /// Day averages, rounded to output places
    pub values: Vec<f64>,
    /// Unrounded per-anchor sums across days
    pub totals: Vec<f64>,
    /// Number of distinct dates sampled
    pub day_count: usize,
    /// Per-day table in date order
    pub days: Vec<DayProfile>,
}

impl OccupancyCurve {
    /// All-zero curve for a pass with no matching days
    pub fn empty(anchors: &AnchorSet) -> Self {
        Self {
            anchors: anchors.minutes().to_vec(),
            values: vec![0.0; anchors.len()],
            totals: vec![0.0; anchors.len()],
            day_count: 0,
            days: Vec::new(),
        }
    }

    /// Ordered (anchor, value) pairs
    pub fn points(&self) -> Vec<(u32, f64)> {
        self.anchors
            .iter()
            .copied()
            .zip(self.values.iter().copied())
            .collect()
    }

    /// Per-day row for a date, if that date was sampled
    pub fn day(&self, date: NaiveDate) -> Option<&DayProfile> {
        self.days.iter().find(|d| d.date == date)
    }

    /// Largest per-day cell value
    pub fn max_cell(&self) -> f64 {
        self.days
            .iter()
            .flat_map(|d| d.values.iter().copied())
            .fold(0.0, f64::max)
    }
}

/// Partition records into day groups, in date order
pub fn group_days(records: &[&IntervalRecord], registry: &RoomRegistry) -> Vec<DayGroup> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&IntervalRecord>> = BTreeMap::new();
    for &record in records {
        by_date.entry(record.date).or_default().push(record);
    }
    by_date
        .into_iter()
        .map(|(date, day_records)| DayGroup::build(date, &day_records, registry))
        .collect()
}

/// Runs one sampler over every day and anchor
#[derive(Debug)]
pub struct DayAggregator<'a> {
    anchors: &'a AnchorSet,
    sampler: &'a dyn OccupancySampler,
    registry: &'a RoomRegistry,
    rounding: RoundingConfig,
}

impl<'a> DayAggregator<'a> {
    pub fn new(
        anchors: &'a AnchorSet,
        sampler: &'a dyn OccupancySampler,
        registry: &'a RoomRegistry,
        rounding: RoundingConfig,
    ) -> Self {
        Self {
            anchors,
            sampler,
            registry,
            rounding,
        }
    }

    /// Aggregate already-filtered records into a day-averaged curve
    pub fn aggregate(&self, records: &[&IntervalRecord]) -> OccupancyCurve {
        let groups = group_days(records, self.registry);
        self.aggregate_groups(&groups)
    }

    /// Aggregate pre-built day groups
    pub fn aggregate_groups(&self, groups: &[DayGroup]) -> OccupancyCurve {
        if groups.is_empty() {
            return OccupancyCurve::empty(self.anchors);
        }

        let mut totals = vec![0.0; self.anchors.len()];
        let mut days = Vec::with_capacity(groups.len());

        for group in groups {
            let mut row = Vec::with_capacity(self.anchors.len());
            for (i, &anchor) in self.anchors.minutes().iter().enumerate() {
                let value = self.sampler.sample(group, anchor);
                totals[i] += value;
                row.push(self.rounding.detail(value));
            }
            days.push(DayProfile {
                date: group.date,
                weekday: group.weekday,
                values: row,
            });
        }

        let day_count = groups.len();
        let values = totals
            .iter()
            .map(|total| self.rounding.output(total / day_count as f64))
            .collect();

        tracing::debug!(
            "Aggregated {} day(s) x {} anchor(s) with {}",
            day_count,
            self.anchors.len(),
            self.sampler.describe()
        );

        OccupancyCurve {
            anchors: self.anchors.minutes().to_vec(),
            values,
            totals,
            day_count,
            days,
        }
    }
}
