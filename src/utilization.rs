//! Utilization rate and calibration variants
//!
//! The utilization rate turns a day-averaged curve into a single percentage:
//! occupancy totals over an anchor range divided by capacity, days and anchors.
//! Calibration runs several named variants (semantics, scope, weighting,
//! denominator) over the same records and ranks them against a target rate.
//! Both are diagnostics; they never change the main curves.

use crate::aggregate::{DayAggregator, OccupancyCurve};
use crate::anchors::AnchorSet;
use crate::record::{Category, IntervalRecord};
use crate::registry::RoomRegistry;
use crate::rounding::RoundingConfig;
use crate::sampler::Semantics;
use crate::time_codec::parse_time_text;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Capacity policy for the utilization denominator
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Denominator {
    /// Sum of active room weights
    #[default]
    WeightSum,
    /// Number of active rooms
    RoomCount,
    /// A fixed capacity
    Fixed { value: f64 },
}

impl Denominator {
    /// Capacity value for a registry
    pub fn resolve(&self, registry: &RoomRegistry) -> f64 {
        match *self {
            Denominator::WeightSum => registry.total_weight(),
            Denominator::RoomCount => registry.room_count() as f64,
            Denominator::Fixed { value } => value,
        }
    }
}

impl fmt::Display for Denominator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denominator::WeightSum => write!(f, "weight-sum"),
            Denominator::RoomCount => write!(f, "room-count"),
            Denominator::Fixed { value } => write!(f, "fixed({})", value),
        }
    }
}

/// Utilization window and capacity policy
///
/// # Example TOML
/// ```toml
/// [utilization]
/// start = "9:00"
/// end = "16:30"
/// denominator = { kind = "fixed", value = 9 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilizationConfig {
    #[serde(default = "default_start")]
    pub start: String,
    #[serde(default = "default_end")]
    pub end: String,
    #[serde(default)]
    pub denominator: Denominator,
}

fn default_start() -> String {
    "9:00".to_string()
}

fn default_end() -> String {
    "16:30".to_string()
}

impl Default for UtilizationConfig {
    fn default() -> Self {
        Self {
            start: default_start(),
            end: default_end(),
            denominator: Denominator::default(),
        }
    }
}

impl UtilizationConfig {
    /// Closed anchor range in minutes
    pub fn range(&self) -> Result<(u32, u32), String> {
        let start = parse_time_text(&self.start).map_err(|e| e.to_string())?;
        let end = parse_time_text(&self.end).map_err(|e| e.to_string())?;
        if end < start {
            return Err(format!(
                "utilization end {:?} precedes start {:?}",
                self.end, self.start
            ));
        }
        Ok((start, end))
    }

    pub fn validate(&self) -> Result<(), String> {
        self.range()?;
        if let Denominator::Fixed { value } = self.denominator {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!(
                    "fixed utilization denominator must be positive, got {}",
                    value
                ));
            }
        }
        Ok(())
    }
}

/// Percentage of capacity used over the anchors in `[range.0, range.1]`
///
/// `Σ totals / (denominator × days × anchors) × 100`, and 0.0 whenever any
/// factor of the divisor is zero.
pub fn utilization_rate(curve: &OccupancyCurve, range: (u32, u32), denominator: f64) -> f64 {
    let (from, to) = range;
    let (sum, slots) = curve
        .anchors
        .iter()
        .zip(&curve.totals)
        .filter(|(anchor, _)| from <= **anchor && **anchor <= to)
        .fold((0.0, 0usize), |(sum, n), (_, total)| (sum + total, n + 1));

    let divisor = denominator * curve.day_count as f64 * slots as f64;
    if divisor <= 0.0 || !divisor.is_finite() {
        return 0.0;
    }
    sum / divisor * 100.0
}

/// Which records a variant samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    #[default]
    All,
    Scheduled,
}

/// Which weights a variant uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Weighting {
    #[default]
    Configured,
    /// Every active room counts 1.0
    Uniform,
}

/// One named calibration variant
///
/// # Example TOML
/// ```toml
/// [[variant]]
/// label = "scheduled, flat weights, fixed 9"
/// scope = "scheduled"
/// weighting = "uniform"
/// denominator = { kind = "fixed", value = 9 }
/// semantics = { kind = "overlap-fraction", window = 30 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub label: String,
    #[serde(default)]
    pub semantics: Semantics,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub weighting: Weighting,
    /// Active rooms left out of this variant
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_rooms: Vec<String>,
    /// Falls back to the utilization denominator when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denominator: Option<Denominator>,
}

impl Variant {
    pub fn new(label: &str, semantics: Semantics) -> Self {
        Self {
            label: label.to_string(),
            semantics,
            scope: Scope::default(),
            weighting: Weighting::default(),
            exclude_rooms: Vec::new(),
            denominator: None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.label.trim().is_empty() {
            return Err("calibration variant needs a label".to_string());
        }
        self.semantics
            .validate()
            .map_err(|e| format!("variant {:?}: {}", self.label, e))
    }
}

/// Outcome of one calibration variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantResult {
    pub label: String,
    pub semantics: String,
    pub denominator: String,
    pub day_count: usize,
    pub rate: f64,
    /// `rate - target`, when a target is configured
    pub distance: Option<f64>,
}

/// Shared inputs of every calibration variant
#[derive(Debug)]
pub struct Calibration<'a> {
    /// Resolved, weekday-filtered records
    pub records: &'a [&'a IntervalRecord],
    pub registry: &'a RoomRegistry,
    pub anchors: &'a AnchorSet,
    pub rounding: RoundingConfig,
    pub range: (u32, u32),
    pub default_denominator: Denominator,
}

impl Calibration<'_> {
    /// Run one variant
    pub fn evaluate(&self, variant: &Variant, target: Option<f64>) -> VariantResult {
        let mut registry = match variant.weighting {
            Weighting::Configured => self.registry.clone(),
            Weighting::Uniform => self.registry.with_uniform_weight(1.0),
        };
        if !variant.exclude_rooms.is_empty() {
            registry = registry.without_rooms(&variant.exclude_rooms);
        }

        let records: Vec<&IntervalRecord> = self
            .records
            .iter()
            .copied()
            .filter(|r| match variant.scope {
                Scope::All => true,
                Scope::Scheduled => r.category == Category::Scheduled,
            })
            .filter(|r| registry.is_active(&r.room))
            .collect();

        let sampler = variant.semantics.sampler();
        let curve = DayAggregator::new(self.anchors, sampler.as_ref(), &registry, self.rounding)
            .aggregate(&records);

        let denominator = variant.denominator.unwrap_or(self.default_denominator);
        let rate = self
            .rounding
            .output(utilization_rate(&curve, self.range, denominator.resolve(&registry)));

        tracing::debug!(
            "Calibration variant {:?}: {} over {} day(s) = {:.2}%",
            variant.label,
            variant.semantics,
            curve.day_count,
            rate
        );

        VariantResult {
            label: variant.label.clone(),
            semantics: variant.semantics.to_string(),
            denominator: denominator.to_string(),
            day_count: curve.day_count,
            rate,
            distance: target.map(|t| self.rounding.output(rate - t)),
        }
    }

    /// Run every variant, closest to `target` first (input order without a target)
    pub fn compare_variants(&self, variants: &[Variant], target: Option<f64>) -> Vec<VariantResult> {
        let mut results: Vec<VariantResult> =
            variants.iter().map(|v| self.evaluate(v, target)).collect();
        if target.is_some() {
            results.sort_by(|a, b| {
                let da = a.distance.map_or(f64::INFINITY, f64::abs);
                let db = b.distance.map_or(f64::INFINITY, f64::abs);
                da.total_cmp(&db)
            });
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};

    fn registry() -> RoomRegistry {
        RoomRegistry::from_weights(vec![
            ("01A".to_string(), 0.5),
            ("02".to_string(), 1.0),
            ("ｱﾝｷﾞｵ".to_string(), 0.5),
        ])
    }

    fn rec(day: u32, room: &str, start: u32, end: u32, category: Category) -> IntervalRecord {
        let date = NaiveDate::from_ymd_opt(2025, 9, day).unwrap();
        IntervalRecord {
            date,
            weekday: date.weekday(),
            room: room.to_string(),
            start,
            end,
            category,
        }
    }

    fn curve(anchors: Vec<u32>, totals: Vec<f64>, day_count: usize) -> OccupancyCurve {
        OccupancyCurve {
            values: vec![0.0; anchors.len()],
            anchors,
            totals,
            day_count,
            days: Vec::new(),
        }
    }

    #[test]
    fn test_rate_over_range() {
        let c = curve(vec![480, 540, 570, 1200], vec![9.0, 2.0, 1.0, 9.0], 2);
        // (2 + 1) / (1.5 * 2 days * 2 anchors) * 100
        let rate = utilization_rate(&c, (540, 990), 1.5);
        assert!((rate - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_rate_zero_factors() {
        let c = curve(vec![540], vec![1.0], 0);
        assert_eq!(utilization_rate(&c, (540, 990), 2.0), 0.0);
        let c = curve(vec![540], vec![1.0], 1);
        assert_eq!(utilization_rate(&c, (600, 990), 2.0), 0.0);
        assert_eq!(utilization_rate(&c, (540, 990), 0.0), 0.0);
    }

    #[test]
    fn test_denominator_policies() {
        let registry = registry();
        assert_eq!(Denominator::WeightSum.resolve(&registry), 2.0);
        assert_eq!(Denominator::RoomCount.resolve(&registry), 3.0);
        assert_eq!(Denominator::Fixed { value: 9.0 }.resolve(&registry), 9.0);
    }

    #[test]
    fn test_config_defaults_and_validation() {
        let config = UtilizationConfig::default();
        assert_eq!(config.range().unwrap(), (540, 990));
        assert!(config.validate().is_ok());

        let reversed = UtilizationConfig {
            start: "16:30".to_string(),
            end: "9:00".to_string(),
            ..Default::default()
        };
        assert!(reversed.validate().is_err());

        let zero = UtilizationConfig {
            denominator: Denominator::Fixed { value: 0.0 },
            ..Default::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_config_from_toml() {
        let config: UtilizationConfig =
            toml::from_str("denominator = { kind = \"fixed\", value = 9 }").unwrap();
        assert_eq!(config.denominator, Denominator::Fixed { value: 9.0 });
        assert_eq!(config.start, "9:00");
    }

    #[test]
    fn test_calibration_ranks_by_distance() {
        let registry = registry();
        let anchors = AnchorSet::from_minutes(vec![540, 600]);
        let records = vec![
            rec(1, "02", 500, 700, Category::Scheduled),
            rec(1, "01A", 500, 700, Category::Urgent),
            rec(1, "ｱﾝｷﾞｵ", 500, 700, Category::Scheduled),
        ];
        let refs: Vec<&IntervalRecord> = records.iter().collect();
        let calibration = Calibration {
            records: &refs,
            registry: &registry,
            anchors: &anchors,
            rounding: RoundingConfig::default(),
            range: (540, 600),
            default_denominator: Denominator::WeightSum,
        };

        let all = Variant::new("all", Semantics::PointSample);
        let scheduled = Variant {
            scope: Scope::Scheduled,
            ..Variant::new("scheduled", Semantics::PointSample)
        };
        let flat_without_angio = Variant {
            weighting: Weighting::Uniform,
            exclude_rooms: vec!["ｱﾝｷﾞｵ".to_string()],
            denominator: Some(Denominator::Fixed { value: 4.0 }),
            ..Variant::new("flat", Semantics::PointSample)
        };

        let results =
            calibration.compare_variants(&[all, scheduled, flat_without_angio], Some(70.0));
        let labels: Vec<&str> = results.iter().map(|r| r.label.as_str()).collect();
        // all = 100%, scheduled = 75%, flat = 2 rooms / 4 = 50%
        assert_eq!(labels, vec!["scheduled", "flat", "all"]);
        assert_eq!(results[0].rate, 75.0);
        assert_eq!(results[0].distance, Some(5.0));
        assert_eq!(results[1].rate, 50.0);
        assert_eq!(results[1].distance, Some(-20.0));
        assert_eq!(results[1].denominator, "fixed(4)");
        assert_eq!(results[2].rate, 100.0);
    }

    #[test]
    fn test_calibration_without_target_keeps_order() {
        let registry = registry();
        let anchors = AnchorSet::canonical();
        let calibration = Calibration {
            records: &[],
            registry: &registry,
            anchors: &anchors,
            rounding: RoundingConfig::default(),
            range: (540, 990),
            default_denominator: Denominator::RoomCount,
        };
        let results = calibration.compare_variants(
            &[
                Variant::new("b", Semantics::PointSample),
                Variant::new("a", Semantics::minute_averaged()),
            ],
            None,
        );
        assert_eq!(results[0].label, "b");
        assert_eq!(results[0].rate, 0.0);
        assert_eq!(results[1].distance, None);
    }
}
