// Engine configuration
//
// Everything the engine needs besides the records themselves: the room weight
// table, weekday exclusion, anchor layout, sampling semantics, rounding, the
// consistency tolerance, and the utilization/calibration settings. Loaded from
// TOML; CLI flags override individual fields afterwards.

use crate::anchors::AnchorSpec;
use crate::record::parse_weekday;
use crate::registry::{read_label_list, RoomRow};
use crate::rounding::RoundingConfig;
use crate::sampler::Semantics;
use crate::utilization::{UtilizationConfig, Variant};
use anyhow::{Context, Result};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for one engine run
///
/// # Example
/// ```
/// use ortrend::config::EngineConfig;
///
/// let config = EngineConfig::from_toml_str(r#"
///     excluded_weekdays = ["土曜日"]
///
///     [[room]]
///     id = "01A"
///     weight = 0.5
///
///     [[room]]
///     id = "01B"
///     weight = 0
/// "#)?;
/// assert_eq!(config.tolerance, 0.01);
/// assert_eq!(config.rooms.len(), 2);
/// assert!(config.validate().is_ok());
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Weekday labels dropped from the overall curves (stops at the first blank)
    #[serde(default)]
    pub excluded_weekdays: Vec<String>,

    /// Weekdays given their own per-weekday curves
    #[serde(default = "default_report_weekdays")]
    pub report_weekdays: Vec<String>,

    /// Allowed |split - combined| difference per cell
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Mismatching cells listed individually in the consistency report
    #[serde(default = "default_max_listed_mismatches")]
    pub max_listed_mismatches: usize,

    #[serde(default)]
    pub anchors: AnchorSpec,

    #[serde(default)]
    pub semantics: Semantics,

    #[serde(default)]
    pub rounding: RoundingConfig,

    #[serde(default)]
    pub utilization: UtilizationConfig,

    /// Utilization rate the calibration variants are ranked against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_rate: Option<f64>,

    #[serde(default, rename = "variant", skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<Variant>,

    /// Room weight table in configuration order (stops at the first malformed row)
    #[serde(default, rename = "room")]
    pub rooms: Vec<RoomRow>,
}

fn default_report_weekdays() -> Vec<String> {
    ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_tolerance() -> f64 {
    0.01
}

fn default_max_listed_mismatches() -> usize {
    20
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            excluded_weekdays: Vec::new(),
            report_weekdays: default_report_weekdays(),
            tolerance: default_tolerance(),
            max_listed_mismatches: default_max_listed_mismatches(),
            anchors: AnchorSpec::default(),
            semantics: Semantics::default(),
            rounding: RoundingConfig::default(),
            utilization: UtilizationConfig::default(),
            target_rate: None,
            variants: Vec::new(),
            rooms: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns error if the file can't be read or isn't valid TOML for this schema.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML engine configuration")
    }

    /// Excluded weekdays, read up to the first blank label
    pub fn excluded_weekday_set(&self) -> Result<Vec<Weekday>, String> {
        parse_labels(&read_label_list(&self.excluded_weekdays))
    }

    /// Weekdays with their own breakdown, in configured order
    pub fn report_weekday_list(&self) -> Result<Vec<Weekday>, String> {
        let mut weekdays = parse_labels(&read_label_list(&self.report_weekdays))?;
        let mut seen = Vec::new();
        weekdays.retain(|w| {
            let fresh = !seen.contains(w);
            seen.push(*w);
            fresh
        });
        Ok(weekdays)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(format!(
                "tolerance must be non-negative, got {}",
                self.tolerance
            ));
        }

        let anchors = self.anchors.build()?;
        if anchors.is_empty() {
            return Err("anchor set is empty".to_string());
        }

        self.semantics.validate()?;
        self.utilization.validate()?;
        self.excluded_weekday_set()?;
        self.report_weekday_list()?;

        if self.rounding.output_places > 10 || self.rounding.detail_places > 10 {
            return Err(format!(
                "rounding places must be <= 10, got output={} detail={}",
                self.rounding.output_places, self.rounding.detail_places
            ));
        }

        if let Some(target) = self.target_rate {
            if !target.is_finite() {
                return Err(format!("target_rate must be finite, got {}", target));
            }
        }

        for variant in &self.variants {
            variant.validate()?;
        }

        Ok(())
    }
}

fn parse_labels(labels: &[String]) -> Result<Vec<Weekday>, String> {
    labels
        .iter()
        .map(|label| parse_weekday(label).map_err(|e| e.to_string()))
        .collect()
}
