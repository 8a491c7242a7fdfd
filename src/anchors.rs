//! Anchor sets: the minute-of-day columns of every occupancy table

use crate::time_codec::{format_minutes, parse_time_text};
use serde::{Deserialize, Serialize};

/// Anchor layout as written in configuration
///
/// # Example TOML
/// ```toml
/// [anchors]
/// start = "8:00"
/// end = "20:00"
/// step_minutes = 30
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorSpec {
    pub start: String,
    pub end: String,
    pub step_minutes: u32,
}

impl Default for AnchorSpec {
    fn default() -> Self {
        Self {
            start: "8:00".to_string(),
            end: "20:00".to_string(),
            step_minutes: 30,
        }
    }
}

impl AnchorSpec {
    /// Build the anchor set, inclusive of `end` when it falls on a step
    pub fn build(&self) -> Result<AnchorSet, String> {
        let start = parse_time_text(&self.start).map_err(|e| e.to_string())?;
        let end = parse_time_text(&self.end).map_err(|e| e.to_string())?;
        AnchorSet::stepped(start, end, self.step_minutes)
    }
}

/// Ordered anchor minutes with a fixed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorSet {
    minutes: Vec<u32>,
}

impl AnchorSet {
    /// Anchors `start, start+step, ...` up to and including `end`
    pub fn stepped(start: u32, end: u32, step: u32) -> Result<Self, String> {
        if step == 0 {
            return Err("anchor step must be positive".to_string());
        }
        if end < start {
            return Err(format!(
                "anchor end {} precedes start {}",
                format_minutes(end),
                format_minutes(start)
            ));
        }
        let minutes = (start..=end).step_by(step as usize).collect();
        Ok(Self { minutes })
    }

    /// 8:00 to 20:00 every 30 minutes (25 anchors)
    pub fn canonical() -> Self {
        Self {
            minutes: (480..=1200).step_by(30).collect(),
        }
    }

    /// Anchors from an explicit list, sorted and deduplicated
    pub fn from_minutes(mut minutes: Vec<u32>) -> Self {
        minutes.sort_unstable();
        minutes.dedup();
        Self { minutes }
    }

    pub fn minutes(&self) -> &[u32] {
        &self.minutes
    }

    pub fn len(&self) -> usize {
        self.minutes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.minutes.is_empty()
    }

    /// `H:MM` labels in anchor order
    pub fn labels(&self) -> Vec<String> {
        self.minutes.iter().map(|&m| format_minutes(m)).collect()
    }

    /// Indices of anchors lying in the closed range `[from, to]`
    pub fn indices_within(&self, from: u32, to: u32) -> Vec<usize> {
        self.minutes
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| (from <= m && m <= to).then_some(i))
            .collect()
    }
}
