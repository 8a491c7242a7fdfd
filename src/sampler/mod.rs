// Occupancy Sampler
//
// For one day and one anchor minute, compute the weighted number of rooms in
// use. What "in use" means is business-negotiated, so each definition is a
// strategy behind one trait and the aggregator never knows which one it runs:
//
// - window overlap:   interval intersects [anchor+a, anchor+b], ties count
// - point sample:     start <= anchor < end (half-open)
// - minute averaged:  closed start <= m <= end for each minute of the window,
//                     averaged over the window
// - overlap fraction: overlapping minutes / window length, capped at 1
//
// Every room contributes its weight at most once per anchor, so no sampler can
// exceed the sum of the weights of rooms present that day.

mod day;
mod fraction;
mod minute;
mod point;
mod window;

pub use day::{DayGroup, RoomIntervals};
pub use fraction::OverlapFractionSampler;
pub use minute::MinuteAveragedSampler;
pub use point::PointSampler;
pub use window::WindowOverlapSampler;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A definition of "room in use at this anchor"
pub trait OccupancySampler: fmt::Debug + Send + Sync {
    /// Weighted occupancy of `day` at `anchor` (minute of day)
    fn sample(&self, day: &DayGroup, anchor: u32) -> f64;

    /// Short human-readable description of the semantics and its parameters
    fn describe(&self) -> String;
}

/// Configured sampling semantics
///
/// # Example TOML
/// ```toml
/// [semantics]
/// kind = "window-overlap"
/// offset_a = -14
/// offset_b = 15
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Semantics {
    WindowOverlap { offset_a: i32, offset_b: i32 },
    PointSample,
    MinuteAveraged { window: u32 },
    OverlapFraction { window: u32 },
}

impl Default for Semantics {
    fn default() -> Self {
        Semantics::WindowOverlap {
            offset_a: -14,
            offset_b: 15,
        }
    }
}

/// Longest sampling window accepted, one full day
pub const MAX_WINDOW: u32 = 24 * 60;

impl Semantics {
    /// Minute-averaged sampling over the canonical 30-minute window
    pub fn minute_averaged() -> Self {
        Semantics::MinuteAveraged { window: 30 }
    }

    /// Build the sampler implementing these semantics
    pub fn sampler(&self) -> Box<dyn OccupancySampler> {
        match *self {
            Semantics::WindowOverlap { offset_a, offset_b } => {
                Box::new(WindowOverlapSampler::new(offset_a, offset_b))
            }
            Semantics::PointSample => Box::new(PointSampler),
            Semantics::MinuteAveraged { window } => Box::new(MinuteAveragedSampler::new(window)),
            Semantics::OverlapFraction { window } => {
                Box::new(OverlapFractionSampler::new(window))
            }
        }
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            Semantics::WindowOverlap { offset_a, offset_b } if offset_a > offset_b => Err(format!(
                "window offsets must satisfy offset_a <= offset_b, got ({}, {})",
                offset_a, offset_b
            )),
            Semantics::MinuteAveraged { window: 0 } | Semantics::OverlapFraction { window: 0 } => {
                Err("sampling window must be at least one minute".to_string())
            }
            Semantics::MinuteAveraged { window } | Semantics::OverlapFraction { window }
                if window > MAX_WINDOW =>
            {
                Err(format!(
                    "sampling window must not exceed {} minutes, got {}",
                    MAX_WINDOW, window
                ))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Semantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Semantics::WindowOverlap { offset_a, offset_b } => {
                write!(f, "window-overlap({:+}/{:+})", offset_a, offset_b)
            }
            Semantics::PointSample => write!(f, "point-sample"),
            Semantics::MinuteAveraged { window } => write!(f, "minute-averaged({}m)", window),
            Semantics::OverlapFraction { window } => write!(f, "overlap-fraction({}m)", window),
        }
    }
}
