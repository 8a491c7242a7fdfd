//! Error taxonomy for the occupancy engine
//!
//! Only the failures that abort a run live here. Unknown rooms during a run,
//! consistency mismatches and ceiling violations are reported as diagnostics
//! instead of being raised.

use thiserror::Error;

/// Errors raised by the occupancy engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OccupancyError {
    #[error("Invalid time format: {0:?} (expected H:MM or H:MM:SS)")]
    InvalidTimeFormat(String),

    #[error("Unknown room: {0}")]
    UnknownRoom(String),

    #[error("Invalid date: {0:?}")]
    InvalidDate(String),

    #[error("Invalid weekday label: {0:?}")]
    InvalidWeekday(String),

    #[error("Invalid category label: {0:?}")]
    InvalidCategory(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Record {row}: {source}")]
    Record {
        row: usize,
        #[source]
        source: Box<OccupancyError>,
    },
}

impl OccupancyError {
    /// Attach the 1-based input row number to a record-level error
    pub fn at_row(self, row: usize) -> Self {
        OccupancyError::Record {
            row,
            source: Box::new(self),
        }
    }
}

/// Result type for occupancy engine operations
pub type Result<T> = std::result::Result<T, OccupancyError>;
