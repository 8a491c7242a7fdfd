use crate::record::IntervalRecord;
use crate::registry::RoomRegistry;
use chrono::{NaiveDate, Weekday};

/// One room's intervals within a day
#[derive(Debug, Clone, PartialEq)]
pub struct RoomIntervals {
    pub room: String,
    pub weight: f64,
    /// Inclusive (start, end) minute pairs in input order
    pub spans: Vec<(u32, u32)>,
}

/// All records of one calendar date, indexed by room
///
/// Rooms appear in registry order so every sampler sums weights in the same
/// order and results are bit-for-bit reproducible.
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub weekday: Weekday,
    rooms: Vec<RoomIntervals>,
}

impl DayGroup {
    /// Index one day's resolved records by room
    ///
    /// Records in rooms the registry does not know are skipped; callers are
    /// expected to have resolved rooms already.
    pub fn build(date: NaiveDate, records: &[&IntervalRecord], registry: &RoomRegistry) -> Self {
        let weekday = records.first().map(|r| r.weekday).unwrap_or_else(|| {
            use chrono::Datelike;
            date.weekday()
        });

        let rooms = registry
            .active_rooms()
            .iter()
            .filter_map(|room| {
                let spans: Vec<(u32, u32)> = records
                    .iter()
                    .filter(|r| &r.room == room)
                    .map(|r| (r.start, r.end))
                    .collect();
                if spans.is_empty() {
                    return None;
                }
                let weight = registry.weight_of(room).ok()?;
                Some(RoomIntervals {
                    room: room.clone(),
                    weight,
                    spans,
                })
            })
            .collect();

        Self {
            date,
            weekday,
            rooms,
        }
    }

    pub fn rooms(&self) -> &[RoomIntervals] {
        &self.rooms
    }

    /// Sum of weights of rooms present this day: the per-day ceiling
    pub fn present_weight(&self) -> f64 {
        self.rooms.iter().map(|r| r.weight).sum()
    }

    pub fn record_count(&self) -> usize {
        self.rooms.iter().map(|r| r.spans.len()).sum()
    }
}
