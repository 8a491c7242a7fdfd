use crate::sampler::{DayGroup, OccupancySampler};

/// Fraction of the window `[anchor, anchor + window - 1]` a room was in use
///
/// Overlap minutes are inclusive and summed over a room's intervals, then
/// capped at the window length, so overlapping bookings in one room never
/// count the same minute range twice beyond a full window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapFractionSampler {
    window: u32,
}

impl OverlapFractionSampler {
    pub fn new(window: u32) -> Self {
        Self { window }
    }

    fn overlap_minutes(&self, spans: &[(u32, u32)], anchor: u32) -> u32 {
        let lo = anchor;
        let hi = anchor.saturating_add(self.window - 1);
        let minutes: u32 = spans
            .iter()
            .filter_map(|&(start, end)| {
                let from = start.max(lo);
                let to = end.min(hi);
                (from <= to).then(|| to - from + 1)
            })
            .sum();
        minutes.min(self.window)
    }
}

impl OccupancySampler for OverlapFractionSampler {
    fn sample(&self, day: &DayGroup, anchor: u32) -> f64 {
        if self.window == 0 {
            return 0.0;
        }
        day.rooms()
            .iter()
            .map(|room| {
                let minutes = self.overlap_minutes(&room.spans, anchor);
                room.weight * minutes as f64 / self.window as f64
            })
            .sum()
    }

    fn describe(&self) -> String {
        format!("overlap fraction of a {}-minute window", self.window)
    }
}
