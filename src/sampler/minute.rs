use crate::sampler::{DayGroup, OccupancySampler};

/// Per-minute sampling over `[anchor, anchor + window - 1]`, averaged
///
/// Membership at each minute is closed on both ends (`start <= m <= end`),
/// unlike [`PointSampler`](crate::sampler::PointSampler). Cost is
/// O(window × records) per anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteAveragedSampler {
    window: u32,
}

impl MinuteAveragedSampler {
    pub fn new(window: u32) -> Self {
        Self { window }
    }

    fn weight_at(day: &DayGroup, minute: u32) -> f64 {
        day.rooms()
            .iter()
            .filter(|room| {
                room.spans
                    .iter()
                    .any(|&(start, end)| start <= minute && minute <= end)
            })
            .map(|room| room.weight)
            .sum()
    }
}

impl OccupancySampler for MinuteAveragedSampler {
    fn sample(&self, day: &DayGroup, anchor: u32) -> f64 {
        if self.window == 0 {
            return 0.0;
        }
        let total: f64 = (anchor..anchor.saturating_add(self.window))
            .map(|minute| Self::weight_at(day, minute))
            .sum();
        total / self.window as f64
    }

    fn describe(&self) -> String {
        format!(
            "minute-averaged over {} minutes, start <= m <= end",
            self.window
        )
    }
}
