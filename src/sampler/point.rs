use crate::sampler::{DayGroup, OccupancySampler};

/// Instantaneous snapshot: active iff `start <= anchor < end`
///
/// A surgery ending exactly at the anchor does not count; one starting
/// exactly at the anchor does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointSampler;

impl OccupancySampler for PointSampler {
    fn sample(&self, day: &DayGroup, anchor: u32) -> f64 {
        day.rooms()
            .iter()
            .filter(|room| {
                room.spans
                    .iter()
                    .any(|&(start, end)| start <= anchor && anchor < end)
            })
            .map(|room| room.weight)
            .sum()
    }

    fn describe(&self) -> String {
        "point sample start <= anchor < end".to_string()
    }
}
