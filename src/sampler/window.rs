use crate::sampler::{DayGroup, OccupancySampler};

/// Closed-window intersection around the anchor
///
/// A room is active when any of its intervals `[start, end]` intersects
/// `[anchor + offset_a, anchor + offset_b]`. Boundary ties count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowOverlapSampler {
    offset_a: i32,
    offset_b: i32,
}

impl WindowOverlapSampler {
    pub fn new(offset_a: i32, offset_b: i32) -> Self {
        Self { offset_a, offset_b }
    }

    /// Closed window bounds for an anchor
    pub fn window(&self, anchor: u32) -> (i64, i64) {
        (
            anchor as i64 + self.offset_a as i64,
            anchor as i64 + self.offset_b as i64,
        )
    }
}

impl OccupancySampler for WindowOverlapSampler {
    fn sample(&self, day: &DayGroup, anchor: u32) -> f64 {
        let (a, b) = self.window(anchor);
        day.rooms()
            .iter()
            .filter(|room| {
                room.spans
                    .iter()
                    .any(|&(start, end)| a <= end as i64 && start as i64 <= b)
            })
            .map(|room| room.weight)
            .sum()
    }

    fn describe(&self) -> String {
        format!(
            "window overlap [anchor{:+}, anchor{:+}] (closed)",
            self.offset_a, self.offset_b
        )
    }
}
