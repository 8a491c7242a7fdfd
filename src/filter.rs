//! Record filtering
//!
//! Two independent axes:
//! - room membership: every record's room goes through the merge map and
//!   records whose resolved room is not active are dropped (and counted)
//! - weekday/category predicates: composed per aggregate, so the per-weekday
//!   breakdown can ignore the weekday exclusion the overall curves apply

use crate::record::{Category, IntervalRecord};
use crate::registry::RoomRegistry;
use chrono::Weekday;
use std::collections::{BTreeMap, HashSet};

/// Records after room resolution, with what was dropped along the way
#[derive(Debug, Clone, Default)]
pub struct ResolvedRecords {
    /// Records whose room resolved to an active room (room already rewritten)
    pub records: Vec<IntervalRecord>,
    /// Unknown room → number of records excluded
    pub unknown_rooms: BTreeMap<String, usize>,
    /// Records rewritten through the merge map
    pub merged_count: usize,
}

impl ResolvedRecords {
    pub fn unknown_count(&self) -> usize {
        self.unknown_rooms.values().sum()
    }
}

/// Rewrite rooms through the merge map and drop records outside the registry
pub fn resolve_records(records: Vec<IntervalRecord>, registry: &RoomRegistry) -> ResolvedRecords {
    let mut resolved = ResolvedRecords::default();

    for mut record in records {
        let target = registry.resolve_room(&record.room);
        if !registry.is_active(target) {
            *resolved.unknown_rooms.entry(record.room.clone()).or_default() += 1;
            continue;
        }
        if target != record.room {
            record.room = target.to_string();
            resolved.merged_count += 1;
        }
        resolved.records.push(record);
    }

    for (room, count) in &resolved.unknown_rooms {
        tracing::warn!("Excluded {} record(s) in unknown room '{}'", count, room);
    }

    resolved
}

/// Weekday/category predicate over resolved records
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Weekdays dropped entirely
    excluded_weekdays: HashSet<Weekday>,
    /// Keep only this category (None = all categories)
    category: Option<Category>,
    /// Keep only this weekday (None = every non-excluded weekday)
    weekday: Option<Weekday>,
}

impl RecordFilter {
    /// A filter that keeps every record
    pub fn all() -> Self {
        Self::default()
    }

    pub fn excluding_weekdays<I>(mut self, weekdays: I) -> Self
    where
        I: IntoIterator<Item = Weekday>,
    {
        self.excluded_weekdays.extend(weekdays);
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn weekday(mut self, weekday: Weekday) -> Self {
        self.weekday = Some(weekday);
        self
    }

    /// Check if a record passes every configured predicate
    pub fn should_keep(&self, record: &IntervalRecord) -> bool {
        if self.excluded_weekdays.contains(&record.weekday) {
            return false;
        }
        if let Some(weekday) = self.weekday {
            if record.weekday != weekday {
                return false;
            }
        }
        match self.category {
            None => true,
            Some(category) => record.category == category,
        }
    }

    pub fn apply<'a>(&self, records: &'a [IntervalRecord]) -> Vec<&'a IntervalRecord> {
        records.iter().filter(|r| self.should_keep(r)).collect()
    }
}
