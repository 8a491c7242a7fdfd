use crate::error::{OccupancyError, Result};
use crate::registry::definition::{read_weight_rows, RoomRow};
use std::collections::HashMap;

/// Identifier minus its trailing alphabetic suffix ("01B" → "01")
pub fn room_prefix(id: &str) -> &str {
    id.trim_end_matches(char::is_alphabetic)
}

/// Configured operating rooms, their weights, and the merge map
///
/// Built once from configuration and read-only afterwards. Zero-weight rooms
/// are never aggregation targets; each is folded into the first positive-weight
/// room (in configuration order) sharing its identifier prefix.
///
/// # Example
/// ```
/// use ortrend::registry::RoomRegistry;
///
/// let registry = RoomRegistry::from_weights(vec![
///     ("01A".to_string(), 0.5),
///     ("01B".to_string(), 0.0),
///     ("02".to_string(), 1.0),
/// ]);
/// assert_eq!(registry.resolve_room("01B"), "01A");
/// assert!(registry.weight_of("01B").is_err());
/// assert_eq!(registry.weight_of(registry.resolve_room("01B")).unwrap(), 0.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RoomRegistry {
    /// Active rooms in configuration order
    order: Vec<String>,

    /// Active room → weight (> 0)
    weights: HashMap<String, f64>,

    /// Zero-weight room → active target
    merge_map: HashMap<String, String>,

    /// Zero-weight rooms with no sibling to merge into
    dropped: Vec<String>,
}

impl RoomRegistry {
    /// Build from ordered (room, weight) pairs
    pub fn from_weights<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let rows: Vec<(String, f64)> = rows.into_iter().collect();

        let mut order = Vec::new();
        let mut weights = HashMap::new();
        for (id, weight) in &rows {
            if *weight <= 0.0 {
                continue;
            }
            if weights.contains_key(id) {
                tracing::warn!("Duplicate room '{}' in weight table, keeping first", id);
                continue;
            }
            weights.insert(id.clone(), *weight);
            order.push(id.clone());
        }

        let mut merge_map = HashMap::new();
        let mut dropped = Vec::new();
        for (id, weight) in &rows {
            if *weight > 0.0
                || weights.contains_key(id)
                || merge_map.contains_key(id)
                || dropped.contains(id)
            {
                continue;
            }
            match Self::merge_candidate(id, &order) {
                Some(target) => {
                    tracing::debug!("Room '{}' merges into '{}'", id, target);
                    merge_map.insert(id.clone(), target.clone());
                }
                None => {
                    tracing::warn!(
                        "Zero-weight room '{}' has no weighted sibling; its records are dropped",
                        id
                    );
                    dropped.push(id.clone());
                }
            }
        }

        Self {
            order,
            weights,
            merge_map,
            dropped,
        }
    }

    /// Build from configuration rows (stops at the first malformed row)
    pub fn from_rows(rows: &[RoomRow]) -> Self {
        Self::from_weights(read_weight_rows(rows))
    }

    fn merge_candidate<'a>(id: &str, active: &'a [String]) -> Option<&'a String> {
        let prefix = room_prefix(id);
        if prefix.is_empty() {
            return None;
        }
        active
            .iter()
            .find(|candidate| candidate.as_str() != id && room_prefix(candidate) == prefix)
    }

    /// Apply the merge map; identity for everything else
    pub fn resolve_room<'a>(&'a self, id: &'a str) -> &'a str {
        self.merge_map.get(id).map(String::as_str).unwrap_or(id)
    }

    /// Weight of an active room
    pub fn weight_of(&self, id: &str) -> Result<f64> {
        self.weights
            .get(id)
            .copied()
            .ok_or_else(|| OccupancyError::UnknownRoom(id.to_string()))
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.weights.contains_key(id)
    }

    /// Sum of active weights: the ceiling for any occupancy value
    pub fn total_weight(&self) -> f64 {
        self.order.iter().map(|id| self.weights[id]).sum()
    }

    /// Active rooms in configuration order
    pub fn active_rooms(&self) -> &[String] {
        &self.order
    }

    pub fn room_count(&self) -> usize {
        self.order.len()
    }

    pub fn merge_map(&self) -> &HashMap<String, String> {
        &self.merge_map
    }

    pub fn dropped_rooms(&self) -> &[String] {
        &self.dropped
    }

    /// Same rooms and merges, every active room weighted `weight`
    pub fn with_uniform_weight(&self, weight: f64) -> Self {
        let mut registry = self.clone();
        for value in registry.weights.values_mut() {
            *value = weight;
        }
        registry
    }

    /// Same registry minus the given active rooms (and anything merging into them)
    pub fn without_rooms(&self, excluded: &[String]) -> Self {
        let mut registry = self.clone();
        registry.order.retain(|id| !excluded.contains(id));
        registry.weights.retain(|id, _| !excluded.contains(id));
        registry
            .merge_map
            .retain(|source, target| !excluded.contains(source) && !excluded.contains(target));
        registry
    }
}
