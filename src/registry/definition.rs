use serde::{Deserialize, Serialize};

/// A weight cell as it appears in configuration: a number, or text that may
/// or may not hold one
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum WeightCell {
    Number(f64),
    Text(String),
}

impl WeightCell {
    /// Numeric weight, or `None` when the cell is not a usable weight
    ///
    /// Negative and non-finite values are not usable.
    pub fn as_weight(&self) -> Option<f64> {
        let value = match self {
            WeightCell::Number(n) => *n,
            WeightCell::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        (value.is_finite() && value >= 0.0).then_some(value)
    }
}

/// One configured room row
///
/// # Example TOML
/// ```toml
/// [[room]]
/// id = "01B"
/// weight = 0          # merged into 01A
/// description = "minor procedure bay"
/// ```
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RoomRow {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<WeightCell>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RoomRow {
    pub fn new(id: &str, weight: f64) -> Self {
        Self {
            id: id.to_string(),
            weight: Some(WeightCell::Number(weight)),
            description: None,
        }
    }
}

/// Read (room, weight) pairs up to the first row without a usable weight
pub fn read_weight_rows(rows: &[RoomRow]) -> Vec<(String, f64)> {
    let mut weights = Vec::new();
    for row in rows {
        match row.weight.as_ref().and_then(WeightCell::as_weight) {
            Some(weight) => weights.push((row.id.trim().to_string(), weight)),
            None => {
                tracing::debug!("Room table ends at row {:?}", row.id);
                break;
            }
        }
    }
    weights
}

/// Read labels up to the first blank entry
pub fn read_label_list(entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .map(|e| e.trim())
        .take_while(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}
