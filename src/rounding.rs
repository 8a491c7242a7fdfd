//! Decimal rounding for reported occupancy values
//!
//! Output tables use 2 places and verification detail uses 4. The tie rule
//! matters at the 0.01 level the consistency checker compares at, so it is
//! configuration rather than a hard-coded choice.

use serde::{Deserialize, Serialize};

/// Tie-breaking rule for rounding to a fixed number of decimal places
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoundingMode {
    /// Ties away from zero (0.125 → 0.13)
    HalfUp,
    /// Ties to the even neighbour on the exact binary value (0.125 → 0.12,
    /// 2.675 → 2.67), as spreadsheet scripting tools do
    #[default]
    HalfEven,
}

/// Rounding configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingConfig {
    #[serde(default)]
    pub mode: RoundingMode,
    /// Places for reported curves
    #[serde(default = "default_output_places")]
    pub output_places: u32,
    /// Places for per-day verification tables
    #[serde(default = "default_detail_places")]
    pub detail_places: u32,
}

fn default_output_places() -> u32 {
    2
}

fn default_detail_places() -> u32 {
    4
}

impl Default for RoundingConfig {
    fn default() -> Self {
        Self {
            mode: RoundingMode::default(),
            output_places: default_output_places(),
            detail_places: default_detail_places(),
        }
    }
}

impl RoundingConfig {
    pub fn output(&self, value: f64) -> f64 {
        round_to(value, self.output_places, self.mode)
    }

    pub fn detail(&self, value: f64) -> f64 {
        round_to(value, self.detail_places, self.mode)
    }
}

/// Relative slack used to recognise a half-up tie after scaling
const TIE_EPSILON: f64 = 1e-9;

/// Enough fractional digits to print any finite `f64` exactly
const EXACT_DIGITS: usize = 1100;

/// Round `value` to `places` decimal places using `mode`
///
/// `HalfEven` rounds the exact binary value, so 2.675 (stored as
/// 2.67499999...) becomes 2.67 and only exactly representable halves such as
/// 0.125 are ties. `HalfUp` detects ties on the scaled value with a small
/// tolerance, so 0.125 and 2.675 alike round away from zero.
pub fn round_to(value: f64, places: u32, mode: RoundingMode) -> f64 {
    if !value.is_finite() {
        return value;
    }
    match mode {
        RoundingMode::HalfEven => round_half_even_exact(value, places),
        RoundingMode::HalfUp => round_half_up_tolerant(value, places),
    }
}

fn round_half_up_tolerant(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    let scaled = value * factor;
    let floor = scaled.floor();
    let fraction = scaled - floor;
    let is_tie = (fraction - 0.5).abs() <= TIE_EPSILON * scaled.abs().max(1.0);

    let rounded = match (is_tie, value >= 0.0) {
        (false, _) => scaled.round(),
        (true, true) => floor + 1.0,
        (true, false) => floor,
    };
    rounded / factor
}

/// Decimal rounding on the exact expansion of `value`, ties to even
fn round_half_even_exact(value: f64, places: u32) -> f64 {
    // already an integer at f64 precision, or more places than f64 carries
    if value.abs() >= 1e17 || places > 17 {
        return value;
    }
    let width = places as usize;
    let exact = format!("{:.*}", EXACT_DIGITS, value.abs());
    let (whole, fraction) = match exact.split_once('.') {
        Some(parts) => parts,
        None => return value,
    };
    let (kept, rest) = fraction.split_at(width);

    let mut units: i128 = match format!("{}{}", whole, kept).parse() {
        Ok(units) => units,
        Err(_) => return value,
    };
    let mut rest = rest.bytes();
    let round_up = match rest.next() {
        Some(digit) if digit > b'5' => true,
        Some(b'5') => rest.any(|digit| digit != b'0') || units % 2 == 1,
        _ => false,
    };
    if round_up {
        units += 1;
    }

    let sign = if value.is_sign_negative() { "-" } else { "" };
    let text = if width == 0 {
        format!("{}{}", sign, units)
    } else {
        let scale = 10i128.pow(places);
        format!("{}{}.{:0width$}", sign, units / scale, units % scale, width = width)
    };
    text.parse().unwrap_or(value)
}
