//! Comfort score: a 0-100 index of how pleasant the room is.
//!
//! The score starts at 100 and loses points for temperature and humidity
//! away from their ideal bands.
//!
//! ```
//! use homeclimate_core::comfort::{ComfortLevel, comfort_score};
//!
//! assert_eq!(comfort_score(22.0, 50.0), 100);
//! assert_eq!(comfort_score(18.0, 50.0), 86);
//! assert_eq!(ComfortLevel::from_score(86), ComfortLevel::Excellent);
//! ```

use serde::{Deserialize, Serialize};

/// Centre of the ideal temperature band (°C).
pub const IDEAL_TEMPERATURE: f64 = 22.0;
/// Lower edge of the ideal temperature band (°C).
pub const TEMPERATURE_BAND_LOW: f64 = 20.0;
/// Upper edge of the ideal temperature band (°C).
pub const TEMPERATURE_BAND_HIGH: f64 = 24.0;
/// Points lost per °C beyond the tolerance around [`IDEAL_TEMPERATURE`].
pub const TEMPERATURE_PENALTY_PER_DEGREE: f64 = 7.0;
/// Cap on the temperature penalty.
pub const MAX_TEMPERATURE_PENALTY: f64 = 30.0;
/// Flat penalty inside the band but outside [21, 22] °C.
pub const NEAR_IDEAL_PENALTY: f64 = 2.0;

/// Centre of the ideal humidity band (%).
pub const IDEAL_HUMIDITY: f64 = 50.0;
/// Lower edge of the ideal humidity band (%).
pub const HUMIDITY_BAND_LOW: f64 = 40.0;
/// Upper edge of the ideal humidity band (%).
pub const HUMIDITY_BAND_HIGH: f64 = 60.0;
/// Tolerance around [`IDEAL_HUMIDITY`] before penalties apply (%).
pub const HUMIDITY_TOLERANCE: f64 = 2.0;
/// Cap on the humidity penalty.
pub const MAX_HUMIDITY_PENALTY: f64 = 20.0;

const TEMPERATURE_TOLERANCE: f64 = 2.0;

/// Compute the comfort score for a temperature (°C) and relative humidity (%).
///
/// Temperature outside [20, 24] °C loses `min((|22 - t| - 2) * 7, 30)`;
/// inside the band but outside [21, 22] °C it loses a flat 2. Humidity outside
/// [40, 60] % loses `min(max(0, |50 - h| - 2), 20)`. The result is rounded and
/// floored at 0.
pub fn comfort_score(temperature: f64, humidity: f64) -> u8 {
    let mut score: f64 = 100.0;

    if !(TEMPERATURE_BAND_LOW..=TEMPERATURE_BAND_HIGH).contains(&temperature) {
        let deviation = (IDEAL_TEMPERATURE - temperature).abs();
        score -= ((deviation - TEMPERATURE_TOLERANCE) * TEMPERATURE_PENALTY_PER_DEGREE)
            .min(MAX_TEMPERATURE_PENALTY);
    } else if !(21.0..=IDEAL_TEMPERATURE).contains(&temperature) {
        score -= NEAR_IDEAL_PENALTY;
    }

    if !(HUMIDITY_BAND_LOW..=HUMIDITY_BAND_HIGH).contains(&humidity) {
        let deviation = ((IDEAL_HUMIDITY - humidity).abs() - HUMIDITY_TOLERANCE).max(0.0);
        score -= deviation.min(MAX_HUMIDITY_PENALTY);
    }

    // Never exceeds 100 since every term only subtracts.
    score.round().max(0.0) as u8
}

/// Qualitative label for a comfort score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComfortLevel {
    /// Score below 40.
    Poor,
    /// Score 40-59.
    Fair,
    /// Score 60-79.
    Good,
    /// Score 80 and above.
    Excellent,
}

impl ComfortLevel {
    /// Label a score.
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => ComfortLevel::Excellent,
            60..=79 => ComfortLevel::Good,
            40..=59 => ComfortLevel::Fair,
            _ => ComfortLevel::Poor,
        }
    }

    /// Display name.
    pub fn label(&self) -> &'static str {
        match self {
            ComfortLevel::Excellent => "Excellent",
            ComfortLevel::Good => "Good",
            ComfortLevel::Fair => "Fair",
            ComfortLevel::Poor => "Poor",
        }
    }
}

impl std::fmt::Display for ComfortLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
