//! Temperature zones and metric optimality thresholds.
//!
//! This module holds the static ranges used to classify the current reading:
//! the temperature zone that drives the display color, and the per-metric
//! "optimal" flags.
//!
//! The time-of-day input is explicit. Callers pass either an `is_sleep_time`
//! flag or a timestamp, so classification is deterministic in tests.
//!
//! # Example
//!
//! ```
//! use homeclimate_core::{TemperatureZone, Thresholds};
//!
//! let thresholds = Thresholds::default();
//!
//! assert_eq!(thresholds.classify_zone(19.0, true), TemperatureZone::Sleep);
//! assert_eq!(thresholds.classify_zone(19.0, false), TemperatureZone::Tolerable);
//! assert_eq!(thresholds.classify_zone(27.0, false), TemperatureZone::Alert);
//! assert!(thresholds.is_sleep_time(23));
//! ```

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use homeclimate_types::Reading;

use crate::error::{Error, Result};

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    /// Lower bound (inclusive).
    pub min: f64,
    /// Upper bound (inclusive).
    pub max: f64,
}

impl Range {
    /// Create a range.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies within `[min, max]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Temperature zone used for the display indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemperatureZone {
    /// Ideal sleeping temperature during sleep hours.
    Sleep,
    /// Ideal daytime temperature outside sleep hours.
    Comfort,
    /// Acceptable but not ideal.
    Tolerable,
    /// Outside the tolerable range.
    Alert,
}

impl TemperatureZone {
    /// Display color as a hex string.
    pub fn color(&self) -> &'static str {
        match self {
            TemperatureZone::Sleep => "#8b5cf6",
            TemperatureZone::Comfort => "#10b981",
            TemperatureZone::Tolerable => "#3b82f6",
            TemperatureZone::Alert => "#ef4444",
        }
    }

    /// Short display name.
    pub fn label(&self) -> &'static str {
        match self {
            TemperatureZone::Sleep => "Sleep",
            TemperatureZone::Comfort => "Comfort",
            TemperatureZone::Tolerable => "Tolerable",
            TemperatureZone::Alert => "Alert",
        }
    }

    /// Human-readable description of the zone.
    pub fn description(&self) -> &'static str {
        match self {
            TemperatureZone::Sleep => "Sleep - ideal for rest",
            TemperatureZone::Comfort => "Comfort - ideal room temperature",
            TemperatureZone::Tolerable => "Tolerable - acceptable but not ideal",
            TemperatureZone::Alert => "Alert - too hot or too cold",
        }
    }
}

impl std::fmt::Display for TemperatureZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-metric optimality flags for the current reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricOptimality {
    /// Humidity within the optimal range.
    pub humidity: bool,
    /// Pressure is always reported optimal; there is no pressure threshold.
    pub pressure: bool,
    /// Gas resistance above the optimal minimum.
    pub gas_resistance: bool,
}

impl MetricOptimality {
    /// Status badge text for a flag: "Good" or "Check".
    pub fn status_label(optimal: bool) -> &'static str {
        if optimal { "Good" } else { "Check" }
    }

    /// Whether every metric is optimal.
    pub fn all_optimal(&self) -> bool {
        self.humidity && self.pressure && self.gas_resistance
    }
}

/// Static classification ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Daytime comfort range (°C).
    pub comfort: Range,
    /// Sleep-time comfort range (°C).
    pub sleep: Range,
    /// Tolerable range (°C).
    pub tolerable: Range,
    /// Range covered by the temperature gauge (°C).
    pub gauge: Range,
    /// Hour (0-23) at which sleep time starts.
    pub sleep_start_hour: u8,
    /// Hour (0-23) at which sleep time ends.
    pub sleep_end_hour: u8,
    /// Optimal humidity range (%).
    pub humidity_optimal: Range,
    /// Gas resistance must exceed this to be optimal (Ω).
    pub gas_resistance_min: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            comfort: Range::new(20.0, 24.0),
            sleep: Range::new(18.0, 20.0),
            tolerable: Range::new(18.0, 26.0),
            gauge: Range::new(10.0, 40.0),
            sleep_start_hour: 22,
            sleep_end_hour: 7,
            humidity_optimal: Range::new(38.0, 62.0),
            gas_resistance_min: 100_000.0,
        }
    }
}

impl ThresholdConfig {
    /// Validate the configuration.
    ///
    /// Checks that every range has `min <= max`, the gauge has a non-zero
    /// width and the sleep hours are valid hours of the day.
    pub fn validate(&self) -> Result<()> {
        let ranges = [
            ("comfort", self.comfort),
            ("sleep", self.sleep),
            ("tolerable", self.tolerable),
            ("humidity_optimal", self.humidity_optimal),
        ];
        for (name, range) in ranges {
            if !(range.min <= range.max) {
                return Err(Error::invalid_config(format!(
                    "{} range min ({}) must not exceed max ({})",
                    name, range.min, range.max
                )));
            }
        }
        if !(self.gauge.min < self.gauge.max) {
            return Err(Error::invalid_config("gauge range must have min < max"));
        }
        if self.sleep_start_hour > 23 || self.sleep_end_hour > 23 {
            return Err(Error::invalid_config("sleep hours must be within 0-23"));
        }
        Ok(())
    }
}

/// Threshold evaluator for readings.
#[derive(Debug, Clone, Default)]
pub struct Thresholds {
    config: ThresholdConfig,
}

impl Thresholds {
    /// Create a new evaluator with the given configuration.
    pub fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Whether `hour` (0-23, local time) falls in sleep time.
    ///
    /// With the defaults this is `hour >= 22 || hour < 7`. A window whose
    /// start is before its end does not wrap midnight.
    pub fn is_sleep_time(&self, hour: u8) -> bool {
        let start = self.config.sleep_start_hour;
        let end = self.config.sleep_end_hour;
        if start > end {
            hour >= start || hour < end
        } else {
            hour >= start && hour < end
        }
    }

    /// Whether `now` falls in sleep time, using the hour in `now`'s offset.
    pub fn is_sleep_time_at(&self, now: OffsetDateTime) -> bool {
        self.is_sleep_time(now.hour())
    }

    /// Classify a temperature. First match wins:
    /// Sleep, Comfort, Tolerable, then Alert.
    pub fn classify_zone(&self, temperature: f64, is_sleep_time: bool) -> TemperatureZone {
        if is_sleep_time && self.config.sleep.contains(temperature) {
            TemperatureZone::Sleep
        } else if !is_sleep_time && self.config.comfort.contains(temperature) {
            TemperatureZone::Comfort
        } else if self.config.tolerable.contains(temperature) {
            TemperatureZone::Tolerable
        } else {
            TemperatureZone::Alert
        }
    }

    /// Classify a temperature at a given wall-clock time.
    pub fn classify_zone_at(&self, temperature: f64, now: OffsetDateTime) -> TemperatureZone {
        self.classify_zone(temperature, self.is_sleep_time_at(now))
    }

    /// Position of `temperature` on the gauge, in percent.
    ///
    /// Not clamped: values outside the gauge range fall below 0 or above 100.
    pub fn gauge_position(&self, temperature: f64) -> f64 {
        let gauge = self.config.gauge;
        (temperature - gauge.min) / (gauge.max - gauge.min) * 100.0
    }

    /// Whether humidity is optimal.
    pub fn humidity_optimal(&self, humidity: f64) -> bool {
        self.config.humidity_optimal.contains(humidity)
    }

    /// Whether pressure is optimal. Always `true`.
    // TODO: replace with a configurable range once a pressure policy is agreed;
    // until then the flag stays constant.
    pub fn pressure_optimal(&self, _pressure: f64) -> bool {
        true
    }

    /// Whether gas resistance is optimal.
    pub fn gas_resistance_optimal(&self, gas_resistance: f64) -> bool {
        gas_resistance > self.config.gas_resistance_min
    }

    /// Evaluate every optimality flag for a reading.
    pub fn evaluate(&self, reading: &Reading) -> MetricOptimality {
        MetricOptimality {
            humidity: self.humidity_optimal(reading.humidity),
            pressure: self.pressure_optimal(reading.pressure),
            gas_resistance: self.gas_resistance_optimal(reading.gas_resistance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn reading(humidity: f64, pressure: f64, gas_resistance: f64) -> Reading {
        Reading {
            sensor_id: "sensor-1".to_string(),
            timestamp: 0,
            temperature: 22.0,
            humidity,
            pressure,
            gas_resistance,
            received_at: String::new(),
        }
    }

    #[test]
    fn test_zone_examples() {
        let t = Thresholds::default();
        assert_eq!(t.classify_zone(19.0, true), TemperatureZone::Sleep);
        assert_eq!(t.classify_zone(19.0, false), TemperatureZone::Tolerable);
        assert_eq!(t.classify_zone(27.0, true), TemperatureZone::Alert);
        assert_eq!(t.classify_zone(27.0, false), TemperatureZone::Alert);
    }

    #[test]
    fn test_zone_precedence_at_shared_boundary() {
        let t = Thresholds::default();
        // 20 is in both the sleep and comfort ranges.
        assert_eq!(t.classify_zone(20.0, true), TemperatureZone::Sleep);
        assert_eq!(t.classify_zone(20.0, false), TemperatureZone::Comfort);
    }

    #[test]
    fn test_zone_comfort_only_outside_sleep_time() {
        let t = Thresholds::default();
        assert_eq!(t.classify_zone(22.0, false), TemperatureZone::Comfort);
        assert_eq!(t.classify_zone(22.0, true), TemperatureZone::Tolerable);
    }

    #[test]
    fn test_zone_tolerable_edges() {
        let t = Thresholds::default();
        assert_eq!(t.classify_zone(26.0, false), TemperatureZone::Tolerable);
        assert_eq!(t.classify_zone(26.1, false), TemperatureZone::Alert);
        assert_eq!(t.classify_zone(18.0, false), TemperatureZone::Tolerable);
        assert_eq!(t.classify_zone(17.9, true), TemperatureZone::Alert);
    }

    #[test]
    fn test_sleep_time_hours() {
        let t = Thresholds::default();
        assert!(t.is_sleep_time(22));
        assert!(t.is_sleep_time(23));
        assert!(t.is_sleep_time(0));
        assert!(t.is_sleep_time(6));
        assert!(!t.is_sleep_time(7));
        assert!(!t.is_sleep_time(12));
        assert!(!t.is_sleep_time(21));
    }

    #[test]
    fn test_sleep_time_non_wrapping_window() {
        let t = Thresholds::new(ThresholdConfig {
            sleep_start_hour: 1,
            sleep_end_hour: 9,
            ..Default::default()
        });
        assert!(!t.is_sleep_time(0));
        assert!(t.is_sleep_time(1));
        assert!(t.is_sleep_time(8));
        assert!(!t.is_sleep_time(9));
    }

    #[test]
    fn test_classify_zone_at_uses_clock() {
        let t = Thresholds::default();
        let night = datetime!(2025-01-10 23:30 UTC);
        let day = datetime!(2025-01-10 14:00 UTC);
        assert_eq!(t.classify_zone_at(19.0, night), TemperatureZone::Sleep);
        assert_eq!(t.classify_zone_at(19.0, day), TemperatureZone::Tolerable);
    }

    #[test]
    fn test_sleep_time_respects_offset() {
        let t = Thresholds::default();
        // 21:00 UTC is 23:00 at +02:00.
        let utc = datetime!(2025-01-10 21:00 UTC);
        let local = datetime!(2025-01-10 23:00 +2);
        assert!(!t.is_sleep_time_at(utc));
        assert!(t.is_sleep_time_at(local));
    }

    #[test]
    fn test_gauge_position() {
        let t = Thresholds::default();
        assert_eq!(t.gauge_position(10.0), 0.0);
        assert_eq!(t.gauge_position(25.0), 50.0);
        assert_eq!(t.gauge_position(40.0), 100.0);
        assert!(t.gauge_position(45.0) > 100.0);
    }

    #[test]
    fn test_optimality_flags() {
        let t = Thresholds::default();

        let good = t.evaluate(&reading(50.0, 1013.0, 150_000.0));
        assert!(good.humidity);
        assert!(good.pressure);
        assert!(good.gas_resistance);
        assert!(good.all_optimal());

        let bad = t.evaluate(&reading(70.0, 900.0, 100_000.0));
        assert!(!bad.humidity);
        assert!(bad.pressure);
        assert!(!bad.gas_resistance);
        assert!(!bad.all_optimal());
    }

    #[test]
    fn test_humidity_optimal_edges() {
        let t = Thresholds::default();
        assert!(t.humidity_optimal(38.0));
        assert!(t.humidity_optimal(62.0));
        assert!(!t.humidity_optimal(37.9));
        assert!(!t.humidity_optimal(62.1));
    }

    #[test]
    fn test_status_label() {
        assert_eq!(MetricOptimality::status_label(true), "Good");
        assert_eq!(MetricOptimality::status_label(false), "Check");
    }

    #[test]
    fn test_zone_presentation() {
        assert_eq!(TemperatureZone::Sleep.color(), "#8b5cf6");
        assert_eq!(TemperatureZone::Alert.color(), "#ef4444");
        assert_eq!(TemperatureZone::Comfort.to_string(), "Comfort");
        assert!(TemperatureZone::Tolerable.description().contains("Tolerable"));
    }

    #[test]
    fn test_config_validation() {
        assert!(ThresholdConfig::default().validate().is_ok());

        let inverted = ThresholdConfig {
            comfort: Range::new(25.0, 20.0),
            ..Default::default()
        };
        let err = inverted.validate().unwrap_err();
        assert!(err.to_string().contains("comfort"));

        let bad_hour = ThresholdConfig {
            sleep_start_hour: 24,
            ..Default::default()
        };
        assert!(bad_hour.validate().is_err());

        let flat_gauge = ThresholdConfig {
            gauge: Range::new(10.0, 10.0),
            ..Default::default()
        };
        assert!(flat_gauge.validate().is_err());
    }

    #[test]
    fn test_config_partial_toml_uses_defaults() {
        let config: ThresholdConfig =
            serde_json::from_str(r#"{"gas_resistance_min": 50000.0}"#).unwrap();
        assert_eq!(config.gas_resistance_min, 50_000.0);
        assert_eq!(config.comfort, Range::new(20.0, 24.0));
    }
}
