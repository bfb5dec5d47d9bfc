//! Derived metrics for the current reading.
//!
//! Bundles the comfort score, temperature zone and optimality flags that the
//! dashboard shows next to a reading. Everything here is recomputed from the
//! reading and an explicit clock; nothing is stored.

use serde::Serialize;
use time::OffsetDateTime;

use homeclimate_types::Reading;

use crate::comfort::{ComfortLevel, comfort_score};
use crate::thresholds::{MetricOptimality, TemperatureZone, Thresholds};

/// Metrics derived from a single reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    /// Comfort score, 0-100.
    pub comfort_score: u8,
    /// Label for the comfort score.
    pub comfort_level: ComfortLevel,
    /// Temperature zone.
    pub zone: TemperatureZone,
    /// Whether the zone was evaluated during sleep time.
    pub is_sleep_time: bool,
    /// Temperature position on the gauge, in percent (unclamped).
    pub gauge_position: f64,
    /// Optimality flags for humidity, pressure and gas resistance.
    pub optimality: MetricOptimality,
}

impl DerivedMetrics {
    /// Compute metrics for `reading` as of `now`.
    ///
    /// `now` should carry the local offset: the sleep-time window is matched
    /// against `now.hour()`.
    pub fn compute(reading: &Reading, thresholds: &Thresholds, now: OffsetDateTime) -> Self {
        Self::with_sleep_time(reading, thresholds, thresholds.is_sleep_time_at(now))
    }

    /// Compute metrics with an explicit sleep-time flag.
    pub fn with_sleep_time(reading: &Reading, thresholds: &Thresholds, is_sleep_time: bool) -> Self {
        let score = comfort_score(reading.temperature, reading.humidity);
        Self {
            comfort_score: score,
            comfort_level: ComfortLevel::from_score(score),
            zone: thresholds.classify_zone(reading.temperature, is_sleep_time),
            is_sleep_time,
            gauge_position: thresholds.gauge_position(reading.temperature),
            optimality: thresholds.evaluate(reading),
        }
    }
}
