//! Bounded, deduplicated, time-ordered reading history.
//!
//! [`History`] is an immutable value: reconciling a reading produces a new
//! history and leaves the original untouched, so snapshots handed to readers
//! stay consistent while the poller moves on.
//!
//! # Reconciliation
//!
//! Merging a reading follows four steps:
//!
//! 1. Append the incoming reading to a working copy.
//! 2. Stable-sort ascending by `timestamp`.
//! 3. Keep the first reading for every distinct timestamp. A reading that is
//!    already stored therefore wins over a newly polled one with the same
//!    timestamp.
//! 4. Drop the oldest entries beyond [`MAX_HISTORY_POINTS`].
//!
//! ```
//! use homeclimate_core::history::History;
//! use homeclimate_types::Reading;
//!
//! let reading = |timestamp| Reading {
//!     sensor_id: "sensor-1".into(),
//!     timestamp,
//!     temperature: 22.0,
//!     humidity: 50.0,
//!     pressure: 1013.0,
//!     gas_resistance: 120_000.0,
//!     received_at: String::new(),
//! };
//!
//! let history = History::new().reconcile(reading(20)).reconcile(reading(10));
//! let timestamps: Vec<i64> = history.iter().map(|r| r.timestamp).collect();
//! assert_eq!(timestamps, vec![10, 20]);
//! assert_eq!(history.latest().map(|r| r.timestamp), Some(20));
//! ```

use std::sync::Arc;

use serde::{Serialize, Serializer};

use homeclimate_types::Reading;

/// Maximum number of readings retained in a history.
pub const MAX_HISTORY_POINTS: usize = 200;

/// Temperature delta (°C) between the last two readings below which the
/// trend is reported as stable.
pub const TREND_THRESHOLD: f64 = 0.05;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Ordered reading history.
///
/// Invariants: strictly ascending by timestamp, no duplicate timestamps,
/// at most [`MAX_HISTORY_POINTS`] entries. Cloning is cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    readings: Arc<[Reading]>,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            readings: Arc::from(Vec::new()),
        }
    }

    /// Build a history from readings in any order.
    pub fn from_readings(readings: impl IntoIterator<Item = Reading>) -> Self {
        Self::new().reconcile_all(readings)
    }

    /// Merge a single reading, returning the new history.
    ///
    /// Reconciling the same reading twice yields the same history as
    /// reconciling it once.
    #[must_use]
    pub fn reconcile(&self, incoming: Reading) -> Self {
        self.reconcile_all(std::iter::once(incoming))
    }

    /// Merge a batch of readings in one pass.
    ///
    /// Equivalent to reconciling each reading in turn: the sort makes the
    /// outcome independent of the batch order, except that among readings
    /// sharing a timestamp the earliest one (stored first, then batch order)
    /// is kept.
    #[must_use]
    pub fn reconcile_all(&self, incoming: impl IntoIterator<Item = Reading>) -> Self {
        let mut merged: Vec<Reading> = self.readings.to_vec();
        merged.extend(incoming);

        // `sort_by_key` is stable and `dedup_by_key` keeps the first of each run.
        merged.sort_by_key(|r| r.timestamp);
        merged.dedup_by_key(|r| r.timestamp);

        if merged.len() > MAX_HISTORY_POINTS {
            let excess = merged.len() - MAX_HISTORY_POINTS;
            merged.drain(..excess);
        }

        Self {
            readings: Arc::from(merged),
        }
    }

    /// Number of readings held.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Whether the history holds no readings.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// The most recent reading.
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.last()
    }

    /// The oldest retained reading.
    pub fn oldest(&self) -> Option<&Reading> {
        self.readings.first()
    }

    /// The retained reading with this timestamp.
    pub fn get(&self, timestamp: i64) -> Option<&Reading> {
        self.readings
            .binary_search_by_key(&timestamp, |r| r.timestamp)
            .ok()
            .map(|i| &self.readings[i])
    }

    /// Whether a reading with this timestamp is retained.
    pub fn contains_timestamp(&self, timestamp: i64) -> bool {
        self.get(timestamp).is_some()
    }

    /// Iterate readings oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, Reading> {
        self.readings.iter()
    }

    /// Readings oldest first.
    pub fn as_slice(&self) -> &[Reading] {
        &self.readings
    }

    /// Temperature statistics over the retained readings.
    ///
    /// Returns `None` for an empty history.
    pub fn temperature_stats(&self) -> Option<HistoryStats> {
        let first = self.readings.first()?;
        let last = self.readings.last()?;

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for reading in self.readings.iter() {
            min = min.min(reading.temperature);
            max = max.max(reading.temperature);
            sum += reading.temperature;
        }
        let avg = sum / self.readings.len() as f64;

        let trend = match self.readings.len().checked_sub(2) {
            Some(i) => Trend::between(self.readings[i].temperature, last.temperature),
            None => Trend::Stable,
        };

        let elapsed_ms = (last.timestamp - first.timestamp) as f64;
        let change_rate = if elapsed_ms > 0.0 {
            (last.temperature - first.temperature) / (elapsed_ms / MILLIS_PER_HOUR)
        } else {
            0.0
        };

        Some(HistoryStats {
            min,
            max,
            avg,
            current: last.temperature,
            trend,
            change_rate,
        })
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Reading;
    type IntoIter = std::slice::Iter<'a, Reading>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for History {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.readings.iter())
    }
}

/// Direction of the most recent temperature change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Temperature went up by more than [`TREND_THRESHOLD`].
    Rising,
    /// Temperature went down by more than [`TREND_THRESHOLD`].
    Falling,
    /// Change within [`TREND_THRESHOLD`].
    Stable,
}

impl Trend {
    /// Classify the change from `previous` to `current`.
    pub fn between(previous: f64, current: f64) -> Self {
        let diff = current - previous;
        if diff.abs() < TREND_THRESHOLD {
            Trend::Stable
        } else if diff > 0.0 {
            Trend::Rising
        } else {
            Trend::Falling
        }
    }

    /// Arrow glyph for display.
    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Rising => "↑",
            Trend::Falling => "↓",
            Trend::Stable => "-",
        }
    }
}

/// Temperature statistics over a history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    /// Lowest temperature (°C).
    pub min: f64,
    /// Highest temperature (°C).
    pub max: f64,
    /// Mean temperature (°C).
    pub avg: f64,
    /// Temperature of the latest reading (°C).
    pub current: f64,
    /// Direction of the latest change.
    pub trend: Trend,
    /// Change between the first and last reading, in °C per hour.
    pub change_rate: f64,
}


/// Property-based tests for reconciliation invariants.
///
/// Run with: `cargo test -p homeclimate-core history::proptests`
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn reading(timestamp: i64) -> Reading {
        Reading {
            sensor_id: "sensor-1".to_string(),
            timestamp,
            temperature: 21.0,
            humidity: 45.0,
            pressure: 1010.0,
            gas_resistance: 110_000.0,
            received_at: String::new(),
        }
    }

    fn history_strategy() -> impl Strategy<Value = History> {
        proptest::collection::vec(0i64..1_000, 0..260)
            .prop_map(|ts| History::from_readings(ts.into_iter().map(reading)))
    }

    proptest! {
        /// A new timestamp grows the history by one, up to the bound.
        #[test]
        fn reconcile_new_timestamp_grows_by_one(history in history_strategy(), ts in 0i64..2_000) {
            prop_assume!(!history.contains_timestamp(ts));
            let next = history.reconcile(reading(ts));
            prop_assert_eq!(next.len(), (history.len() + 1).min(MAX_HISTORY_POINTS));
        }

        /// Reconciling the same reading twice equals reconciling it once.
        #[test]
        fn reconcile_is_idempotent(history in history_strategy(), ts in 0i64..2_000) {
            let once = history.reconcile(reading(ts));
            let twice = once.reconcile(reading(ts));
            prop_assert_eq!(once, twice);
        }

        /// Output is strictly ascending and bounded.
        #[test]
        fn reconcile_output_strictly_ascending(history in history_strategy(), ts in any::<i64>()) {
            let next = history.reconcile(reading(ts));
            prop_assert!(next.len() <= MAX_HISTORY_POINTS);
            for pair in next.as_slice().windows(2) {
                prop_assert!(pair[0].timestamp < pair[1].timestamp);
            }
        }

        /// When the bound is exceeded the oldest entry is the one dropped.
        #[test]
        fn reconcile_drops_oldest_when_full(ts in 1_000i64..2_000) {
            let full = History::from_readings((0..MAX_HISTORY_POINTS as i64).map(reading));
            let next = full.reconcile(reading(ts));
            prop_assert_eq!(next.len(), MAX_HISTORY_POINTS);
            prop_assert_eq!(next.oldest().map(|r| r.timestamp), Some(1));
        }
    }
}
