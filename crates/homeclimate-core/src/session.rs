//! Dashboard session state.
//!
//! [`Session`] owns the history, the current reading and the last seen
//! timestamp, and is their only mutator. The poller drives it through the
//! `Uninitialized -> Loading -> Ready` state machine; readers only ever see
//! immutable [`DashboardSnapshot`](crate::snapshot::DashboardSnapshot)s.

use serde::Serialize;
use tracing::debug;

use homeclimate_types::{RawReading, Reading};

use crate::error::Error;
use crate::history::History;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollerState {
    /// Nothing requested yet.
    #[default]
    Uninitialized,
    /// Initial bulk load in progress.
    Loading,
    /// Initial load finished (successfully or not); live polling active.
    Ready,
}

/// Result of applying a polled reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The reading was newer and has been reconciled.
    Updated,
    /// The reading was not newer than the last seen timestamp and was dropped.
    Stale {
        /// Timestamp of the discarded reading.
        timestamp: i64,
        /// Last seen timestamp at the time of the discard.
        last_seen: i64,
    },
    /// The session is not `Ready`; nothing changed.
    NotReady,
}

/// Counters describing polling health.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollStats {
    /// Fetches that produced a reading (newer or stale).
    pub successes: u64,
    /// Fetches that failed.
    pub failures: u64,
    /// Readings discarded as stale.
    pub stale: u64,
    /// Fetches that returned no readings.
    pub empty: u64,
    /// Failures since the last success.
    pub consecutive_failures: u32,
    /// Wall-clock time (epoch ms) of the last successful fetch.
    pub last_success_ms: Option<i64>,
    /// Message of the most recent failure.
    pub last_error: Option<String>,
}

/// Single-writer session state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: PollerState,
    history: History,
    last_seen_timestamp: Option<i64>,
    stats: PollStats,
}

impl Session {
    /// Create a session in the `Uninitialized` state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// The most recent reading, i.e. the last entry of the history.
    pub fn current_reading(&self) -> Option<&Reading> {
        self.history.latest()
    }

    /// Timestamp of the newest reading accepted so far.
    ///
    /// `None` until a reading has been accepted; any reading is newer than `None`.
    pub fn last_seen_timestamp(&self) -> Option<i64> {
        self.last_seen_timestamp
    }

    pub fn stats(&self) -> &PollStats {
        &self.stats
    }

    /// Enter `Loading`.
    pub fn begin_loading(&mut self) {
        self.state = PollerState::Loading;
    }

    /// Merge the initial bulk fetch and enter `Ready`.
    ///
    /// Returns the number of readings in the history afterwards.
    pub fn complete_initial_load(&mut self, readings: Vec<RawReading>, now_ms: i64) -> usize {
        if readings.is_empty() {
            self.stats.empty += 1;
        } else {
            self.record_success(now_ms);
        }

        self.history = self
            .history
            .reconcile_all(readings.into_iter().map(RawReading::normalize));
        self.last_seen_timestamp = self.history.latest().map(|r| r.timestamp);
        self.state = PollerState::Ready;
        self.history.len()
    }

    /// Record a failed initial load and enter `Ready` with the history untouched.
    pub fn fail_initial_load(&mut self, error: &Error) {
        self.record_failure(error);
        self.state = PollerState::Ready;
    }

    /// Apply a polled reading.
    ///
    /// The reading is reconciled only when its timestamp is strictly greater
    /// than the last seen timestamp; otherwise nothing but the stale counter
    /// changes.
    pub fn apply_latest(&mut self, raw: RawReading, now_ms: i64) -> PollOutcome {
        if self.state != PollerState::Ready {
            return PollOutcome::NotReady;
        }
        self.record_success(now_ms);

        if let Some(last_seen) = self.last_seen_timestamp
            && raw.timestamp <= last_seen
        {
            self.stats.stale += 1;
            debug!(
                "Discarding stale reading (timestamp {} <= last seen {})",
                raw.timestamp, last_seen
            );
            return PollOutcome::Stale {
                timestamp: raw.timestamp,
                last_seen,
            };
        }

        let reading = raw.normalize();
        self.last_seen_timestamp = Some(reading.timestamp);
        self.history = self.history.reconcile(reading);
        PollOutcome::Updated
    }

    /// Record a failed fetch. Returns the consecutive failure count.
    ///
    /// An [`Error::EmptyResult`] is counted separately and does not extend
    /// the failure streak.
    pub fn record_failure(&mut self, error: &Error) -> u32 {
        if matches!(error, Error::EmptyResult) {
            self.stats.empty += 1;
        } else {
            self.stats.failures += 1;
            self.stats.consecutive_failures += 1;
            self.stats.last_error = Some(error.to_string());
        }
        self.stats.consecutive_failures
    }

    fn record_success(&mut self, now_ms: i64) {
        self.stats.successes += 1;
        self.stats.consecutive_failures = 0;
        self.stats.last_success_ms = Some(now_ms);
    }
}
