//! Read-only dashboard snapshots.

use serde::Serialize;
use time::OffsetDateTime;

use homeclimate_types::Reading;

use crate::history::{History, HistoryStats};
use crate::metrics::DerivedMetrics;
use crate::session::{PollStats, PollerState, Session};
use crate::thresholds::Thresholds;

/// Everything the presentation layer needs, frozen at one point in time.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub state: PollerState,
    /// Latest reading, if any.
    pub current_reading: Option<Reading>,
    /// Reconciled history, oldest first.
    pub history: History,
    /// Derived metrics for `current_reading`.
    pub metrics: Option<DerivedMetrics>,
    /// Temperature statistics over `history`.
    pub history_stats: Option<HistoryStats>,
    pub last_seen_timestamp: Option<i64>,
    pub poll_stats: PollStats,
}

impl DashboardSnapshot {
    /// Capture the session, deriving metrics as of `now`.
    pub fn capture(session: &Session, thresholds: &Thresholds, now: OffsetDateTime) -> Self {
        let current_reading = session.current_reading().cloned();
        let metrics = current_reading
            .as_ref()
            .map(|r| DerivedMetrics::compute(r, thresholds, now));

        Self {
            state: session.state(),
            current_reading,
            history: session.history().clone(),
            metrics,
            history_stats: session.history().temperature_stats(),
            last_seen_timestamp: session.last_seen_timestamp(),
            poll_stats: session.stats().clone(),
        }
    }

    /// Whether the initial load has finished.
    pub fn is_ready(&self) -> bool {
        self.state == PollerState::Ready
    }

    /// Whether there is nothing to show yet: still loading, or ready but empty.
    pub fn is_empty(&self) -> bool {
        self.current_reading.is_none()
    }
}
