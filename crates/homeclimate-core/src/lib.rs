//! Live dashboard core for environmental sensor readings.
//!
//! This crate turns a stream of polled sensor readings into the state a
//! dashboard renders: a bounded, deduplicated, time-ordered history, the
//! current reading, and metrics derived from it.
//!
//! # Features
//!
//! - **History reconciliation**: merge readings into an ordered buffer of at
//!   most 200 entries, keeping the stored reading on timestamp ties
//! - **Derived metrics**: comfort score, temperature zone, optimality flags
//! - **Polling**: initial bulk load, then a fixed cadence with stale-reading
//!   rejection and cancellation
//! - **Sources**: an HTTP source for `GET /readings?limit=N` (feature `http`)
//!   and a scriptable [`MockSource`] for tests
//!
//! # Components
//!
//! | Module | Role |
//! |--------|------|
//! | [`history`] | History Reconciler |
//! | [`comfort`], [`thresholds`], [`metrics`] | Derived Metrics Engine |
//! | [`session`], [`poller`] | Poller state machine |
//! | [`snapshot`] | Read-only view for the presentation layer |
//!
//! # Quick Start
//!
//! ```no_run
//! use homeclimate_core::{HttpSource, PollOptions, Poller, Thresholds};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = HttpSource::new("http://localhost:3001")?;
//!     let handle = Poller::spawn(source, PollOptions::default(), Thresholds::default())?;
//!
//!     let mut snapshots = handle.subscribe();
//!     while snapshots.changed().await.is_ok() {
//!         let snapshot = snapshots.borrow_and_update().clone();
//!         if let Some(metrics) = snapshot.metrics {
//!             println!("comfort {} ({})", metrics.comfort_score, metrics.zone);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod comfort;
pub mod error;
pub mod history;
pub mod metrics;
pub mod mock;
pub mod poller;
pub mod session;
pub mod snapshot;
pub mod source;
pub mod thresholds;

// Core exports
pub use comfort::{ComfortLevel, comfort_score};
pub use error::{Error, Result};
pub use history::{History, HistoryStats, MAX_HISTORY_POINTS, Trend};
pub use metrics::DerivedMetrics;
pub use mock::MockSource;
pub use poller::{PollEvent, PollOptions, PollOptionsBuilder, Poller, PollerHandle};
pub use session::{PollOutcome, PollStats, PollerState, Session};
pub use snapshot::DashboardSnapshot;
#[cfg(feature = "http")]
pub use source::HttpSource;
pub use source::{ReadingSource, latest_of};
pub use thresholds::{MetricOptimality, Range, TemperatureZone, ThresholdConfig, Thresholds};

// Re-export from homeclimate-types
pub use homeclimate_types::{RawReading, Reading, ReadingsResponse};
