//! Background polling of a reading source.
//!
//! The [`Poller`] drives a [`Session`] through its lifecycle:
//!
//! 1. Enter `Loading` and fetch the initial batch (`initial_limit` readings).
//! 2. Enter `Ready`, whether or not that fetch succeeded.
//! 3. Poll for the latest reading immediately, then every `interval`.
//!
//! Ticks are handled one at a time in a single task. A tick that comes due
//! while a request is outstanding is skipped
//! ([`MissedTickBehavior::Skip`]). Fetch errors never leave the poller: they
//! are logged, counted in [`PollStats`](crate::session::PollStats) and the
//! next tick tries again.
//!
//! Each state change is published as a [`DashboardSnapshot`] on a
//! `tokio::sync::watch` channel, and summarized as a [`PollEvent`] on the
//! handle's [`Stream`] implementation. Subscribers are only notified when the
//! state or the history changed; stale, empty and failed polls refresh the
//! stored snapshot's [`PollStats`](crate::session::PollStats) silently.
//!
//! Cancellation uses a [`CancellationToken`]; dropping the [`PollerHandle`]
//! cancels too. An in-flight request is dropped with the task and its
//! response is never applied.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::stream::Stream;
use time::{OffsetDateTime, UtcOffset};
use tokio::sync::{mpsc, watch};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use homeclimate_types::RawReading;

use crate::error::{Error, Result};
use crate::session::{PollOutcome, PollerState, Session};
use crate::snapshot::DashboardSnapshot;
use crate::source::{ReadingSource, latest_of};
use crate::thresholds::Thresholds;

/// Consecutive failures logged at `warn` before the poller goes quiet.
pub const WARN_FAILURE_LIMIT: u32 = 3;

/// Options for the poller.
///
/// ```
/// use std::time::Duration;
/// use homeclimate_core::PollOptions;
///
/// let options = PollOptions::builder()
///     .interval(Duration::from_secs(10))
///     .initial_limit(100)
///     .build();
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Time between polls for the latest reading.
    /// Default: 5 seconds.
    pub interval: Duration,
    /// Number of readings requested by the initial load.
    /// Default: 50.
    pub initial_limit: usize,
    /// Number of readings requested by each poll; the newest one is used.
    /// Default: 1.
    pub poll_limit: usize,
    /// Upper bound on a single fetch.
    /// Default: 10 seconds.
    pub request_timeout: Duration,
    /// Offset used for the sleep-time clock.
    /// Default: UTC.
    pub utc_offset: UtcOffset,
    /// Buffer size for the event channel.
    /// Default: 16 events.
    pub event_buffer: usize,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5000),
            initial_limit: 50,
            poll_limit: 1,
            request_timeout: Duration::from_secs(10),
            utc_offset: UtcOffset::UTC,
            event_buffer: 16,
        }
    }
}

impl PollOptions {
    /// Create a new builder for PollOptions.
    pub fn builder() -> PollOptionsBuilder {
        PollOptionsBuilder::default()
    }

    /// Validate the options and return an error if invalid.
    ///
    /// Checks that:
    /// - `interval` and `request_timeout` are > 0
    /// - `initial_limit`, `poll_limit` and `event_buffer` are > 0
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::invalid_config("interval must be > 0"));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::invalid_config("request_timeout must be > 0"));
        }
        if self.initial_limit == 0 {
            return Err(Error::invalid_config("initial_limit must be > 0"));
        }
        if self.poll_limit == 0 {
            return Err(Error::invalid_config("poll_limit must be > 0"));
        }
        if self.event_buffer == 0 {
            return Err(Error::invalid_config("event_buffer must be > 0"));
        }
        Ok(())
    }
}

/// Builder for PollOptions.
#[derive(Debug, Clone, Default)]
pub struct PollOptionsBuilder {
    options: PollOptions,
}

impl PollOptionsBuilder {
    /// Set the polling interval.
    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.options.interval = interval;
        self
    }

    /// Set the number of readings requested by the initial load.
    #[must_use]
    pub fn initial_limit(mut self, limit: usize) -> Self {
        self.options.initial_limit = limit;
        self
    }

    /// Set the number of readings requested by each poll.
    #[must_use]
    pub fn poll_limit(mut self, limit: usize) -> Self {
        self.options.poll_limit = limit;
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.options.request_timeout = timeout;
        self
    }

    /// Set the offset used for the sleep-time clock.
    #[must_use]
    pub fn utc_offset(mut self, offset: UtcOffset) -> Self {
        self.options.utc_offset = offset;
        self
    }

    /// Set the event channel buffer size.
    #[must_use]
    pub fn event_buffer(mut self, size: usize) -> Self {
        self.options.event_buffer = size;
        self
    }

    /// Build the PollOptions.
    #[must_use]
    pub fn build(self) -> PollOptions {
        self.options
    }
}

/// What happened on one step of the poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// The initial load finished; `count` readings are in history.
    InitialLoad { count: usize },
    /// The initial load failed; the session is ready with an empty history.
    InitialLoadFailed { error: String },
    /// A newer reading was reconciled.
    Updated { timestamp: i64 },
    /// A reading not newer than `last_seen` was discarded.
    Stale { timestamp: i64, last_seen: i64 },
    /// The source returned no readings.
    Empty,
    /// A fetch failed.
    Failed {
        error: String,
        consecutive_failures: u32,
    },
    /// Polled before the initial load finished; nothing was fetched.
    NotReady,
}

/// Polls a [`ReadingSource`] and maintains a [`Session`].
///
/// Use [`Poller::spawn`] to run it in the background, or drive it step by
/// step with [`initial_load`](Self::initial_load) and
/// [`poll_once`](Self::poll_once).
pub struct Poller<S> {
    source: S,
    options: PollOptions,
    thresholds: Thresholds,
    session: Session,
    snapshot_tx: watch::Sender<DashboardSnapshot>,
}

impl<S: ReadingSource> Poller<S> {
    /// Create a poller. Fails if `options` are invalid.
    pub fn new(source: S, options: PollOptions, thresholds: Thresholds) -> Result<Self> {
        options.validate()?;
        thresholds.config().validate()?;
        let (snapshot_tx, _) = watch::channel(DashboardSnapshot::default());
        Ok(Self {
            source,
            options,
            thresholds,
            session: Session::new(),
            snapshot_tx,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn options(&self) -> &PollOptions {
        &self.options
    }

    /// Subscribe to snapshots.
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Run the initial bulk load and enter `Ready`.
    pub async fn initial_load(&mut self) -> PollEvent {
        self.session.begin_loading();
        self.publish(true);

        let limit = self.options.initial_limit;
        let event = match self.fetch(limit).await {
            Ok(readings) => {
                let received = readings.len();
                let count = self.session.complete_initial_load(readings, self.now_ms());
                info!(
                    "Initial load complete: {} readings received, {} in history",
                    received, count
                );
                PollEvent::InitialLoad { count }
            }
            Err(e) => {
                warn!("Initial load failed, starting with empty history: {}", e);
                self.session.fail_initial_load(&e);
                PollEvent::InitialLoadFailed {
                    error: e.to_string(),
                }
            }
        };

        self.publish(true);
        event
    }

    /// Fetch the latest reading once and apply it.
    ///
    /// Does nothing until [`initial_load`](Self::initial_load) has run.
    pub async fn poll_once(&mut self) -> PollEvent {
        if self.session.state() != PollerState::Ready {
            debug!("Poll skipped, session is {:?}", self.session.state());
            return PollEvent::NotReady;
        }

        let limit = self.options.poll_limit;
        let fetched = self
            .fetch(limit)
            .await
            .and_then(|readings| latest_of(readings).ok_or(Error::EmptyResult));

        let event = match fetched {
            Ok(reading) => match self.session.apply_latest(reading, self.now_ms()) {
                PollOutcome::Updated => {
                    let timestamp = self.session.last_seen_timestamp().unwrap_or_default();
                    debug!("Reconciled reading at {}", timestamp);
                    PollEvent::Updated { timestamp }
                }
                PollOutcome::Stale {
                    timestamp,
                    last_seen,
                } => PollEvent::Stale {
                    timestamp,
                    last_seen,
                },
                PollOutcome::NotReady => return PollEvent::NotReady,
            },
            Err(Error::EmptyResult) => {
                self.session.record_failure(&Error::EmptyResult);
                debug!("Poll returned no readings");
                PollEvent::Empty
            }
            Err(e) => {
                let consecutive = self.session.record_failure(&e);
                log_failure(consecutive, &e);
                PollEvent::Failed {
                    error: e.to_string(),
                    consecutive_failures: consecutive,
                }
            }
        };

        self.publish(matches!(event, PollEvent::Updated { .. }));
        event
    }

    /// Current snapshot, derived as of now.
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot::capture(&self.session, &self.thresholds, self.now())
    }

    async fn fetch(&self, limit: usize) -> Result<Vec<RawReading>> {
        let timeout = self.options.request_timeout;
        match tokio::time::timeout(timeout, self.source.fetch_readings(limit)).await {
            Ok(result) => result,
            Err(_) => Err(Error::timeout("fetch_readings", timeout)),
        }
    }

    /// Store a fresh snapshot, notifying subscribers only if `changed`.
    fn publish(&self, changed: bool) {
        let snapshot = self.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            *current = snapshot;
            changed
        });
    }

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.options.utc_offset)
    }

    fn now_ms(&self) -> i64 {
        (self.now().unix_timestamp_nanos() / 1_000_000) as i64
    }
}

impl<S: ReadingSource + 'static> Poller<S> {
    /// Spawn the poller on the current tokio runtime.
    pub fn spawn(source: S, options: PollOptions, thresholds: Thresholds) -> Result<PollerHandle> {
        let poller = Self::new(source, options, thresholds)?;
        Ok(poller.start())
    }

    /// Move this poller into a background task.
    pub fn start(self) -> PollerHandle {
        let (event_tx, event_rx) = mpsc::channel(self.options.event_buffer);
        let snapshots = self.subscribe();
        let cancel_token = CancellationToken::new();
        let task_token = cancel_token.clone();

        let handle = tokio::spawn(self.run(event_tx, task_token));

        PollerHandle {
            snapshots,
            events: event_rx,
            handle,
            cancel_token,
        }
    }

    async fn run(mut self, events: mpsc::Sender<PollEvent>, token: CancellationToken) {
        let event = tokio::select! {
            _ = token.cancelled() => {
                debug!("Poller cancelled during initial load");
                return;
            }
            event = self.initial_load() => event,
        };
        emit(&events, event);

        // First tick completes immediately.
        let mut ticker = interval(self.options.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Poller cancelled, stopping gracefully");
                    break;
                }
                _ = ticker.tick() => {
                    let event = tokio::select! {
                        _ = token.cancelled() => {
                            debug!("Poller cancelled with a request in flight");
                            break;
                        }
                        event = self.poll_once() => event,
                    };
                    emit(&events, event);
                }
            }
        }
    }
}

fn emit(events: &mpsc::Sender<PollEvent>, event: PollEvent) {
    if let Err(mpsc::error::TrySendError::Full(event)) = events.try_send(event) {
        debug!("Event channel full, dropping {:?}", event);
    }
}

fn log_failure(consecutive: u32, err: &Error) {
    if consecutive <= WARN_FAILURE_LIMIT {
        warn!("Poll failed: {} (attempt {})", err, consecutive);
    } else if consecutive == WARN_FAILURE_LIMIT + 1 {
        error!(
            "Poll failed after {} attempts, will continue trying silently: {}",
            consecutive, err
        );
    }
}

/// Handle to a running [`Poller`].
///
/// Yields [`PollEvent`]s as a [`Stream`]. Dropping the handle stops the poller.
pub struct PollerHandle {
    snapshots: watch::Receiver<DashboardSnapshot>,
    events: mpsc::Receiver<PollEvent>,
    handle: tokio::task::JoinHandle<()>,
    cancel_token: CancellationToken,
}

impl PollerHandle {
    /// Subscribe to snapshots. The receiver sees the latest value immediately.
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshots.clone()
    }

    /// Most recently published snapshot.
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Stop the poller.
    pub fn close(self) {
        self.cancel_token.cancel();
    }

    /// Get a cancellation token that stops the poller when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Check if the background task is still running.
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Check if the poller has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

impl Stream for PollerHandle {
    type Item = PollEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.events).poll_recv(cx)
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
