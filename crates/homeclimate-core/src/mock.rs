//! Mock reading source for testing.
//!
//! [`MockSource`] implements [`ReadingSource`] over an in-memory store so the
//! poller can be exercised without a live endpoint.
//!
//! # Features
//!
//! - **Stored readings**: served most recent first, like the real endpoint
//! - **Scripted responses**: one-shot payloads returned before the store
//! - **Failure injection**: fail always, or for the next N fetches
//! - **Latency simulation**: delay each fetch

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use homeclimate_types::RawReading;

use crate::error::{Error, Result};
use crate::source::ReadingSource;

/// A scriptable in-memory reading source.
///
/// # Example
///
/// ```
/// use homeclimate_core::{MockSource, ReadingSource};
///
/// #[tokio::main]
/// async fn main() {
///     let source = MockSource::with_readings(vec![
///         MockSource::reading(1_000, 21.0),
///         MockSource::reading(2_000, 21.5),
///     ]);
///
///     let latest = source.fetch_latest().await.unwrap();
///     assert_eq!(latest.timestamp, 2_000);
///     assert_eq!(source.fetch_count(), 1);
/// }
/// ```
pub struct MockSource {
    readings: RwLock<Vec<RawReading>>,
    scripted: RwLock<VecDeque<Vec<RawReading>>>,
    fetch_count: AtomicU32,
    last_limit: AtomicUsize,
    should_fail: AtomicBool,
    fail_message: RwLock<String>,
    /// Simulated fetch latency in milliseconds (0 = no delay).
    latency_ms: AtomicU64,
    /// Number of fetches still to fail before succeeding.
    remaining_failures: AtomicU32,
}

impl std::fmt::Debug for MockSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSource")
            .field("fetch_count", &self.fetch_count.load(Ordering::Relaxed))
            .field("should_fail", &self.should_fail.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSource {
    /// Create an empty mock source.
    pub fn new() -> Self {
        Self {
            readings: RwLock::new(Vec::new()),
            scripted: RwLock::new(VecDeque::new()),
            fetch_count: AtomicU32::new(0),
            last_limit: AtomicUsize::new(0),
            should_fail: AtomicBool::new(false),
            fail_message: RwLock::new("Mock failure".to_string()),
            latency_ms: AtomicU64::new(0),
            remaining_failures: AtomicU32::new(0),
        }
    }

    /// Create a mock source pre-loaded with readings.
    pub fn with_readings(readings: Vec<RawReading>) -> Self {
        Self {
            readings: RwLock::new(readings),
            ..Self::new()
        }
    }

    /// Build a raw reading with typical values and the given temperature.
    pub fn reading(timestamp: i64, temperature: f64) -> RawReading {
        RawReading {
            sensor_id: "mock-sensor".to_string(),
            timestamp,
            temperature,
            humidity: 48.0,
            pressure: 101_325.0,
            gas_resistance: 150_000.0,
            received_at: String::new(),
        }
    }

    // --- Test control methods ---

    /// Add a reading to the store.
    pub async fn push_reading(&self, reading: RawReading) {
        self.readings.write().await.push(reading);
    }

    /// Replace the stored readings.
    pub async fn set_readings(&self, readings: Vec<RawReading>) {
        *self.readings.write().await = readings;
    }

    /// Queue a one-shot response, returned verbatim by the next fetch.
    ///
    /// Queued responses are consumed in order before the store is consulted.
    pub async fn queue_response(&self, readings: Vec<RawReading>) {
        self.scripted.write().await.push_back(readings);
    }

    /// Make every fetch fail (or succeed again).
    pub async fn set_should_fail(&self, fail: bool, message: Option<&str>) {
        self.should_fail.store(fail, Ordering::Relaxed);
        if let Some(msg) = message {
            *self.fail_message.write().await = msg.to_string();
        }
    }

    /// Fail the next `count` fetches, then succeed.
    pub fn set_transient_failures(&self, count: u32) {
        self.remaining_failures.store(count, Ordering::Relaxed);
    }

    /// Get the number of remaining transient failures.
    pub fn remaining_failures(&self) -> u32 {
        self.remaining_failures.load(Ordering::Relaxed)
    }

    /// Set simulated fetch latency.
    ///
    /// Set to `Duration::ZERO` to disable latency simulation.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Number of fetches attempted, including failed ones.
    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::Relaxed)
    }

    /// `limit` passed to the most recent fetch.
    pub fn last_limit(&self) -> usize {
        self.last_limit.load(Ordering::Relaxed)
    }

    /// Reset the fetch counter.
    pub fn reset_fetch_count(&self) {
        self.fetch_count.store(0, Ordering::Relaxed);
    }

    async fn check_should_fail(&self) -> Result<()> {
        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if self.remaining_failures.load(Ordering::Relaxed) > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(Error::fetch_failed(
                "mock",
                self.fail_message.read().await.clone(),
            ));
        }

        if self.should_fail.load(Ordering::Relaxed) {
            Err(Error::fetch_failed(
                "mock",
                self.fail_message.read().await.clone(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ReadingSource for MockSource {
    async fn fetch_readings(&self, limit: usize) -> Result<Vec<RawReading>> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        self.last_limit.store(limit, Ordering::Relaxed);
        self.check_should_fail().await?;

        if let Some(response) = self.scripted.write().await.pop_front() {
            return Ok(response);
        }

        let mut readings = self.readings.read().await.clone();
        readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        readings.truncate(limit);
        Ok(readings)
    }
}
