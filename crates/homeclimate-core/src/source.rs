//! Reading sources.
//!
//! A [`ReadingSource`] is anything that can answer "give me the last N
//! readings". The [`Poller`](crate::poller::Poller) only talks to this trait,
//! so tests can substitute a [`MockSource`](crate::mock::MockSource) for the
//! HTTP endpoint.

use async_trait::async_trait;

use homeclimate_types::RawReading;

use crate::error::{Error, Result};

/// Maximum `limit` accepted by the readings endpoint.
pub const MAX_READINGS_LIMIT: usize = 1000;

/// A source of raw sensor readings.
#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Fetch up to `limit` of the most recent readings.
    ///
    /// Order is unspecified; callers reconcile by timestamp.
    async fn fetch_readings(&self, limit: usize) -> Result<Vec<RawReading>>;

    /// Fetch the single most recent reading.
    ///
    /// Returns [`Error::EmptyResult`] when the source has no readings.
    async fn fetch_latest(&self) -> Result<RawReading> {
        let readings = self.fetch_readings(1).await?;
        latest_of(readings).ok_or(Error::EmptyResult)
    }
}

/// Pick the reading with the greatest timestamp.
///
/// On ties the first one wins.
pub fn latest_of(readings: impl IntoIterator<Item = RawReading>) -> Option<RawReading> {
    readings.into_iter().fold(None, |best, r| match best {
        Some(b) if b.timestamp >= r.timestamp => Some(b),
        _ => Some(r),
    })
}

#[async_trait]
impl<S: ReadingSource + ?Sized> ReadingSource for std::sync::Arc<S> {
    async fn fetch_readings(&self, limit: usize) -> Result<Vec<RawReading>> {
        (**self).fetch_readings(limit).await
    }

    async fn fetch_latest(&self) -> Result<RawReading> {
        (**self).fetch_latest().await
    }
}

#[cfg(feature = "http")]
pub use http::HttpSource;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::Client;
    use tracing::debug;

    use homeclimate_types::{RawReading, ReadingsResponse};

    use super::{MAX_READINGS_LIMIT, ReadingSource};
    use crate::error::{Error, Result};

    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Reads from an HTTP endpoint serving `GET /readings?limit=N`.
    #[derive(Debug, Clone)]
    pub struct HttpSource {
        client: Client,
        base_url: String,
    }

    impl HttpSource {
        /// Create a source for `base_url` (e.g. `"http://localhost:3001"`).
        ///
        /// A trailing slash is removed. The URL must use `http://` or `https://`.
        pub fn new(base_url: &str) -> Result<Self> {
            let client = Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .map_err(|e| Error::Request {
                    url: base_url.to_string(),
                    source: e,
                })?;
            Self::with_client(base_url, client)
        }

        /// Create a source with a custom reqwest Client.
        pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
            let base_url = normalize_base_url(base_url)?;
            Ok(Self { client, base_url })
        }

        /// Get the base URL.
        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        /// Full URL for a readings request.
        pub fn readings_url(&self, limit: usize) -> String {
            format!(
                "{}/readings?limit={}",
                self.base_url,
                limit.clamp(1, MAX_READINGS_LIMIT)
            )
        }
    }

    #[async_trait]
    impl ReadingSource for HttpSource {
        async fn fetch_readings(&self, limit: usize) -> Result<Vec<RawReading>> {
            let url = self.readings_url(limit);
            debug!("GET {}", url);

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| Error::Request {
                    url: url.clone(),
                    source: e,
                })?;

            let status = response.status();
            if !status.is_success() {
                let message = response
                    .json::<serde_json::Value>()
                    .await
                    .ok()
                    .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                    .unwrap_or_else(|| status.to_string());
                return Err(Error::Status {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await.map_err(|e| Error::Request {
                url: url.clone(),
                source: e,
            })?;
            let payload = ReadingsResponse::from_json(&body)?;
            debug!("Received {} readings", payload.readings.len());
            Ok(payload.readings)
        }
    }

    fn normalize_base_url(base_url: &str) -> Result<String> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                base_url
            )));
        }
        Ok(base_url)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_source_creation() {
            let source = HttpSource::new("http://localhost:3001").unwrap();
            assert_eq!(source.base_url(), "http://localhost:3001");
        }

        #[test]
        fn test_source_normalizes_url() {
            let source = HttpSource::new(" https://api.example.com/ ").unwrap();
            assert_eq!(source.base_url(), "https://api.example.com");
        }

        #[test]
        fn test_source_invalid_url() {
            let result = HttpSource::new("localhost:3001");
            assert!(matches!(result, Err(Error::InvalidUrl(_))));
        }

        #[test]
        fn test_readings_url_clamps_limit() {
            let source = HttpSource::new("http://localhost:3001").unwrap();
            assert_eq!(
                source.readings_url(50),
                "http://localhost:3001/readings?limit=50"
            );
            assert_eq!(
                source.readings_url(0),
                "http://localhost:3001/readings?limit=1"
            );
            assert_eq!(
                source.readings_url(5000),
                "http://localhost:3001/readings?limit=1000"
            );
        }

        #[tokio::test]
        async fn test_unreachable_endpoint_is_request_error() {
            // Port 9 (discard) on localhost is not expected to serve HTTP.
            let source = HttpSource::new("http://127.0.0.1:9").unwrap();
            let err = source.fetch_readings(1).await.unwrap_err();
            assert!(matches!(err, Error::Request { .. }));
            assert!(err.is_transient());
        }
    }
}
