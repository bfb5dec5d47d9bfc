//! Error types for homeclimate-core.
//!
//! Errors fall into three families:
//!
//! | Family | Variants | Poller behavior |
//! |--------|----------|-----------------|
//! | Fetch | [`Error::Request`], [`Error::Fetch`], [`Error::Status`], [`Error::Timeout`] | Log, keep state, retry next tick |
//! | Empty result | [`Error::EmptyResult`] | Keep state, retry next tick |
//! | Malformed payload | [`Error::MalformedPayload`] | Log, keep state, retry next tick |
//!
//! Construction errors ([`Error::InvalidUrl`], [`Error::InvalidConfig`]) are
//! returned to the caller before any polling starts.
//!
//! None of these are fatal: the [`Poller`](crate::poller::Poller) catches every
//! fetch-related error at its boundary and downgrades it to a log line, so
//! consumers of snapshots never observe a transient network failure.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while fetching or configuring sensor readings.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The HTTP request could not be sent or the connection failed.
    #[cfg(feature = "http")]
    #[error("Readings endpoint not reachable at {url}: {source}")]
    Request {
        /// The URL that was requested.
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A fetch failed for a transport-independent reason.
    #[error("Failed to fetch readings from {url}: {reason}")]
    Fetch {
        /// The URL or source description.
        url: String,
        /// Why the fetch failed.
        reason: String,
    },

    /// The endpoint answered with a non-success status.
    #[error("Readings endpoint returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message from the body, or the status text.
        message: String,
    },

    /// The fetch did not complete in time.
    #[error("Operation '{operation}' timed out after {duration:?}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The timeout duration.
        duration: Duration,
    },

    /// The endpoint returned zero readings.
    #[error("No readings returned")]
    EmptyResult,

    /// The response body did not match the expected shape.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// The base URL is not usable.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create a fetch error with a string reason.
    pub fn fetch_failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a timeout error with operation context.
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Whether a later attempt could plausibly succeed.
    ///
    /// Malformed payloads and construction errors are not transient; an empty
    /// result is, since the backend may simply not have data yet.
    pub fn is_transient(&self) -> bool {
        match self {
            #[cfg(feature = "http")]
            Self::Request { .. } => true,
            Self::Fetch { .. } | Self::Timeout { .. } | Self::EmptyResult => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::MalformedPayload(_) | Self::InvalidUrl(_) | Self::InvalidConfig(_) => false,
        }
    }
}

impl From<homeclimate_types::ParseError> for Error {
    fn from(err: homeclimate_types::ParseError) -> Self {
        match err {
            homeclimate_types::ParseError::InvalidPayload(msg) => Error::MalformedPayload(msg),
            // Handle future ParseError variants (non_exhaustive)
            _ => Error::MalformedPayload(err.to_string()),
        }
    }
}

/// Result type alias using homeclimate-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
