//! Error types for reading payload decoding in homeclimate-types.

use thiserror::Error;

/// Errors that can occur when decoding sensor reading payloads.
///
/// This error type is transport-agnostic; network failures belong in
/// homeclimate-core.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The payload did not match the expected `{ readings, count }` shape.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// A `received_at` value was not a valid RFC 3339 timestamp.
    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },
}

/// Result type alias using homeclimate-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
