//! Platform-agnostic reading types for the Home Climate dashboard.
//!
//! This crate provides the wire and normalized representations of a sensor
//! reading, shared by the core library and any front end.
//!
//! # Features
//!
//! - Raw wire readings (pressure in hundredths of hPa)
//! - Normalized readings in engineering units
//! - Response envelope decoding for `GET /readings`
//! - Error types for payload decoding
//!
//! # Example
//!
//! ```
//! use homeclimate_types::ReadingsResponse;
//!
//! let body = r#"{"readings":[{"sensorId":"sensor-1","timestamp":10,
//!     "temperature":22.0,"humidity":50.0,"pressure":101300.0,
//!     "gas_resistance":150000.0,"received_at":"2025-01-01T00:00:00Z"}],"count":1}"#;
//! let readings = ReadingsResponse::from_json(body).unwrap().into_readings();
//! assert_eq!(readings[0].pressure, 1013.0);
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{PRESSURE_SCALE, RawReading, Reading, ReadingsResponse};


/// Property-based tests for payload decoding.
///
/// Run with: `cargo test -p homeclimate-types proptests`
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Decoding arbitrary text should never panic.
        #[test]
        fn from_json_never_panics(body in ".*") {
            let _ = ReadingsResponse::from_json(&body);
        }

        /// Normalization only rescales pressure.
        #[test]
        fn normalize_rescales_pressure_only(
            timestamp in any::<i64>(),
            temperature in -40.0f64..85.0,
            pressure in 30_000.0f64..110_000.0,
        ) {
            let raw = RawReading {
                sensor_id: "sensor-1".to_string(),
                timestamp,
                temperature,
                humidity: 50.0,
                pressure,
                gas_resistance: 1.0,
                received_at: String::new(),
            };
            let reading = raw.normalize();
            prop_assert_eq!(reading.timestamp, timestamp);
            prop_assert_eq!(reading.temperature, temperature);
            prop_assert!((reading.pressure * PRESSURE_SCALE - pressure).abs() < 1e-6);
        }
    }
}
