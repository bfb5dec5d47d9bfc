//! Core types for environmental sensor readings.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::{ParseError, ParseResult};

/// Divisor converting the wire pressure (hundredths of hPa) to hPa.
pub const PRESSURE_SCALE: f64 = 100.0;

/// A reading exactly as returned by the readings endpoint.
///
/// Mirrors [`Reading`] except that `pressure` is expressed in hundredths of
/// hPa (i.e. Pascals). Use [`RawReading::normalize`] to obtain engineering
/// units.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawReading {
    /// Identifier of the sensor that produced the reading.
    #[cfg_attr(feature = "serde", serde(rename = "sensorId"))]
    pub sensor_id: String,
    /// Epoch timestamp in milliseconds, monotonic per sensor.
    pub timestamp: i64,
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// Relative humidity percentage.
    pub humidity: f64,
    /// Pressure in hundredths of hPa.
    pub pressure: f64,
    /// Gas resistance in Ohms.
    #[cfg_attr(feature = "serde", serde(alias = "gasResistance"))]
    pub gas_resistance: f64,
    /// Time the backend received the reading, as sent on the wire.
    #[cfg_attr(feature = "serde", serde(alias = "receivedAt", default))]
    pub received_at: String,
}

impl RawReading {
    /// Convert into canonical engineering units.
    ///
    /// Pressure is divided by [`PRESSURE_SCALE`]; every other field passes
    /// through unchanged.
    ///
    /// ```
    /// use homeclimate_types::RawReading;
    ///
    /// let raw = RawReading {
    ///     sensor_id: "sensor-1".into(),
    ///     timestamp: 1_700_000_000,
    ///     temperature: 21.5,
    ///     humidity: 48.0,
    ///     pressure: 101_325.0,
    ///     gas_resistance: 120_000.0,
    ///     received_at: String::new(),
    /// };
    /// assert_eq!(raw.normalize().pressure, 1013.25);
    /// ```
    #[must_use]
    pub fn normalize(self) -> Reading {
        Reading {
            sensor_id: self.sensor_id,
            timestamp: self.timestamp,
            temperature: self.temperature,
            humidity: self.humidity,
            pressure: self.pressure / PRESSURE_SCALE,
            gas_resistance: self.gas_resistance,
            received_at: self.received_at,
        }
    }
}

impl From<RawReading> for Reading {
    fn from(raw: RawReading) -> Self {
        raw.normalize()
    }
}

/// One normalized sample of sensor metrics at a point in time.
///
/// Within a reconciled history the `timestamp` uniquely identifies a reading.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Reading {
    /// Identifier of the sensor that produced the reading.
    pub sensor_id: String,
    /// Epoch timestamp in milliseconds, monotonic per sensor.
    pub timestamp: i64,
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// Relative humidity percentage.
    pub humidity: f64,
    /// Pressure in hPa.
    pub pressure: f64,
    /// Gas resistance in Ohms.
    pub gas_resistance: f64,
    /// Time the backend received the reading, as sent on the wire.
    pub received_at: String,
}

impl Reading {
    /// Gas resistance in kΩ, rounded to the nearest integer.
    #[must_use]
    pub fn gas_resistance_kohm(&self) -> i64 {
        (self.gas_resistance / 1000.0).round() as i64
    }

    /// Parse `received_at` as an RFC 3339 timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidTimestamp`] when the field is empty or
    /// not valid RFC 3339.
    pub fn received_at_time(&self) -> ParseResult<OffsetDateTime> {
        OffsetDateTime::parse(&self.received_at, &Rfc3339).map_err(|e| {
            ParseError::InvalidTimestamp {
                value: self.received_at.clone(),
                reason: e.to_string(),
            }
        })
    }
}

/// Body of `GET /readings?limit=N`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReadingsResponse {
    /// Readings, most recent first as served by the backend.
    pub readings: Vec<RawReading>,
    /// Number of readings in the payload.
    #[cfg_attr(feature = "serde", serde(default))]
    pub count: usize,
}

#[cfg(feature = "serde")]
impl ReadingsResponse {
    /// Decode a response body.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidPayload`] if the body is not valid JSON or
    /// does not have the expected shape.
    pub fn from_json(body: &str) -> ParseResult<Self> {
        serde_json::from_str(body).map_err(|e| ParseError::InvalidPayload(e.to_string()))
    }
}

impl ReadingsResponse {
    /// Normalize every reading in the payload, preserving order.
    #[must_use]
    pub fn into_readings(self) -> Vec<Reading> {
        self.readings.into_iter().map(RawReading::normalize).collect()
    }
}
