//! Output formatting for text and JSON.

use anyhow::Result;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use homeclimate_core::{
    DashboardSnapshot, DerivedMetrics, MetricOptimality, PollEvent, PollerState, Thresholds,
};

use crate::style;

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
}

impl FormatOptions {
    pub fn new(no_color: bool) -> Self {
        Self {
            no_color,
            compact: false,
        }
    }

    /// Set compact JSON output.
    #[must_use]
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Serialize value to JSON string, respecting compact option.
    pub fn as_json<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        Ok(json + "\n")
    }
}

/// Format an epoch-millisecond timestamp as RFC 3339 (UTC).
///
/// Falls back to the raw number when out of range.
pub fn format_timestamp_ms(ms: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * 1_000_000)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
        .unwrap_or_else(|| ms.to_string())
}

/// Format a full dashboard view.
#[must_use]
pub fn format_snapshot_text(snapshot: &DashboardSnapshot, opts: &FormatOptions) -> String {
    let mut output = style::format_title("Home Climate", opts.no_color);
    output.push('\n');

    let (Some(reading), Some(metrics)) = (&snapshot.current_reading, &snapshot.metrics) else {
        let message = match snapshot.state {
            PollerState::Ready => "No readings available",
            PollerState::Uninitialized | PollerState::Loading => "Loading sensor data...",
        };
        output.push_str(message);
        output.push('\n');
        return output;
    };

    let badge = |optimal: bool| {
        style::format_status_badge(
            MetricOptimality::status_label(optimal),
            optimal,
            opts.no_color,
        )
    };

    output.push_str(&format!("Sensor:      {}\n", reading.sensor_id));
    output.push_str(&format!(
        "Updated:     {}\n",
        format_timestamp_ms(reading.timestamp)
    ));
    output.push_str(&format!(
        "Temperature: {} °C   {}\n",
        style::format_temp_colored(reading.temperature, metrics.zone, 6, opts.no_color),
        style::format_zone(metrics.zone, opts.no_color)
    ));
    output.push_str(&format!(
        "Humidity:    {:>6.1} %    {}\n",
        reading.humidity,
        badge(metrics.optimality.humidity)
    ));
    output.push_str(&format!(
        "Pressure:    {:>6.1} hPa  {}\n",
        reading.pressure,
        badge(metrics.optimality.pressure)
    ));
    output.push_str(&format!(
        "Gas:         {:>6} kΩ   {}\n",
        reading.gas_resistance_kohm(),
        badge(metrics.optimality.gas_resistance)
    ));
    output.push_str(&format!(
        "Comfort:     {}\n",
        style::format_comfort_colored(metrics.comfort_score, opts.no_color)
    ));

    if let Some(stats) = &snapshot.history_stats {
        output.push_str(&format!(
            "History:     {} readings, min {:.1} / avg {:.1} / max {:.1} °C, {} {:+.2} °C/h\n",
            snapshot.history.len(),
            stats.min,
            stats.avg,
            stats.max,
            style::trend_indicator(stats.trend, opts.no_color),
            stats.change_rate
        ));
    }

    if snapshot.poll_stats.consecutive_failures > 0 {
        let message = format!(
            "{} consecutive poll failures: {}",
            snapshot.poll_stats.consecutive_failures,
            snapshot.poll_stats.last_error.as_deref().unwrap_or("unknown error")
        );
        output.push_str(&style::format_warning(&message, opts.no_color));
        output.push('\n');
    }

    output
}

/// Format a snapshot as JSON.
pub fn format_snapshot_json(snapshot: &DashboardSnapshot, opts: &FormatOptions) -> Result<String> {
    opts.as_json(snapshot)
}

/// One-line summary of a poll event, for watch mode.
///
/// An update is rendered from the reading it reports, looked up in the
/// snapshot's history, so a snapshot that has moved on since the event was
/// queued still prints the right values. Returns `None` for events that do
/// not warrant output (stale or empty polls, or a reading no longer retained).
#[must_use]
pub fn format_event_line(
    event: &PollEvent,
    snapshot: &DashboardSnapshot,
    thresholds: &Thresholds,
    opts: &FormatOptions,
) -> Option<String> {
    match event {
        PollEvent::InitialLoad { count } => Some(format!("Loaded {} readings\n", count)),
        PollEvent::InitialLoadFailed { error } => Some(format!(
            "{}\n",
            style::format_warning(&format!("Initial load failed: {}", error), opts.no_color)
        )),
        PollEvent::Updated { timestamp } => {
            let reading = snapshot.history.get(*timestamp)?;
            let is_sleep_time = snapshot.metrics.as_ref().is_some_and(|m| m.is_sleep_time);
            let metrics = DerivedMetrics::with_sleep_time(reading, thresholds, is_sleep_time);
            Some(format!(
                "[{}] {} °C {}  {:.0}%  {:.1} hPa  {} kΩ  comfort {}\n",
                format_timestamp_ms(reading.timestamp),
                style::format_temp_colored(reading.temperature, metrics.zone, 0, opts.no_color),
                style::format_zone(metrics.zone, opts.no_color),
                reading.humidity,
                reading.pressure,
                reading.gas_resistance_kohm(),
                metrics.comfort_score
            ))
        }
        PollEvent::Failed { .. }
        | PollEvent::Stale { .. }
        | PollEvent::Empty
        | PollEvent::NotReady => None,
    }
}
