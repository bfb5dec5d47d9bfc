//! Watch command implementation.
//!
//! Runs the poller in the background and prints a line for every new
//! reading. Stale and empty polls print nothing; failures are logged by the
//! poller itself.

use anyhow::Result;
use futures::StreamExt;
use owo_colors::OwoColorize;

use homeclimate_core::{DashboardSnapshot, PollEvent, PollOptions, Poller, Thresholds};

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_event_line, format_snapshot_text};
use crate::util::{connect_source, write_output};

/// Arguments for the watch command.
pub struct WatchArgs<'a> {
    pub url: String,
    pub options: PollOptions,
    pub thresholds: Thresholds,
    pub count: u32,
    pub dashboard: bool,
    pub format: OutputFormat,
    pub opts: &'a FormatOptions,
}

pub async fn cmd_watch(args: WatchArgs<'_>) -> Result<()> {
    let WatchArgs {
        url,
        options,
        thresholds,
        count,
        dashboard,
        format,
        opts,
    } = args;

    let source = connect_source(&url)?;
    let interval = options.interval;
    let mut handle = Poller::spawn(source, options, thresholds.clone())?;

    let header = if opts.no_color {
        format!("Watching: {}", url)
    } else {
        format!("Watching: {}", url.cyan())
    };
    eprintln!("{}", header);
    if count > 0 {
        eprintln!(
            "Interval: {}ms | Count: {} | Press Ctrl+C to stop",
            interval.as_millis(),
            count
        );
    } else {
        eprintln!("Interval: {}ms | Press Ctrl+C to stop", interval.as_millis());
    }
    eprintln!("{}", "-".repeat(50));

    let mut updates: u32 = 0;
    loop {
        let event = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nShutting down...");
                break;
            }
            event = handle.next() => match event {
                Some(event) => event,
                None => break,
            },
        };

        let snapshot = handle.snapshot();
        let rendered = render_event(&event, &snapshot, &thresholds, format, dashboard, opts)?;
        if let Some(content) = rendered {
            write_output(None, &content)?;
        }

        if matches!(event, PollEvent::Updated { .. }) {
            updates += 1;
            if count > 0 && updates >= count {
                eprintln!("Completed {} updates.", updates);
                break;
            }
        }
    }

    handle.close();
    Ok(())
}

/// Render one poll event in the requested format.
///
/// JSON mode emits one compact snapshot per line whenever the dashboard
/// changed. Dashboard mode redraws the full view on the same events.
fn render_event(
    event: &PollEvent,
    snapshot: &DashboardSnapshot,
    thresholds: &Thresholds,
    format: OutputFormat,
    dashboard: bool,
    opts: &FormatOptions,
) -> Result<Option<String>> {
    let changed = matches!(
        event,
        PollEvent::InitialLoad { .. } | PollEvent::InitialLoadFailed { .. } | PollEvent::Updated { .. }
    );

    match format {
        OutputFormat::Json if changed => Ok(Some(opts.with_compact(true).as_json(snapshot)?)),
        OutputFormat::Json => Ok(None),
        OutputFormat::Text if dashboard && changed => {
            Ok(Some(format!("{}\n", format_snapshot_text(snapshot, opts))))
        }
        OutputFormat::Text => Ok(format_event_line(event, snapshot, thresholds, opts)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homeclimate_core::{MockSource, Session};
    use time::macros::datetime;

    fn snapshot() -> DashboardSnapshot {
        let mut session = Session::new();
        session.begin_loading();
        session.complete_initial_load(vec![MockSource::reading(1_000, 21.0)], 0);
        DashboardSnapshot::capture(
            &session,
            &Thresholds::default(),
            datetime!(2025-03-01 12:00 UTC),
        )
    }

    #[test]
    fn test_render_json_only_on_change() {
        let snapshot = snapshot();
        let opts = FormatOptions::new(true);

        let line = render_event(
            &PollEvent::Updated { timestamp: 1_000 },
            &snapshot,
            &Thresholds::default(),
            OutputFormat::Json,
            false,
            &opts,
        )
        .unwrap()
        .unwrap();
        assert_eq!(line.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["lastSeenTimestamp"], 1_000);

        let stale = render_event(
            &PollEvent::Stale {
                timestamp: 1_000,
                last_seen: 1_000,
            },
            &snapshot,
            &Thresholds::default(),
            OutputFormat::Json,
            false,
            &opts,
        )
        .unwrap();
        assert!(stale.is_none());
    }

    #[test]
    fn test_render_dashboard_mode() {
        let snapshot = snapshot();
        let opts = FormatOptions::new(true);

        let text = render_event(
            &PollEvent::InitialLoad { count: 1 },
            &snapshot,
            &Thresholds::default(),
            OutputFormat::Text,
            true,
            &opts,
        )
        .unwrap()
        .unwrap();
        assert!(text.starts_with("Home Climate\n"));
        assert!(text.contains("Comfort:"));

        let empty = render_event(
            &PollEvent::Empty,
            &snapshot,
            &Thresholds::default(),
            OutputFormat::Text,
            true,
            &opts,
        )
        .unwrap();
        assert!(empty.is_none());
    }

    #[test]
    fn test_render_line_mode() {
        let snapshot = snapshot();
        let opts = FormatOptions::new(true);

        let line = render_event(
            &PollEvent::Updated { timestamp: 1_000 },
            &snapshot,
            &Thresholds::default(),
            OutputFormat::Text,
            false,
            &opts,
        )
        .unwrap()
        .unwrap();
        assert!(line.starts_with("[1970-01-01T00:00:01Z] 21.0 °C"));
    }
}
