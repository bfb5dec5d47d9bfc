//! Read command implementation.

use std::path::PathBuf;

use anyhow::{Result, bail};

use homeclimate_core::{
    DashboardSnapshot, PollEvent, PollOptions, Poller, ReadingSource, Thresholds,
};

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_snapshot_json, format_snapshot_text};
use crate::util::{connect_source, write_output};

/// Arguments for the read command.
pub struct ReadArgs<'a> {
    pub url: String,
    pub options: PollOptions,
    pub thresholds: Thresholds,
    pub format: OutputFormat,
    pub output: Option<&'a PathBuf>,
    pub quiet: bool,
    pub opts: &'a FormatOptions,
}

pub async fn cmd_read(args: ReadArgs<'_>) -> Result<()> {
    let ReadArgs {
        url,
        options,
        thresholds,
        format,
        output,
        quiet,
        opts,
    } = args;

    let source = connect_source(&url)?;
    let snapshot = match load_snapshot(source, options, thresholds).await? {
        (_, Some(error)) => bail!("Failed to load readings from {}: {}", url, error),
        (snapshot, None) => snapshot,
    };

    if !quiet {
        eprintln!("Loaded {} readings from {}", snapshot.history.len(), url);
    }

    let content = match format {
        OutputFormat::Json => format_snapshot_json(&snapshot, opts)?,
        OutputFormat::Text => format_snapshot_text(&snapshot, opts),
    };
    write_output(output, &content)
}

/// Run the initial load once and capture the resulting dashboard.
///
/// The second element carries the load error, if any.
async fn load_snapshot<S: ReadingSource>(
    source: S,
    options: PollOptions,
    thresholds: Thresholds,
) -> Result<(DashboardSnapshot, Option<String>)> {
    let mut poller = Poller::new(source, options, thresholds)?;
    let error = match poller.initial_load().await {
        PollEvent::InitialLoadFailed { error } => Some(error),
        _ => None,
    };
    Ok((poller.snapshot(), error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use homeclimate_core::{MockSource, PollerState};

    #[tokio::test]
    async fn test_load_snapshot() {
        let source = MockSource::with_readings(vec![
            MockSource::reading(2_000, 22.0),
            MockSource::reading(1_000, 21.0),
        ]);

        let (snapshot, error) =
            load_snapshot(source, PollOptions::default(), Thresholds::default())
                .await
                .unwrap();
        assert!(error.is_none());
        assert_eq!(snapshot.state, PollerState::Ready);
        assert_eq!(snapshot.history.len(), 2);
        assert_eq!(snapshot.last_seen_timestamp, Some(2_000));
        assert_eq!(snapshot.current_reading.unwrap().temperature, 22.0);
    }

    #[tokio::test]
    async fn test_load_snapshot_reports_failure() {
        let source = MockSource::new();
        source.set_should_fail(true, Some("connection refused")).await;

        let (snapshot, error) =
            load_snapshot(source, PollOptions::default(), Thresholds::default())
                .await
                .unwrap();
        assert!(error.unwrap().contains("connection refused"));
        assert!(snapshot.is_ready());
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_load_snapshot_rejects_invalid_options() {
        let options = PollOptions::builder().initial_limit(0).build();
        let result = load_snapshot(MockSource::new(), options, Thresholds::default()).await;
        assert!(result.is_err());
    }
}
