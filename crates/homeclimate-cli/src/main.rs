//! Command-line dashboard for environmental sensor readings.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `read` | Load recent readings once and print the dashboard |
//! | `watch` | Poll continuously and print each new reading |
//! | `config` | Manage the configuration file |
//!
//! # Environment Variables
//!
//! - `HOMECLIMATE_URL`: Readings API base URL (overridden by `--url`)
//! - `NO_COLOR`: Disable colored output when set
//! - `RUST_LOG`: Log filter when neither `--verbose` nor `--quiet` is given

mod cli;
mod commands;
mod config;
mod format;
mod style;
mod util;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use time::UtcOffset;
use tracing_subscriber::EnvFilter;

use homeclimate_core::Thresholds;

use cli::{Cli, Commands};
use commands::{ReadArgs, WatchArgs, cmd_config, cmd_read, cmd_watch};
use config::{Config, resolve_url};
use format::FormatOptions;
use util::require_url;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Config commands work even when the file does not validate.
    if let Commands::Config { action } = &cli.command {
        return cmd_config(action, cli.config.as_deref());
    }

    let config = load_config(cli.config.as_deref())?;

    // The local offset can only be read while the process is single-threaded.
    let utc_offset = config.utc_offset();

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(run(cli, config, utc_offset))
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = Config::load_or_default(path).context("Failed to load configuration")?;
    config.validate()?;
    tracing::debug!("Loaded configuration: {:?}", config);
    Ok(config)
}

async fn run(cli: Cli, config: Config, utc_offset: UtcOffset) -> Result<()> {
    let no_color =
        cli.no_color || config.display.no_color || std::env::var_os("NO_COLOR").is_some();
    let thresholds = Thresholds::new(config.thresholds.clone());
    let mut options = config.poll_options(utc_offset);

    match cli.command {
        Commands::Read { source, output } => {
            let url = require_url(resolve_url(source.url, &config))?;
            if let Some(limit) = source.limit {
                options.initial_limit = limit;
            }
            let opts = FormatOptions::new(no_color).with_compact(output.compact);
            cmd_read(ReadArgs {
                url,
                options,
                thresholds,
                format: output.format,
                output: output.output.as_ref(),
                quiet: cli.quiet,
                opts: &opts,
            })
            .await
        }
        Commands::Watch {
            source,
            interval,
            count,
            dashboard,
            format,
        } => {
            let url = require_url(resolve_url(source.url, &config))?;
            if let Some(limit) = source.limit {
                options.initial_limit = limit;
            }
            if let Some(ms) = interval {
                options.interval = Duration::from_millis(ms);
            }
            let opts = FormatOptions::new(no_color);
            cmd_watch(WatchArgs {
                url,
                options,
                thresholds,
                count,
                dashboard,
                format,
                opts: &opts,
            })
            .await
        }
        Commands::Config { action } => cmd_config(&action, cli.config.as_deref()),
    }
}
