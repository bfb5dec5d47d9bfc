//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "homeclimate")]
#[command(author, version, about = "Live dashboard for environmental sensor readings", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to the config file (default: <config dir>/homeclimate/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Reusable reading source arguments
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Base URL of the readings API, or use HOMECLIMATE_URL env var
    #[arg(short, long, env = "HOMECLIMATE_URL")]
    pub url: Option<String>,

    /// Number of readings to load on startup (overrides config)
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Reusable output arguments
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Use compact JSON output
    #[arg(long)]
    pub compact: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load recent readings once and print the dashboard
    Read {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Poll continuously and print each new reading
    Watch {
        #[command(flatten)]
        source: SourceArgs,

        /// Poll interval in milliseconds (overrides config)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Stop after this many new readings (0 for unlimited)
        #[arg(short = 'n', long, default_value = "0")]
        count: u32,

        /// Redraw the full dashboard on each update instead of one line
        #[arg(long)]
        dashboard: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigAction {
    /// Print the config file path
    Path,
    /// Print the effective configuration
    Show,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
