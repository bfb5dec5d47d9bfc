//! Configuration file management.
//!
//! The file lives at `<config_dir>/homeclimate/config.toml` unless `--config`
//! points elsewhere. Every section is optional:
//!
//! ```toml
//! [source]
//! url = "http://localhost:3001"
//!
//! [polling]
//! interval_ms = 5000
//! initial_limit = 50
//!
//! [thresholds]
//! gas_resistance_min = 100000.0
//! comfort = { min = 20.0, max = 24.0 }
//!
//! [display]
//! no_color = false
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::UtcOffset;

use homeclimate_core::{PollOptions, ThresholdConfig};
use homeclimate_core::source::MAX_READINGS_LIMIT;

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where readings come from.
    pub source: SourceConfig,
    /// Polling cadence and batch sizes.
    pub polling: PollingConfig,
    /// Zone and optimality ranges.
    pub thresholds: ThresholdConfig,
    /// Output preferences.
    pub display: DisplayConfig,
}

/// Reading source settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL of the readings API (e.g. `http://localhost:3001`).
    pub url: Option<String>,
}

/// Polling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Milliseconds between polls.
    pub interval_ms: u64,
    /// Readings requested on startup.
    pub initial_limit: usize,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        let options = PollOptions::default();
        Self {
            interval_ms: options.interval.as_millis() as u64,
            initial_limit: options.initial_limit,
            request_timeout_secs: options.request_timeout.as_secs(),
        }
    }
}

/// Display settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Disable colored output.
    pub no_color: bool,
    /// Offset from UTC, in minutes, for the sleep-time clock.
    /// Uses the system offset when unset.
    pub utc_offset_minutes: Option<i32>,
}

impl Config {
    /// Load configuration from `path`, or from the default path.
    ///
    /// A missing file at the default path yields the defaults; a missing file
    /// given explicitly is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let path = default_config_path();
                if path.exists() {
                    Self::load(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration and return every problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if let Some(url) = &self.source.url
            && !url.starts_with("http://")
            && !url.starts_with("https://")
        {
            errors.push(ValidationError {
                field: "source.url".to_string(),
                message: format!("must start with http:// or https://, got '{}'", url),
            });
        }

        errors.extend(self.polling.validate());

        if let Err(e) = self.thresholds.validate() {
            errors.push(ValidationError {
                field: "thresholds".to_string(),
                message: e.to_string(),
            });
        }

        if let Some(minutes) = self.display.utc_offset_minutes
            && UtcOffset::from_whole_seconds(minutes.saturating_mul(60)).is_err()
        {
            errors.push(ValidationError {
                field: "display.utc_offset_minutes".to_string(),
                message: format!("{} is out of range", minutes),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Poll options derived from this configuration.
    pub fn poll_options(&self, utc_offset: UtcOffset) -> PollOptions {
        PollOptions::builder()
            .interval(Duration::from_millis(self.polling.interval_ms))
            .initial_limit(self.polling.initial_limit)
            .request_timeout(Duration::from_secs(self.polling.request_timeout_secs))
            .utc_offset(utc_offset)
            .build()
    }

    /// Offset for the sleep-time clock: configured, else system, else UTC.
    pub fn utc_offset(&self) -> UtcOffset {
        if let Some(offset) = self
            .display
            .utc_offset_minutes
            .and_then(|m| UtcOffset::from_whole_seconds(m.saturating_mul(60)).ok())
        {
            return offset;
        }
        UtcOffset::current_local_offset().unwrap_or_else(|_| {
            tracing::debug!("Local UTC offset unavailable, using UTC");
            UtcOffset::UTC
        })
    }
}

impl PollingConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !(100..=3_600_000).contains(&self.interval_ms) {
            errors.push(ValidationError {
                field: "polling.interval_ms".to_string(),
                message: format!(
                    "must be between 100 and 3600000, got {}",
                    self.interval_ms
                ),
            });
        }
        if !(1..=MAX_READINGS_LIMIT).contains(&self.initial_limit) {
            errors.push(ValidationError {
                field: "polling.initial_limit".to_string(),
                message: format!(
                    "must be between 1 and {}, got {}",
                    MAX_READINGS_LIMIT, self.initial_limit
                ),
            });
        }
        if self.request_timeout_secs == 0 {
            errors.push(ValidationError {
                field: "polling.request_timeout_secs".to_string(),
                message: "must be > 0".to_string(),
            });
        }

        errors
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The field path (e.g., `polling.interval_ms`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("homeclimate")
        .join("config.toml")
}

/// Resolve the source URL: explicit flag or env var first, then config.
pub fn resolve_url(arg: Option<String>, config: &Config) -> Option<String> {
    arg.filter(|s| !s.trim().is_empty())
        .or_else(|| config.source.url.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use homeclimate_core::thresholds::Range;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.source.url, None);
        assert_eq!(config.polling.interval_ms, 5000);
        assert_eq!(config.polling.initial_limit, 50);
        assert_eq!(config.polling.request_timeout_secs, 10);
        assert!(!config.display.no_color);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml = r#"
            [source]
            url = "http://localhost:3001"

            [thresholds]
            gas_resistance_min = 50000.0
            comfort = { min = 19.0, max = 23.0 }
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.source.url.as_deref(), Some("http://localhost:3001"));
        assert_eq!(config.polling.interval_ms, 5000);
        assert_eq!(config.thresholds.gas_resistance_min, 50_000.0);
        assert_eq!(config.thresholds.comfort, Range::new(19.0, 23.0));
        assert_eq!(config.thresholds.sleep, Range::new(18.0, 20.0));
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.source.url = Some("https://sensors.example.com".to_string());
        config.polling.interval_ms = 10_000;
        config.display.no_color = true;
        config.display.utc_offset_minutes = Some(120);

        config.save(&config_path).unwrap();
        let loaded = Config::load(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = Config::load(temp_dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));

        let result = Config::load_or_default(Some(&temp_dir.path().join("missing.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("bad.toml");
        std::fs::write(&path, "[polling\ninterval_ms = ").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = Config::default();
        config.source.url = Some("localhost:3001".to_string());
        config.polling.interval_ms = 0;
        config.polling.initial_limit = 5000;
        config.polling.request_timeout_secs = 0;
        config.thresholds.tolerable = Range::new(30.0, 10.0);
        config.display.utc_offset_minutes = Some(24 * 60);

        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(
                    fields,
                    vec![
                        "source.url",
                        "polling.interval_ms",
                        "polling.initial_limit",
                        "polling.request_timeout_secs",
                        "thresholds",
                        "display.utc_offset_minutes",
                    ]
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_error_display() {
        let error = ConfigError::Validation(vec![
            ValidationError {
                field: "polling.interval_ms".to_string(),
                message: "must be between 100 and 3600000, got 0".to_string(),
            },
            ValidationError {
                field: "source.url".to_string(),
                message: "bad".to_string(),
            },
        ]);
        let text = error.to_string();
        assert!(text.contains("  - polling.interval_ms: must be between"));
        assert!(text.contains("  - source.url: bad"));
    }

    #[test]
    fn test_poll_options_from_config() {
        let mut config = Config::default();
        config.polling.interval_ms = 2500;
        config.polling.initial_limit = 100;

        let offset = UtcOffset::from_hms(2, 0, 0).unwrap();
        let options = config.poll_options(offset);
        assert_eq!(options.interval, Duration::from_millis(2500));
        assert_eq!(options.initial_limit, 100);
        assert_eq!(options.poll_limit, 1);
        assert_eq!(options.utc_offset, offset);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_configured_utc_offset_wins() {
        let mut config = Config::default();
        config.display.utc_offset_minutes = Some(-300);
        assert_eq!(config.utc_offset(), UtcOffset::from_hms(-5, 0, 0).unwrap());
    }

    #[test]
    fn test_resolve_url() {
        let mut config = Config::default();
        assert_eq!(resolve_url(None, &config), None);

        config.source.url = Some("http://from-config".to_string());
        assert_eq!(
            resolve_url(None, &config).as_deref(),
            Some("http://from-config")
        );
        assert_eq!(
            resolve_url(Some("http://from-flag".to_string()), &config).as_deref(),
            Some("http://from-flag")
        );
        assert_eq!(
            resolve_url(Some("  ".to_string()), &config).as_deref(),
            Some("http://from-config")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert!(path.ends_with("homeclimate/config.toml"));
    }
}
