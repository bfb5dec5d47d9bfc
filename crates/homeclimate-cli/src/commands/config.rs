//! Config command implementation.

use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::cli::ConfigAction;
use crate::config::{Config, default_config_path};

pub fn cmd_config(action: &ConfigAction, path: Option<&Path>) -> Result<()> {
    let config_path = path.map_or_else(default_config_path, Path::to_path_buf);

    match action {
        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
        ConfigAction::Show => {
            let config = Config::load_or_default(path).context("Failed to load configuration")?;
            print!("{}", render_config(&config)?);
        }
        ConfigAction::Init { force } => {
            init_config(&config_path, *force)?;
            eprintln!("Wrote default configuration to {}", config_path.display());
        }
    }

    Ok(())
}

fn render_config(config: &Config) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize configuration")
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    Config::default().save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_config_writes_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("homeclimate").join("config.toml");

        init_config(&path, false).unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_init_config_refuses_overwrite() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[source]\nurl = \"http://keep\"\n").unwrap();

        let err = init_config(&path, false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(
            Config::load(&path).unwrap().source.url.as_deref(),
            Some("http://keep")
        );

        init_config(&path, true).unwrap();
        assert_eq!(Config::load(&path).unwrap().source.url, None);
    }

    #[test]
    fn test_render_config() {
        let text = render_config(&Config::default()).unwrap();
        assert!(text.contains("[polling]"));
        assert!(text.contains("interval_ms = 5000"));
        assert!(text.contains("[thresholds"));
    }
}
