//! Utility functions for CLI operations.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use homeclimate_core::HttpSource;

/// Get the source URL, with a helpful error message.
pub fn require_url(url: Option<String>) -> Result<String> {
    url.ok_or_else(|| {
        anyhow::anyhow!(
            "No source URL configured. Use --url <URL>, set HOMECLIMATE_URL, \
             or add `url` under [source] in the config file.\n\
             Run 'homeclimate config path' to find the config file."
        )
    })
}

/// Build an HTTP reading source for `url`.
pub fn connect_source(url: &str) -> Result<HttpSource> {
    HttpSource::new(url).with_context(|| format!("Failed to create reading source for {}", url))
}

/// Write output to file (replacing it) or stdout.
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_url_with_some() {
        let result = require_url(Some("http://localhost:3001".to_string()));
        assert_eq!(result.unwrap(), "http://localhost:3001");
    }

    #[test]
    fn test_require_url_with_none() {
        let err = require_url(None).unwrap_err();
        assert!(err.to_string().contains("HOMECLIMATE_URL"));
    }

    #[test]
    fn test_connect_source_rejects_bad_scheme() {
        let err = connect_source("ftp://example.com").unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("ftp://example.com"));
        assert!(message.contains("must start with http://"));
    }

    #[test]
    fn test_connect_source_normalizes_url() {
        let source = connect_source("http://localhost:3001/").unwrap();
        assert_eq!(source.base_url(), "http://localhost:3001");
    }

    #[test]
    fn test_write_output_to_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out.json");

        write_output(Some(&path), "{}\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}\n");
    }
}
