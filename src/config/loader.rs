//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::CollectorConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<CollectorConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: CollectorConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("appflow-{}-{}.toml", name, std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_valid_file() {
        let path = write_temp("valid", "[listener]\nbind_address = \"127.0.0.1:7001\"\n");
        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:7001");
        fs::remove_file(path).unwrap_or_default();
    }

    #[test]
    fn test_load_reports_each_failure_kind() {
        let missing = std::env::temp_dir().join("appflow-does-not-exist.toml");
        assert!(matches!(load_config(&missing), Err(ConfigError::Io(_))));

        let path = write_temp("syntax", "[listener\n");
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
        fs::remove_file(path).unwrap_or_default();

        let path = write_temp("semantic", "[listener]\nmax_datagram_size = 100000\n");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("max_datagram_size"));
        fs::remove_file(path).unwrap_or_default();
    }
}
