//! Configuration management for Sift
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, SiftError};
use crate::rules::{default_rules, FilterRule};
use crate::session::SessionPolicy;
use crate::sources::{default_sources, DataSource};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Main configuration structure for Sift
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Labeling session policy
    #[serde(default)]
    pub session: SessionPolicy,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Manual cleaning rules
    #[serde(default = "default_rules")]
    pub rules: Vec<FilterRule>,

    /// Data source catalog
    #[serde(default = "default_sources")]
    pub sources: Vec<DataSource>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Enable JSON-formatted logs
    #[serde(default)]
    pub json_format: bool,

    /// Log file path (if None, STDERR only)
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SiftError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| SiftError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(count) = std::env::var("SIFT_SAMPLE_COUNT") {
            if let Ok(value) = count.parse() {
                self.session.sample_count = value;
            } else {
                tracing::warn!("Invalid SIFT_SAMPLE_COUNT: {}", count);
            }
        }

        if let Ok(total) = std::env::var("SIFT_TOTAL_ITEMS") {
            if let Ok(value) = total.parse() {
                self.session.total_items = value;
            } else {
                tracing::warn!("Invalid SIFT_TOTAL_ITEMS: {}", total);
            }
        }

        if let Ok(delay) = std::env::var("SIFT_TRAINING_DELAY_MS") {
            if let Ok(value) = delay.parse() {
                self.session.training_delay_ms = value;
            } else {
                tracing::warn!("Invalid SIFT_TRAINING_DELAY_MS: {}", delay);
            }
        }

        if let Ok(interval) = std::env::var("SIFT_TICK_INTERVAL_MS") {
            if let Ok(value) = interval.parse() {
                self.session.tick_interval_ms = value;
            } else {
                tracing::warn!("Invalid SIFT_TICK_INTERVAL_MS: {}", interval);
            }
        }

        if let Ok(seed) = std::env::var("SIFT_SEED") {
            if let Ok(value) = seed.parse() {
                self.session.seed = Some(value);
            } else {
                tracing::warn!("Invalid SIFT_SEED: {}", seed);
            }
        }

        if let Ok(level) = std::env::var("SIFT_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(json) = std::env::var("SIFT_LOG_JSON") {
            self.logging.json_format = matches!(json.to_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            self.logging.level = "debug".to_string();
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        self.session.validate()?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(SiftError::Config(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            ))
            .into());
        }

        let mut rule_ids = HashSet::new();
        for rule in &self.rules {
            if !rule_ids.insert(rule.id.as_str()) {
                return Err(
                    SiftError::Config(format!("Duplicate rule id: {}", rule.id)).into(),
                );
            }
        }

        let mut source_ids = HashSet::new();
        for source in &self.sources {
            if !source_ids.insert(source.id.as_str()) {
                return Err(
                    SiftError::Config(format!("Duplicate source id: {}", source.id)).into(),
                );
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session: SessionPolicy::default(),
            logging: LoggingConfig::default(),
            rules: default_rules(),
            sources: default_sources(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use serial_test::serial;

    fn cli(verbose: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            command: Commands::Sources { json: false },
        }
    }

    fn clear_env() {
        for key in [
            "SIFT_SAMPLE_COUNT",
            "SIFT_TOTAL_ITEMS",
            "SIFT_TRAINING_DELAY_MS",
            "SIFT_TICK_INTERVAL_MS",
            "SIFT_SEED",
            "SIFT_LOG_LEVEL",
            "SIFT_LOG_JSON",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.session.sample_count, 15);
        assert_eq!(config.session.total_items, 12_450);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.rules.len(), 3);
        assert_eq!(config.sources.len(), 4);
    }

    #[test]
    fn test_config_validation_success() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_policy() {
        let mut config = Config::default();
        config.session.tick_interval_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("tick_interval_ms"));
    }

    #[test]
    fn test_config_validation_duplicate_rule_ids() {
        let mut config = Config::default();
        let duplicate = config.rules[0].clone();
        config.rules.push(duplicate);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
session:
  sample_count: 5
  training_delay_ms: 10
logging:
  level: warn
  json_format: true
rules: []
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.session.sample_count, 5);
        assert_eq!(config.session.training_delay_ms, 10);
        assert_eq!(config.session.tick_interval_ms, 200);
        assert_eq!(config.logging.level, "warn");
        assert!(config.logging.json_format);
        assert!(config.rules.is_empty());
        assert_eq!(config.sources.len(), 4);
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        clear_env();
        let config = Config::load("nonexistent.yaml", &cli(false)).unwrap();
        assert_eq!(config.session, SessionPolicy::default());
    }

    #[test]
    #[serial]
    fn test_load_reads_file() {
        clear_env();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "session:\n  total_items: 900\n").unwrap();

        let config = Config::load(path.to_str().unwrap(), &cli(false)).unwrap();
        assert_eq!(config.session.total_items, 900);
    }

    #[test]
    #[serial]
    fn test_load_rejects_malformed_file() {
        clear_env();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "session: [not, a, map]\n").unwrap();

        let err = Config::load(path.to_str().unwrap(), &cli(false)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_overrides_session() {
        clear_env();
        std::env::set_var("SIFT_SAMPLE_COUNT", "8");
        std::env::set_var("SIFT_TICK_INTERVAL_MS", "5");
        std::env::set_var("SIFT_SEED", "1234");
        std::env::set_var("SIFT_TOTAL_ITEMS", "not-a-number");

        let config = Config::load("nonexistent.yaml", &cli(false)).unwrap();
        assert_eq!(config.session.sample_count, 8);
        assert_eq!(config.session.tick_interval_ms, 5);
        assert_eq!(config.session.seed, Some(1234));
        assert_eq!(config.session.total_items, 12_450);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_verbose_flag_raises_log_level() {
        clear_env();
        std::env::set_var("SIFT_LOG_LEVEL", "warn");
        let config = Config::load("nonexistent.yaml", &cli(true)).unwrap();
        assert_eq!(config.logging.level, "debug");
        clear_env();
    }
}
