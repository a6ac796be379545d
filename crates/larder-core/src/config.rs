//! Configuration module for Larder.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level configuration for Larder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub sync: SyncConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Remote service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the remote inventory service.
    pub base_url: String,
    /// Seconds before an HTTP request is abandoned.
    pub request_timeout: u64,
}

/// Synchronization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Seconds between periodic sync passes in watch mode.
    pub interval: u64,
    /// Whether a sync pass runs automatically after every local mutation.
    pub sync_on_mutation: bool,
}

/// Local record store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    pub database: PathBuf,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/larder/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("larder")
            .join("config.yaml")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.fridgemind.app".to_string(),
            request_timeout: 30,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: 60,
            sync_on_mutation: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("~/.local/share"))
                .join("larder")
                .join("larder.db"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sync.interval"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.server.base_url.is_empty() {
            errors.push(ValidationError {
                field: "server.base_url".into(),
                message: "must not be empty".into(),
            });
        } else if !self.server.base_url.starts_with("http://")
            && !self.server.base_url.starts_with("https://")
        {
            errors.push(ValidationError {
                field: "server.base_url".into(),
                message: format!("not an http(s) URL: {}", self.server.base_url),
            });
        }
        if self.server.request_timeout == 0 {
            errors.push(ValidationError {
                field: "server.request_timeout".into(),
                message: "must be greater than 0".into(),
            });
        }

        if self.sync.interval == 0 {
            errors.push(ValidationError {
                field: "sync.interval".into(),
                message: "must be greater than 0".into(),
            });
        }

        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn server_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.server.base_url = url.into();
        self
    }

    pub fn server_request_timeout(mut self, seconds: u64) -> Self {
        self.config.server.request_timeout = seconds;
        self
    }

    pub fn sync_interval(mut self, seconds: u64) -> Self {
        self.config.sync.interval = seconds;
        self
    }

    pub fn sync_on_mutation(mut self, enabled: bool) -> Self {
        self.config.sync.sync_on_mutation = enabled;
        self
    }

    pub fn storage_database(mut self, path: PathBuf) -> Self {
        self.config.storage.database = path;
        self
    }

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let cfg = Config::default();
        assert_eq!(cfg.server.request_timeout, 30);
        assert!(cfg.server.base_url.starts_with("https://"));
        assert_eq!(cfg.sync.interval, 60);
        assert!(cfg.sync.sync_on_mutation);
        assert!(cfg.storage.database.to_string_lossy().contains("larder"));
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn default_config_passes_validation() {
        let errors = Config::default().validate();
        assert!(errors.is_empty(), "unexpected validation errors: {errors:?}");
    }

    #[test]
    fn load_from_yaml_file() {
        let yaml = r#"
server:
  base_url: http://localhost:3000
  request_timeout: 10
sync:
  interval: 15
  sync_on_mutation: false
storage:
  database: /tmp/test-larder.db
logging:
  level: debug
"#;
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(yaml.as_bytes()).unwrap();
        tmp.flush().unwrap();

        let cfg = Config::load(tmp.path()).expect("load config");
        assert_eq!(cfg.server.base_url, "http://localhost:3000");
        assert_eq!(cfg.server.request_timeout, 10);
        assert_eq!(cfg.sync.interval, 15);
        assert!(!cfg.sync.sync_on_mutation);
        assert_eq!(cfg.storage.database, PathBuf::from("/tmp/test-larder.db"));
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn load_or_default_returns_default_on_missing_file() {
        let cfg = Config::load_or_default(Path::new("/nonexistent/config.yaml"));
        assert_eq!(cfg.sync.interval, 60);
    }

    #[test]
    fn load_returns_error_on_invalid_yaml() {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(b"not: [valid: yaml: {{{").unwrap();
        tmp.flush().unwrap();

        assert!(Config::load(tmp.path()).is_err());
    }

    #[test]
    fn validate_catches_bad_base_url() {
        let mut cfg = Config::default();
        cfg.server.base_url = "ftp://example.com".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "server.base_url"));
    }

    #[test]
    fn validate_catches_zero_sync_interval() {
        let mut cfg = Config::default();
        cfg.sync.interval = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "sync.interval"));
    }

    #[test]
    fn validate_catches_invalid_log_level() {
        let mut cfg = Config::default();
        cfg.logging.level = "verbose".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "logging.level"));
    }

    #[test]
    fn builder_overrides_fields() {
        let cfg = ConfigBuilder::new()
            .server_base_url("http://localhost:4000")
            .server_request_timeout(5)
            .sync_interval(300)
            .sync_on_mutation(false)
            .storage_database(PathBuf::from("/custom/larder.db"))
            .logging_level("trace")
            .build();

        assert_eq!(cfg.server.base_url, "http://localhost:4000");
        assert_eq!(cfg.server.request_timeout, 5);
        assert_eq!(cfg.sync.interval, 300);
        assert!(!cfg.sync.sync_on_mutation);
        assert_eq!(cfg.storage.database, PathBuf::from("/custom/larder.db"));
        assert_eq!(cfg.logging.level, "trace");
    }

    #[test]
    fn builder_build_validated_fails_for_invalid_config() {
        let result = ConfigBuilder::new()
            .sync_interval(0)
            .logging_level("nope")
            .build_validated();
        let errors = result.unwrap_err();
        assert!(errors.len() >= 2);
    }

    #[test]
    fn default_path_ends_with_config_yaml() {
        let p = Config::default_path();
        assert!(p.ends_with("larder/config.yaml"));
    }
}
