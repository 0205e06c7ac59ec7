//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Income API connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Credential storage settings
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    #[serde(default = "default_remember_days")]
    pub remember_days: i64,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("barbershop").to_string_lossy().to_string())
        .unwrap_or_else(|| "./barbershop_data".to_string())
}

fn default_cookie_name() -> String {
    "token".to_string()
}

fn default_remember_days() -> i64 {
    7
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cookie_name: default_cookie_name(),
            remember_days: default_remember_days(),
        }
    }
}

impl SessionConfig {
    /// Path of the durable cookie jar
    pub fn cookie_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join("cookies.json")
    }

    /// Path of the legacy key/value token store
    pub fn local_storage_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join("local_storage.json")
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("barbershop").join("config.toml")),
            Some(PathBuf::from("./barbershop.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("BARBERSHOP_BASE_URL") {
            self.api.base_url = url;
        }
        if let Some(timeout) = lookup("BARBERSHOP_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => tracing::warn!("Ignoring invalid BARBERSHOP_TIMEOUT_SECS: {}", timeout),
            }
        }

        if let Some(data_dir) = lookup("BARBERSHOP_DATA_DIR") {
            self.session.data_dir = data_dir;
        }

        if let Some(level) = lookup("BARBERSHOP_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("BARBERSHOP_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Barbershop Income Tracker Configuration
#
# Environment variables override these settings:
# - BARBERSHOP_BASE_URL
# - BARBERSHOP_TIMEOUT_SECS
# - BARBERSHOP_DATA_DIR
# - BARBERSHOP_LOG_LEVEL
# - BARBERSHOP_LOG_FORMAT

[api]
# Income API base URL
base_url = "http://localhost:5000"

# Request timeout in seconds
timeout_secs = 10

[session]
# Directory holding the cookie jar and legacy token store
# (default: the platform data directory, e.g. ~/.local/share/barbershop)
# data_dir = "/home/you/.local/share/barbershop"

# Name of the session cookie
cookie_name = "token"

# Lifetime of a "remember me" login (days)
remember_days = 7

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.session.cookie_name, "token");
        assert_eq!(config.session.remember_days, 7);
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse("[api]\nbase_url = \"https://shop.example\"\n").unwrap();
        assert_eq!(config.api.base_url, "https://shop.example");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.session.cookie_name, "token");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("BARBERSHOP_BASE_URL", "http://api.local:9000"),
            ("BARBERSHOP_TIMEOUT_SECS", "not-a-number"),
            ("BARBERSHOP_DATA_DIR", "/tmp/shop"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "http://api.local:9000");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.session.cookie_path(), PathBuf::from("/tmp/shop/cookies.json"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
