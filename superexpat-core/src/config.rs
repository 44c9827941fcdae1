//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/superexpat/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/superexpat/` (~/.config/superexpat/)
//! - State/Logs: `$XDG_STATE_HOME/superexpat/` (~/.local/state/superexpat/)
//!
//! The backend base URL can be overridden with the `SUPEREXPAT_API_URL`
//! environment variable.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `backend.base_url`.
pub const API_URL_ENV: &str = "SUPEREXPAT_API_URL";

/// Local development backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// SuperExpat backend configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend (e.g., `http://localhost:8000`)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP request timeout in seconds. Unset means requests never time out.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl BackendConfig {
    /// Base URL without trailing slashes.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url();
        if url.is_empty() {
            return Err(Error::Config("backend.base_url must not be empty".to_string()));
        }
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| Error::Config(format!("invalid backend.base_url {url:?}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "backend.base_url must use http or https, got {:?}",
                parsed.scheme()
            )));
        }
        if self.timeout_secs == Some(0) {
            return Err(Error::Config(
                "backend.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Config::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Apply `SUPEREXPAT_API_URL` if it is set and non-empty.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            self.override_base_url(&url);
        }
    }

    /// Replace the backend base URL unless `url` is blank.
    pub fn override_base_url(&mut self, url: &str) {
        let url = url.trim();
        if !url.is_empty() {
            self.backend.base_url = url.to_string();
        }
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/superexpat/config.toml` (~/.config/superexpat/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("superexpat").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/superexpat/` (~/.local/state/superexpat/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("superexpat")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/superexpat/superexpat.log` (~/.local/state/superexpat/superexpat.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("superexpat.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend.base_url(), "http://localhost:8000");
        assert!(config.backend.timeout_secs.is_none());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.max_files, 5);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[backend]
base_url = "https://api.superexpat.example/"
timeout_secs = 45

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.backend.base_url(), "https://api.superexpat.example");
        assert_eq!(config.backend.timeout_secs, Some(45));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.max_files, 5);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[backend]\nbase_url = \"http://10.0.0.2:9000\"").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.backend.base_url(), "http://10.0.0.2:9000");
    }

    #[test]
    fn test_load_from_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[backend\nbase_url = 1").unwrap();

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_override_base_url_ignores_blank() {
        let mut config = Config::default();
        config.override_base_url("   ");
        assert_eq!(config.backend.base_url(), DEFAULT_BASE_URL);

        config.override_base_url("http://backend:8000");
        assert_eq!(config.backend.base_url(), "http://backend:8000");
    }

    #[test]
    fn test_backend_config_validation() {
        assert!(BackendConfig::default().validate().is_ok());

        let config = BackendConfig {
            base_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = BackendConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = BackendConfig {
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
