//! Configuration management for Postboard

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com/posts";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Request timeout; absent means requests wait as long as the server does
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// A missing file is not an error: the default configuration is used.
    /// `POSTBOARD_API_URL` overrides the configured base URL.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        let mut config = if config_path.exists() {
            Self::load_from_path(&config_path)?
        } else {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            Self::default_config()
        };

        if let Ok(url) = std::env::var("POSTBOARD_API_URL") {
            config.api.base_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            api: ApiConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout_secs: None,
                user_agent: None,
            },
            logging: LogSettings::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.api.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::MissingField("api.base_url".to_string()).into());
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".to_string(),
                reason: "must start with http:// or https://".to_string(),
            }
            .into());
        }
        if self.api.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "api.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("POSTBOARD_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("postboard").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PostboardError;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout_secs, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_path() {
        let file = write_config(
            r#"
[api]
base_url = "http://localhost:3500/posts"
timeout_secs = 10

[logging]
format = "json"
"#,
        );

        let config = Config::load_from_path(file.path()).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:3500/posts");
        assert_eq!(config.api.timeout_secs, Some(10));
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_logging_section_is_optional() {
        let file = write_config("[api]\nbase_url = \"https://example.com/posts\"\n");
        let config = Config::load_from_path(file.path()).unwrap();
        assert_eq!(config.logging, LogSettings::default());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let file = write_config("[api]\nbase_url = \"ftp://example.com/posts\"\n");
        let err = Config::load_from_path(file.path()).unwrap_err();
        assert!(matches!(
            err,
            PostboardError::Config(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default_config();
        config.api.timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_error() {
        let file = write_config("[api\nbase_url = ");
        let err = Config::load_from_path(file.path()).unwrap_err();
        assert!(matches!(err, PostboardError::Config(ConfigError::ParseError(_))));
    }

    #[test]
    #[serial]
    fn test_load_honours_env_overrides() {
        let file = write_config("[api]\nbase_url = \"https://example.com/posts\"\n");
        std::env::set_var("POSTBOARD_CONFIG", file.path());
        std::env::set_var("POSTBOARD_API_URL", "http://127.0.0.1:9/posts");

        let config = Config::load();

        std::env::remove_var("POSTBOARD_CONFIG");
        std::env::remove_var("POSTBOARD_API_URL");

        assert_eq!(config.unwrap().api.base_url, "http://127.0.0.1:9/posts");
    }

    #[test]
    #[serial]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("POSTBOARD_CONFIG", dir.path().join("absent.toml"));

        let config = Config::load();

        std::env::remove_var("POSTBOARD_CONFIG");

        assert_eq!(config.unwrap(), Config::default_config());
    }
}
