//! Configuration management for freshet.
//!
//! Configuration is read from `~/.config/freshet/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.
//! Command-line flags override whatever is loaded here.

pub mod interval;

pub use interval::{format_interval, parse_interval};

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::transport::reqwest_transport::DEFAULT_USER_AGENT;

pub const DEFAULT_WORKERS: usize = 10;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub watch: WatchConfig,
}

/// Settings applied to every request.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout in seconds (default: 10)
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// Extra headers sent with every request
    pub headers: BTreeMap<String, String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: BTreeMap::new(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Settings for `freshet watch`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Poll interval, e.g. "30s", "5m" (default: "30s")
    pub interval: String,

    /// Maximum sources polled at the same time (default: 10)
    pub workers: usize,

    /// Probe with HEAD before downloading (default: true)
    pub probe_with_head: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval: "30s".to_string(),
            workers: DEFAULT_WORKERS,
            probe_with_head: true,
        }
    }
}

impl WatchConfig {
    pub fn interval(&self) -> Result<Duration, ConfigError> {
        parse_interval(&self.interval)
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.watch.interval()?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/freshet/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("freshet").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# freshet configuration
#
# Intervals can be written as "500ms", "30s", "5m", "1h", "1d",
# or a bare number of seconds.

[fetch]
# Per-request timeout in seconds
timeout_secs = 10

# Extra headers sent with every request
# [fetch.headers]
# Authorization = "Bearer <token>"

[watch]
# How often each source is polled
interval = "30s"

# Maximum number of sources polled at the same time
workers = 10

# Ask the server with a HEAD request before downloading.
# Servers that reject HEAD are detected and skipped automatically.
probe_with_head = true
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid interval: {0}. Use a format like '30s', '5m', '1h'")]
    InvalidInterval(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.fetch.timeout(), Duration::from_secs(10));
        assert_eq!(config.watch.interval().unwrap(), Duration::from_secs(30));
        assert_eq!(config.watch.workers, DEFAULT_WORKERS);
        assert!(config.watch.probe_with_head);
        assert!(config.fetch.headers.is_empty());
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[fetch]
timeout_secs = 3

[fetch.headers]
Authorization = "Bearer abc"
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.fetch.timeout_secs, 3);
        assert_eq!(
            config.fetch.headers.get("Authorization").map(String::as_str),
            Some("Bearer abc")
        );
        // Defaults for everything else
        assert_eq!(config.fetch.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.watch.interval, "30s");
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.fetch.timeout_secs, 10);
        assert!(config.watch.probe_with_head);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[watch]\ninterval = \"5m\"\nprobe_with_head = false\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.watch.interval().unwrap(), Duration::from_secs(300));
        assert!(!config.watch.probe_with_head);
    }

    #[test]
    fn test_load_from_rejects_bad_interval() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[watch]\ninterval = \"often\"\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidInterval(_))
        ));
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[fetch\ntimeout_secs = ").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_create_default_config_writes_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        Config::create_default_config(&path).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.watch.workers, DEFAULT_WORKERS);
    }
}
