//! Service configuration file support.
//!
//! This module reads the service configuration from a TOML file. Every
//! setting has a default, so an empty file (or no file at all) yields the
//! production configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::WeekId;

/// Placeholder substituted with the week number in the source URL template.
pub const WEEK_PLACEHOLDER: &str = "{week}";

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Full service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

/// Where and how often weekly documents are fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    #[serde(default = "default_url_template")]
    pub url_template: String,
    #[serde(default = "default_first_week")]
    pub first_week: u32,
    #[serde(default = "default_last_week")]
    pub last_week: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_fetch_delay_ms")]
    pub fetch_delay_ms: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_url_template() -> String {
    "http://polytech-shedule.ru/{week}.xml".to_string()
}

fn default_first_week() -> u32 {
    1
}

fn default_last_week() -> u32 {
    20
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_fetch_delay_ms() -> u64 {
    100
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_allowed_origins() -> Vec<String> {
    [
        "http://localhost",
        "http://localhost:8080",
        "http://localhost:5173",
        "https://polytech-schedule.ru",
        "http://polytech-schedule.ru",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            url_template: default_url_template(),
            first_week: default_first_week(),
            last_week: default_last_week(),
            request_timeout_secs: default_request_timeout_secs(),
            fetch_delay_ms: default_fetch_delay_ms(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl SourceSettings {
    pub fn week_range(&self) -> RangeInclusive<u32> {
        self.first_week..=self.last_week
    }

    pub fn weeks(&self) -> impl Iterator<Item = WeekId> {
        self.week_range().map(WeekId::new)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(AppConfig)` if the file was read, parsed and validated
    /// * `Err(ConfigError)` otherwise
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `timetable.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    ///
    /// # Returns
    /// * `Ok(Some(AppConfig))` if a file was found and loaded
    /// * `Ok(None)` if no file exists in any of the locations
    pub fn from_default_location() -> Result<Option<Self>, ConfigError> {
        let search_paths = [
            PathBuf::from("timetable.toml"),
            PathBuf::from("backend/timetable.toml"),
            PathBuf::from("../timetable.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path).map(Some);
            }
        }
        Ok(None)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let source = &self.source;
        if source.first_week == 0 || source.first_week > source.last_week {
            return Err(ConfigError::Invalid(format!(
                "week range {}..={} is empty or starts at 0",
                source.first_week, source.last_week
            )));
        }
        if !source.url_template.contains(WEEK_PLACEHOLDER) {
            return Err(ConfigError::Invalid(format!(
                "source.url_template must contain '{}'",
                WEEK_PLACEHOLDER
            )));
        }
        if source.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "source.request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
