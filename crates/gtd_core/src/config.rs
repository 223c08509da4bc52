//! Client configuration.
//!
//! # Responsibility
//! - Describe every tunable of the client with a working default.
//! - Load an optional TOML file and apply environment overrides on top.
//!
//! # Invariants
//! - `AppConfig::default()` is always a runnable configuration.
//! - Environment overrides win over file values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_API_BASE_URL: &str = "GTD_API_BASE_URL";
pub const ENV_STORAGE_PATH: &str = "GTD_STORAGE_PATH";
pub const ENV_LOG_LEVEL: &str = "GTD_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "GTD_LOG_DIR";

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_STORAGE_PREFIX: &str = "gtd_todo_";
const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;
const DEFAULT_MAX_AGE_SECS: u64 = 24 * 60 * 60;

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file `{path}`: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Complete client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub ui: UiConfig,
}

/// REST backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Absent means no client-side timeout.
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Local key/value persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file; absent keeps everything in memory.
    pub path: Option<PathBuf>,
    pub prefix: String,
    pub quota_bytes: u64,
    pub max_age_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            quota_bytes: DEFAULT_QUOTA_BYTES,
            max_age_secs: DEFAULT_MAX_AGE_SECS,
        }
    }
}

impl StorageConfig {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub dir: Option<PathBuf>,
}

/// Feedback timings and navigation limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub toast_ms: u64,
    pub error_toast_ms: u64,
    pub warning_toast_ms: u64,
    pub draft_debounce_ms: u64,
    pub max_redirects: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            toast_ms: 3_000,
            error_toast_ms: 5_000,
            warning_toast_ms: 4_000,
            draft_debounce_ms: 2_000,
            max_redirects: 3,
        }
    }
}

impl AppConfig {
    /// Loads configuration from an optional TOML file plus environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Applies overrides from a variable lookup (normally `std::env::var`).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(base_url) = non_empty(ENV_API_BASE_URL) {
            self.api.base_url = base_url.trim().to_string();
        }
        if let Some(path) = non_empty(ENV_STORAGE_PATH) {
            self.storage.path = Some(PathBuf::from(path.trim()));
        }
        if let Some(level) = non_empty(ENV_LOG_LEVEL) {
            self.logging.level = Some(level.trim().to_string());
        }
        if let Some(dir) = non_empty(ENV_LOG_DIR) {
            self.logging.dir = Some(PathBuf::from(dir.trim()));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url cannot be empty".into()));
        }
        if self.storage.prefix.is_empty() {
            return Err(ConfigError::Invalid("storage.prefix cannot be empty".into()));
        }
        if self.ui.max_redirects == 0 {
            return Err(ConfigError::Invalid(
                "ui.max_redirects must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
