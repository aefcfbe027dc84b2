//! Configuration management for wordsieve.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::{FilterConfig, FilterMode};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default config/data directory name.
const DATA_DIR_NAME: &str = "wordsieve";

/// Default dictionary file name.
const DICTIONARY_FILE_NAME: &str = "dict.txt";

/// Default cache database file name.
const CACHE_FILE_NAME: &str = "tries.db";

/// Largest accepted gap budget. Each start position may scan up to
/// `max_gap + 1` fillers, so unbounded budgets turn every walk into a scan of
/// the rest of the text.
pub const MAX_GAP_LIMIT: usize = 64;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `WORDSIEVE_`, sections split by `__`)
/// 2. TOML config file at `~/.config/wordsieve/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Matching configuration.
    pub filter: FilterSettings,
    /// Dictionary configuration.
    pub dictionary: DictionaryConfig,
    /// Trie cache configuration.
    pub cache: CacheConfig,
}

/// Matching-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Number of filler units tolerated inside one match.
    pub max_gap: usize,
    /// Unit written over every matched unit.
    pub replacement: char,
    /// What to do with matching text.
    pub mode: FilterMode,
}

/// Dictionary-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryConfig {
    /// Path to the dictionary file, one phrase per line.
    /// Defaults to `~/.config/wordsieve/dict.txt`
    pub path: Option<PathBuf>,
    /// Fail when the dictionary holds no usable phrase.
    pub strict: bool,
}

/// Trie cache configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache built tries between runs.
    pub enabled: bool,
    /// Path to the cache database.
    /// Defaults to `~/.local/share/wordsieve/tries.db`
    pub database_path: Option<PathBuf>,
    /// Lifetime of cached tries in seconds. Set to 0 for no expiry.
    pub expire_secs: u64,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            max_gap: 0,
            replacement: '*',
            mode: FilterMode::Redact,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            database_path: None, // Will be resolved to default at runtime
            expire_secs: 0,
        }
    }
}

impl CacheConfig {
    /// The database path, resolving the default if unset.
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| Config::default_data_dir().join(CACHE_FILE_NAME))
    }

    /// Lifetime of cached entries, `None` when they never expire.
    #[must_use]
    pub fn expiry(&self) -> Option<chrono::Duration> {
        if self.expire_secs == 0 {
            return None;
        }
        i64::try_from(self.expire_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
    }
}

impl From<&FilterSettings> for FilterConfig {
    fn from(settings: &FilterSettings) -> Self {
        Self {
            enabled: true,
            mode: settings.mode,
            max_gap: settings.max_gap,
            replacement: settings.replacement,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("WORDSIEVE_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(CONFIG_FILE_NAME)
    }

    /// Get the default configuration directory.
    #[must_use]
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.filter.max_gap > MAX_GAP_LIMIT {
            return Err(Error::ConfigValidation {
                message: format!(
                    "max_gap ({}) cannot be greater than {MAX_GAP_LIMIT}",
                    self.filter.max_gap
                ),
            });
        }

        if self.filter.replacement.is_control() {
            return Err(Error::ConfigValidation {
                message: format!(
                    "replacement must be a printable character, got {:?}",
                    self.filter.replacement
                ),
            });
        }

        if self.cache.enabled {
            if let Some(path) = &self.cache.database_path {
                if path.as_os_str().is_empty() {
                    return Err(Error::ConfigValidation {
                        message: "cache database_path cannot be empty".to_string(),
                    });
                }
            }
        }

        if self.cache.expire_secs > 0 && self.cache.expiry().is_none() {
            return Err(Error::ConfigValidation {
                message: format!("expire_secs ({}) is out of range", self.cache.expire_secs),
            });
        }

        Ok(())
    }

    /// Get the dictionary path, resolving defaults if not set.
    #[must_use]
    pub fn dictionary_path(&self) -> PathBuf {
        self.dictionary
            .path
            .clone()
            .unwrap_or_else(|| Self::default_config_dir().join(DICTIONARY_FILE_NAME))
    }

    /// Get the cache database path, resolving defaults if not set.
    #[must_use]
    pub fn cache_path(&self) -> PathBuf {
        self.cache.resolved_path()
    }

    /// Runtime filter settings derived from this configuration.
    #[must_use]
    pub fn filter_config(&self) -> FilterConfig {
        FilterConfig::from(&self.filter)
    }
}
