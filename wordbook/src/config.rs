//! Configuration for the wordbook shell.
//!
//! Looked up in `./wordbook.toml`, then `<config dir>/wordbook/config.toml`.
//! Every section is optional and missing values take their defaults.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use dictionary::DEFAULT_QUOTES;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "wordbook.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub words: WordsConfig,
    pub daily: DailyConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file holding saved words, the daily selection and preferences
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WordsConfig {
    /// JSON word list used instead of the bundled one
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DailyConfig {
    /// Quotes used instead of the built-in ones
    pub quotes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DisplayConfig {
    /// Appearance assumed when dark mode follows the system
    pub system_dark: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of off, error, warn, info, debug, trace
    pub level: String,
    /// Append log lines to this file instead of stderr
    pub file: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let path = dirs::data_dir()
            .map(|dir| dir.join("wordbook").join("wordbook.db"))
            .unwrap_or_else(|| PathBuf::from("wordbook.db"));
        Self { path }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.level)
            .map_err(|_| anyhow::anyhow!("Invalid logging level '{}'", self.level))
    }
}

impl DailyConfig {
    pub fn quotes(&self) -> Vec<String> {
        match &self.quotes {
            Some(quotes) => quotes.clone(),
            None => DEFAULT_QUOTES.iter().map(|quote| quote.to_string()).collect(),
        }
    }
}

impl Config {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        match Self::find_config_file() {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    fn find_config_file() -> Option<PathBuf> {
        let current_dir_config = PathBuf::from(CONFIG_FILE_NAME);
        if current_dir_config.exists() {
            return Some(current_dir_config);
        }

        dirs::config_dir()
            .map(|dir| dir.join("wordbook").join("config.toml"))
            .filter(|path| path.exists())
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.path.as_os_str().is_empty() {
            anyhow::bail!("storage.path cannot be empty");
        }

        if let Some(quotes) = &self.daily.quotes {
            if quotes.iter().all(|quote| quote.trim().is_empty()) {
                anyhow::bail!("daily.quotes must contain at least one quote");
            }
        }

        self.logging.level_filter()?;
        Ok(())
    }
}
