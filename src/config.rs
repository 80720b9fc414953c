//! Configuration management.
//!
//! Loads the ticker allow-set, classifier defaults and dataset location from
//! a TOML file. Configuration is read once at start-up and never mutated
//! afterwards.

use crate::error::{Nl2SqlError, Result};
use crate::intent::{default_tickers, Ticker, TickerSet, DEFAULT_WINDOW};
use crate::template::DEFAULT_MAX_WINDOW;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Classifier and binder settings.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// The ticker allow-set.
    #[serde(default = "default_tickers")]
    pub tickers: Vec<Ticker>,

    /// Dataset location and execution limits.
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            tickers: default_tickers(),
            database: DatabaseConfig::default(),
        }
    }
}

/// Classifier and binder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Window used when a moving-average question names none.
    #[serde(default = "default_window")]
    pub default_window: u32,

    /// Largest window the binder accepts.
    #[serde(default = "default_max_window")]
    pub max_window: u32,

    /// Ticker assumed for single-ticker questions that name none. When
    /// unset, such questions fail with a missing-parameter error.
    #[serde(default)]
    pub default_ticker: Option<String>,
}

fn default_window() -> u32 {
    DEFAULT_WINDOW
}

fn default_max_window() -> u32 {
    DEFAULT_MAX_WINDOW
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            default_window: default_window(),
            max_window: default_max_window(),
            default_ticker: None,
        }
    }
}

/// Dataset location and execution limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path of the SQLite file holding `stock_prices`.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    /// Maximum rows returned from a query.
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,

    /// Per-query timeout in seconds.
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("data/stock_database.db")
}

fn default_max_rows() -> usize {
    DatabaseConfig::DEFAULT_MAX_ROWS
}

fn default_query_timeout_secs() -> u64 {
    DatabaseConfig::DEFAULT_QUERY_TIMEOUT_SECS
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_rows: default_max_rows(),
            query_timeout_secs: default_query_timeout_secs(),
        }
    }
}

impl DatabaseConfig {
    pub const DEFAULT_MAX_ROWS: usize = 1000;
    pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stock-nl2sql")
            .join("config.toml")
    }

    /// Loads and validates configuration from a TOML file. A missing file
    /// yields the defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Nl2SqlError::config(format!("Failed to read config file: {e}")))?;

        let config = Self::parse_toml(&content, path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            Nl2SqlError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let classifier = &self.classifier;
        if classifier.max_window == 0 {
            return Err(Nl2SqlError::config("classifier.max_window must be positive"));
        }
        if classifier.default_window == 0 || classifier.default_window > classifier.max_window {
            return Err(Nl2SqlError::config(format!(
                "classifier.default_window must be between 1 and {}",
                classifier.max_window
            )));
        }
        if self.database.max_rows == 0 {
            return Err(Nl2SqlError::config("database.max_rows must be positive"));
        }

        let tickers = self.ticker_set()?;
        if tickers.is_empty() {
            return Err(Nl2SqlError::config("at least one ticker must be configured"));
        }
        if let Some(default) = &classifier.default_ticker {
            if tickers.symbol(default).is_none() {
                return Err(Nl2SqlError::config(format!(
                    "classifier.default_ticker '{default}' is not a configured ticker"
                )));
            }
        }

        Ok(())
    }

    /// Builds the ticker allow-set.
    pub fn ticker_set(&self) -> Result<TickerSet> {
        TickerSet::new(self.tickers.clone())
    }
}
