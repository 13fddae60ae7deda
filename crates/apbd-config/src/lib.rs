//! Configuration management for the APBD budget tools
//!
//! This module handles loading, validation, and management of
//! configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Input data configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the exported JSON payload
    #[serde(default = "default_input")]
    pub input: PathBuf,
    /// Budget kind used when none is given on the command line
    #[serde(default = "default_kind")]
    pub default_kind: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            default_kind: default_kind(),
        }
    }
}

fn default_input() -> PathBuf {
    PathBuf::from("./data/apbd.json")
}

fn default_kind() -> String {
    "Pendapatan".to_string()
}

/// Hierarchy aggregation settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AggregationConfig {
    /// Ordering applied to siblings at every level
    #[serde(default)]
    pub sibling_order: SiblingOrder,
}

/// Sibling ordering enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiblingOrder {
    /// Category name, case and accent insensitive
    Name,
    /// Category code ("4.1.1"), segments compared numerically
    Code,
    /// Numeric category id
    Id,
}

impl Default for SiblingOrder {
    fn default() -> Self {
        SiblingOrder::Name
    }
}

impl std::str::FromStr for SiblingOrder {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" | "nama" => Ok(SiblingOrder::Name),
            "code" | "kode" => Ok(SiblingOrder::Code),
            "id" => Ok(SiblingOrder::Id),
            _ => Err(format!("Invalid sibling order: {}", s)),
        }
    }
}

impl std::fmt::Display for SiblingOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SiblingOrder::Name => write!(f, "name"),
            SiblingOrder::Code => write!(f, "code"),
            SiblingOrder::Id => write!(f, "id"),
        }
    }
}

/// Chart adapter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Number of top items kept in composition and comparison charts
    #[serde(default = "default_top_items")]
    pub top_items_count: usize,
    /// Shares below this fraction of the total are folded together
    #[serde(default = "default_small_share_threshold")]
    pub small_share_threshold: f64,
    /// Label of the folded entry
    #[serde(default = "default_other_label")]
    pub other_label: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            top_items_count: default_top_items(),
            small_share_threshold: default_small_share_threshold(),
            other_label: default_other_label(),
        }
    }
}

fn default_top_items() -> usize {
    8
}

fn default_small_share_threshold() -> f64 {
    0.03
}

fn default_other_label() -> String {
    "Lain-lain".to_string()
}

/// Currency and number formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Currency symbol
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Number of decimal places
    #[serde(default)]
    pub decimal_places: u32,
    /// Thousands separator
    #[serde(default = "default_thousands_sep")]
    pub thousands_separator: String,
    /// Decimal separator
    #[serde(default = "default_decimal_sep")]
    pub decimal_separator: String,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            decimal_places: 0,
            thousands_separator: default_thousands_sep(),
            decimal_separator: default_decimal_sep(),
        }
    }
}

fn default_symbol() -> String {
    "Rp".to_string()
}

fn default_thousands_sep() -> String {
    ".".to_string()
}

fn default_decimal_sep() -> String {
    ",".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Input data settings
    #[serde(default)]
    pub data: DataConfig,
    /// Aggregation settings
    #[serde(default)]
    pub aggregation: AggregationConfig,
    /// Chart settings
    #[serde(default)]
    pub charts: ChartConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::IoError)?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|_| ConfigError::InvalidYaml)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        const KINDS: [&str; 4] = ["pendapatan", "belanja", "pembelanjaan", "pembiayaan"];
        if !KINDS.contains(&self.data.default_kind.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "data.default_kind".to_string(),
                reason: "Must be one of Pendapatan, Belanja, Pembelanjaan, Pembiayaan".to_string(),
            });
        }

        if self.charts.top_items_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "charts.top_items_count".to_string(),
                reason: "Top items count must be greater than 0".to_string(),
            });
        }

        let threshold = self.charts.small_share_threshold;
        if !(0.0..1.0).contains(&threshold) {
            return Err(ConfigError::InvalidValue {
                field: "charts.small_share_threshold".to_string(),
                reason: "Threshold must be between 0 (inclusive) and 1 (exclusive)".to_string(),
            });
        }

        if self.currency.decimal_places > 10 {
            return Err(ConfigError::InvalidValue {
                field: "currency.decimal_places".to_string(),
                reason: "Decimal places must be between 0 and 10".to_string(),
            });
        }

        if self.currency.thousands_separator == self.currency.decimal_separator {
            return Err(ConfigError::ValidationError {
                message: "Thousands and decimal separators must differ".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }
}
