//! Configuration management for beanform
//!
//! This module handles loading, validation, and management of
//! beanform configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to ledger directory
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    /// Target file for submitted entries (relative to data path)
    #[serde(default = "default_ledger_file")]
    pub ledger_file: String,
    /// Reference data file with known accounts and payees
    #[serde(default = "default_reference_file")]
    pub reference_file: String,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./data")
}

fn default_ledger_file() -> String {
    "transactions.bean".to_string()
}

fn default_reference_file() -> String {
    "reference.yaml".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            ledger_file: default_ledger_file(),
            reference_file: default_reference_file(),
        }
    }
}

impl DataConfig {
    /// Full path to the entry append target
    pub fn ledger_path(&self) -> PathBuf {
        self.path.join(&self.ledger_file)
    }

    /// Full path to the reference data file
    pub fn reference_path(&self) -> PathBuf {
        self.path.join(&self.reference_file)
    }
}

/// Form behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfig {
    /// Minimum number of posting rows the UI keeps around
    #[serde(default = "default_min_postings")]
    pub min_postings: usize,
    /// Date rendering style for the entry header
    #[serde(default)]
    pub date_style: DateStyle,
    /// Payload shape handed to the mutation sink on submit
    #[serde(default)]
    pub payload: PayloadKind,
    /// Currency suggested for new amounts
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            min_postings: default_min_postings(),
            date_style: DateStyle::default(),
            payload: PayloadKind::default(),
            default_currency: default_currency(),
        }
    }
}

fn default_min_postings() -> usize {
    2
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Date rendering style enumeration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateStyle {
    /// Date-only header (yyyy-MM-dd)
    Date,
    /// Date and time header
    DateTime,
}

impl Default for DateStyle {
    fn default() -> Self {
        DateStyle::Date
    }
}

impl std::str::FromStr for DateStyle {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "date" => Ok(DateStyle::Date),
            "datetime" => Ok(DateStyle::DateTime),
            _ => Err(format!("Invalid date style: {}", s)),
        }
    }
}

impl std::fmt::Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Date => write!(f, "date"),
            DateStyle::DateTime => write!(f, "datetime"),
        }
    }
}

/// Submit payload shape enumeration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    /// Raw entry text plus a timestamp
    Text,
    /// Structured transaction object
    Structured,
}

impl Default for PayloadKind {
    fn default() -> Self {
        PayloadKind::Text
    }
}

impl std::str::FromStr for PayloadKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(PayloadKind::Text),
            "structured" => Ok(PayloadKind::Structured),
            _ => Err(format!("Invalid payload kind: {}", s)),
        }
    }
}

impl std::fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadKind::Text => write!(f, "text"),
            PayloadKind::Structured => write!(f, "structured"),
        }
    }
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
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Data directory settings
    #[serde(default)]
    pub data: DataConfig,
    /// Form behavior settings
    #[serde(default)]
    pub form: FormConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.to_string_lossy().into_owned(),
                }
            } else {
                ConfigError::IoError
            }
        })?;

        let config: Config =
            serde_yaml::from_str(&content).map_err(|_| ConfigError::InvalidYaml)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.form.min_postings < 1 {
            return Err(ConfigError::InvalidValue {
                field: "form.min_postings".to_string(),
                reason: "Minimum posting count must be at least 1".to_string(),
            });
        }

        if self.data.ledger_file.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "data.ledger_file".to_string(),
                reason: "Ledger file name must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

// ==================== Tests ====================
