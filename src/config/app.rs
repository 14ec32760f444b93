//! Main application configuration
//!
//! This module defines the primary configuration structures for poker-elo,
//! including environment variable loading, TOML files and validation.

use crate::config::rating::RatingConfig;
use crate::error::RatingError;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: RatingConfig,
    pub input: InputSettings,
    pub output: OutputSettings,
}

/// Process-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Name used in log output
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Session table source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Session CSV path
    pub path: PathBuf,
    /// Drop rows with fewer than two results instead of failing the run
    pub skip_sparse_rows: bool,
}

/// Export destinations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub csv_path: PathBuf,
    pub json_path: PathBuf,
    pub csv_layout: CsvLayout,
    /// Rating-over-time chart (SVG)
    pub plot_path: PathBuf,
    /// Draw the chart alongside the CSV/JSON exports
    pub plot: bool,
    /// Write exports at all
    pub enabled: bool,
}

/// Shape of the history CSV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsvLayout {
    /// One row per session, one column per player
    #[default]
    Wide,
    /// One row per history entry
    Long,
}

impl fmt::Display for CsvLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvLayout::Wide => write!(f, "wide"),
            CsvLayout::Long => write!(f, "long"),
        }
    }
}

impl FromStr for CsvLayout {
    type Err = RatingError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wide" => Ok(CsvLayout::Wide),
            "long" => Ok(CsvLayout::Long),
            other => Err(RatingError::ConfigurationError {
                message: format!("Unknown CSV layout: {}", other),
            }),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "poker-elo".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("sessions.csv"),
            skip_sparse_rows: false,
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("elo_history.csv"),
            json_path: PathBuf::from("elo_ratings.json"),
            csv_layout: CsvLayout::Wide,
            plot_path: PathBuf::from("elo_history.svg"),
            plot: true,
            enabled: true,
        }
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
{
    value
        .trim()
        .parse()
        .map_err(|_| anyhow!("Invalid {} value: {}", key, value))
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_overrides(&lookup)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_file_with(path, |key| env::var(key).ok())
    }

    /// Load a TOML file, then apply overrides from an arbitrary variable lookup
    pub fn from_file_with<F>(path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.apply_overrides(&lookup)?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, lookup: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Service settings
        if let Some(log_level) = lookup("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Rating settings
        if let Some(value) = lookup("ELO_INITIAL_RATING") {
            self.rating.initial_rating = parse_var("ELO_INITIAL_RATING", &value)?;
        }
        if let Some(value) = lookup("ELO_K_BASE") {
            self.rating.k_base = parse_var("ELO_K_BASE", &value)?;
        }
        if let Some(value) = lookup("ELO_REFERENCE_MAGNITUDE") {
            self.rating.reference_magnitude = parse_var("ELO_REFERENCE_MAGNITUDE", &value)?;
        }
        if let Some(value) = lookup("ELO_MIN_K_SCALE") {
            self.rating.min_k_scale = parse_var("ELO_MIN_K_SCALE", &value)?;
        }
        if let Some(value) = lookup("ELO_MAX_K_SCALE") {
            self.rating.max_k_scale = parse_var("ELO_MAX_K_SCALE", &value)?;
        }
        if let Some(value) = lookup("ELO_K_MODE") {
            self.rating.k_mode = parse_var("ELO_K_MODE", &value)?;
        }

        // Input settings
        if let Some(path) = lookup("ELO_INPUT") {
            self.input.path = PathBuf::from(path);
        }
        if let Some(value) = lookup("ELO_SKIP_SPARSE_ROWS") {
            self.input.skip_sparse_rows = parse_var("ELO_SKIP_SPARSE_ROWS", &value)?;
        }

        // Output settings
        if let Some(path) = lookup("ELO_OUTPUT_CSV") {
            self.output.csv_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("ELO_OUTPUT_JSON") {
            self.output.json_path = PathBuf::from(path);
        }
        if let Some(value) = lookup("ELO_CSV_LAYOUT") {
            self.output.csv_layout = parse_var("ELO_CSV_LAYOUT", &value)?;
        }
        if let Some(path) = lookup("ELO_OUTPUT_PLOT") {
            self.output.plot_path = PathBuf::from(path);
        }
        if let Some(value) = lookup("ELO_PLOT") {
            self.output.plot = parse_var("ELO_PLOT", &value)?;
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    config.rating.validate()?;

    // Validate paths
    if config.input.path.as_os_str().is_empty() {
        return Err(anyhow!("Input path cannot be empty"));
    }
    if config.output.enabled {
        if config.output.csv_path.as_os_str().is_empty() {
            return Err(anyhow!("CSV output path cannot be empty"));
        }
        if config.output.json_path.as_os_str().is_empty() {
            return Err(anyhow!("JSON output path cannot be empty"));
        }
        if config.output.plot && config.output.plot_path.as_os_str().is_empty() {
            return Err(anyhow!("Plot output path cannot be empty"));
        }
    }

    Ok(())
}
