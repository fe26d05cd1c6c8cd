//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.linewatch.toml` files.

use crate::analysis::CategoryMap;
use crate::error::ConfigError;
use crate::models::CategoryKind;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".linewatch.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Data source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Display settings.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Tallied categories, one chart bar each.
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            source: SourceConfig::default(),
            display: DisplayConfig::default(),
            categories: default_categories(),
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Where snapshots come from and how often.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Poll endpoint URL.
    #[serde(default = "default_url")]
    pub url: String,

    /// Read snapshots from this file instead of the endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Poll period in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            file: None,
            interval_ms: default_interval_ms(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_url() -> String {
    "http://127.0.0.1:5000/data".to_string()
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_timeout() -> u64 {
    10
}

/// Output format for rendered frames.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Live bar chart in the terminal (default)
    #[default]
    Terminal,
    /// One JSON object per frame on stdout
    Json,
}

/// Display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Render target.
    #[serde(default)]
    pub format: OutputFormat,

    /// Show capture times in UTC instead of local time.
    #[serde(default)]
    pub utc: bool,

    /// Maximum log lines shown in the terminal (0 = unlimited).
    #[serde(default = "default_max_log_lines")]
    pub max_log_lines: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            utc: false,
            max_log_lines: default_max_log_lines(),
        }
    }
}

fn default_max_log_lines() -> usize {
    20
}

/// One tallied category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Name shown next to the bar.
    pub name: String,
    /// Detection labels counted in this category (exact match).
    pub labels: Vec<String>,
    /// Normal or defect.
    #[serde(default = "default_kind")]
    pub kind: CategoryKind,
}

fn default_kind() -> CategoryKind {
    CategoryKind::Normal
}

/// The reference line: one product class, one defect class.
pub fn default_categories() -> Vec<CategoryConfig> {
    vec![
        CategoryConfig {
            name: "Product A".to_string(),
            labels: vec!["product_A".to_string()],
            kind: CategoryKind::Normal,
        },
        CategoryConfig {
            name: "Defect B".to_string(),
            labels: vec!["defect_B".to_string()],
            kind: CategoryKind::Defect,
        },
    ]
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.linewatch.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values given explicitly on the command line override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(url) = args.url() {
            self.source.url = url.to_string();
            self.source.file = None;
        }
        if let Some(ref file) = args.file {
            self.source.file = Some(file.clone());
        }
        if let Some(interval) = args.interval_ms {
            self.source.interval_ms = interval;
        }
        if let Some(timeout) = args.timeout {
            self.source.timeout_seconds = timeout;
        }

        if let Some(format) = args.format {
            self.display.format = format;
        }
        if let Some(lines) = args.max_log_lines {
            self.display.max_log_lines = lines;
        }

        // Flags always override
        if args.utc {
            self.display.utc = true;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Check the merged configuration and build the category map.
    pub fn validate(&self) -> Result<CategoryMap, ConfigError> {
        if self.source.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.source.timeout_seconds == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.source.file.is_none()
            && !self.source.url.starts_with("http://")
            && !self.source.url.starts_with("https://")
        {
            return Err(ConfigError::InvalidUrl(self.source.url.clone()));
        }

        CategoryMap::new(&self.categories)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
