//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation. Most options are optional so that values from
//! `.linewatch.toml` survive unless overridden.

use crate::config::OutputFormat;
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use std::path::PathBuf;

/// Linewatch - live dashboard for automated inspection lines
///
/// Polls a detection endpoint at a fixed interval, tallies product and
/// defect classifications from the latest snapshot, and draws a live bar
/// chart plus an event log.
///
/// Examples:
///   linewatch
///   linewatch --url http://line-3.local:5000/data --interval-ms 500
///   linewatch --file ./latest.json --format json --max-ticks 10
///   linewatch --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Poll endpoint URL
    ///
    /// Default: http://127.0.0.1:5000/data, or the value in .linewatch.toml.
    #[arg(short, long, value_name = "URL", env = "LINEWATCH_URL")]
    pub url: Option<String>,

    /// Read snapshots from a JSON file instead of polling a URL
    ///
    /// The file is re-read on every tick.
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Poll interval in milliseconds
    #[arg(short, long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Stop after this many ticks
    ///
    /// Without it the dashboard runs until interrupted (Ctrl-C).
    #[arg(long, value_name = "COUNT")]
    pub max_ticks: Option<u64>,

    /// Output format (terminal, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Show capture times in UTC instead of local time
    #[arg(long)]
    pub utc: bool,

    /// Maximum log lines shown in the terminal (0 = unlimited)
    #[arg(long, value_name = "LINES")]
    pub max_log_lines: Option<usize>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .linewatch.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .linewatch.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Set when `url` came from LINEWATCH_URL rather than the command line.
    #[arg(skip)]
    pub url_from_env: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        let matches = Self::command().get_matches();
        Self::from_matches(&matches).unwrap_or_else(|e| e.exit())
    }

    fn from_matches(matches: &ArgMatches) -> Result<Self, clap::Error> {
        let mut args = Self::from_arg_matches(matches)?;
        args.url_from_env = matches.value_source("url") == Some(ValueSource::EnvVariable);
        Ok(args)
    }

    /// The endpoint to poll, if one was given.
    ///
    /// An explicit `--file` takes precedence over LINEWATCH_URL.
    pub fn url(&self) -> Option<&str> {
        if self.url_from_env && self.file.is_some() {
            return None;
        }
        self.url.as_deref()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.url().is_some() && self.file.is_some() {
            return Err("Cannot use both --url and --file".to_string());
        }

        if let Some(url) = self.url() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.interval_ms == Some(0) {
            return Err("Interval must be at least 1 ms".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.max_ticks == Some(0) {
            return Err("Max ticks must be at least 1".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
