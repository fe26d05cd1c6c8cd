//! Linewatch - live dashboard for automated inspection lines
//!
//! Polls a detection endpoint at a fixed interval, tallies classifications
//! from the latest snapshot and renders a bar chart plus an event log.
//!
//! Exit codes:
//!   0 - Dashboard stopped normally (tick limit or Ctrl-C)
//!   1 - Startup error (arguments, configuration, HTTP client)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod poller;
mod render;
mod source;

use analysis::Aggregator;
use anyhow::{Context, Result};
use cli::Args;
use config::{Config, OutputFormat, DEFAULT_CONFIG_FILE};
use poller::{PollConfig, PollLoop, PollSummary};
use indicatif::{MultiProgress, ProgressDrawTarget};
use render::{Dashboard, JsonRenderer, LogWriter, Renderer, TerminalRenderer, TimeFormat};
use source::{DataSource, FileSource, HttpSource};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config is loaded before logging so [general] verbose can apply
    let (mut config, config_origin) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Live bars and log lines share stderr, so both go through one MultiProgress
    let bars = match config.display.format {
        OutputFormat::Terminal => Some(MultiProgress::with_draw_target(ProgressDrawTarget::stderr())),
        OutputFormat::Json => None,
    };

    init_logging(&args, &config, bars.clone())?;

    info!("Linewatch v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {}", config_origin);
    debug!("Arguments: {:?}", args);

    let started = Instant::now();
    match run_dashboard(&args, &config, bars).await {
        Ok(summary) => {
            print_summary(&summary, started.elapsed());
            Ok(())
        }
        Err(e) => {
            error!("Dashboard failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .linewatch.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", DEFAULT_CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to set the endpoint, poll interval and categories.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG` takes precedence over the flags when set. With live bars,
/// lines are written through them instead of straight to stderr.
fn init_logging(args: &Args, config: &Config, bars: Option<MultiProgress>) -> Result<()> {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let writer = match bars {
        Some(multi) => BoxMakeWriter::new(LogWriter::new(multi)),
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Load configuration from file or use defaults.
///
/// Returns the configuration and a description of where it came from.
fn load_config(args: &Args) -> Result<(Config, String)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, config_path.display().to_string()));
    }

    // Try default location
    match Config::load_default()? {
        Some(config) => Ok((config, DEFAULT_CONFIG_FILE.to_string())),
        None => Ok((Config::default(), "built-in defaults".to_string())),
    }
}

/// Build the source, renderer and loop, then poll until stopped.
async fn run_dashboard(
    args: &Args,
    config: &Config,
    bars: Option<MultiProgress>,
) -> Result<PollSummary> {
    let categories = config.validate().context("Invalid configuration")?;

    for (index, slot) in categories.slots().iter().enumerate() {
        debug!("Slot {}: {} ({})", index, slot.name, slot.kind);
    }

    let source: Arc<dyn DataSource> = match config.source.file {
        Some(ref path) => Arc::new(FileSource::new(path.clone())),
        None => Arc::new(HttpSource::new(
            config.source.url.clone(),
            Duration::from_secs(config.source.timeout_seconds),
        )?),
    };

    let renderer: Box<dyn Renderer> = match bars {
        Some(multi) => Box::new(TerminalRenderer::new(
            &categories,
            config.display.max_log_lines,
            multi,
        )?),
        None => Box::new(JsonRenderer::new(&categories, std::io::stdout())),
    };

    let dashboard = Arc::new(Mutex::new(Dashboard::new(categories.len(), renderer)));
    let display = dashboard.clone();

    let poll_config = PollConfig {
        interval: Duration::from_millis(config.source.interval_ms),
        max_ticks: args.max_ticks,
        time_format: TimeFormat::from_utc_flag(config.display.utc),
    };

    let poll_loop = PollLoop::new(
        poll_config,
        source,
        Aggregator::new(categories),
        dashboard,
    );

    let summary = poll_loop.run(shutdown_signal()).await;

    if let Ok(dashboard) = display.lock() {
        let state = dashboard.state();
        debug!(
            "Last frame #{}: {:?} ({})",
            state.sequence, state.series, state.timestamp_label
        );
    }

    Ok(summary)
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Print the tick counters. Goes to stderr so JSON output stays clean.
fn print_summary(summary: &PollSummary, elapsed: Duration) {
    eprintln!("\n📊 Poll Summary:");
    eprintln!("   Ticks: {}", summary.ticks);
    eprintln!("   - ✅ Applied: {} | 💤 No data: {} | ⏭️  Stale: {}", summary.applied, summary.empty, summary.stale);
    eprintln!(
        "   - ❌ Transport failures: {} | 🧩 Malformed: {}",
        summary.transport_failures, summary.malformed
    );
    if summary.unfinished() > 0 {
        eprintln!("   - Unfinished at shutdown: {}", summary.unfinished());
    }
    eprintln!("   Duration: {:.1}s", elapsed.as_secs_f64());
}
