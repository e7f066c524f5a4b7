use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use configuration::{AnalysisConfig, LoggingSettings};
use context::TradingContextBuilder;
use core_types::{PlaybookStrategy, Trade, TradeRecord, parse_records};
use insights::InsightGenerator;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod render;

/// The main entry point for the trade-insights command-line tool.
fn main() -> Result<()> {
    // A .env file is optional; it only carries INSIGHTS_* overrides.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = configuration::load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let _guard = init_tracing(&config.logging, cli.log_level.as_deref())?;
    log_config(&config, cli.config.as_deref());

    // Execute the appropriate command
    match cli.command {
        Commands::Context(args) => handle_context(args, &config),
        Commands::Insights(args) => handle_insights(args, &config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Performance analytics and insights for a trading journal.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults to ./insights.toml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level filter (e.g. "info", "debug"). RUST_LOG takes precedence.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full trading context: metrics, patterns, risk and recommendations.
    Context(ReportArgs),
    /// Generate the ranked insight list for recent trades.
    Insights(ReportArgs),
}

#[derive(Args)]
struct ReportArgs {
    /// JSON file holding an array of trade records.
    #[arg(long)]
    trades: PathBuf,

    /// JSON file holding an array of playbook strategies.
    #[arg(long)]
    strategies: Option<PathBuf>,

    /// The instant to analyze as of (RFC 3339). Defaults to now.
    #[arg(long)]
    as_of: Option<DateTime<Utc>>,

    /// Print JSON instead of tables.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_context(args: ReportArgs, config: &AnalysisConfig) -> Result<()> {
    let trades = load_trades(&args.trades)?;
    let strategies = load_strategies(args.strategies.as_deref())?;
    let as_of = args.as_of.unwrap_or_else(Utc::now);

    let builder = TradingContextBuilder::new(config)?;
    let ctx = builder.build(&trades, &strategies, as_of);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ctx)?);
    } else {
        render::print_context(&ctx);
    }
    Ok(())
}

fn handle_insights(args: ReportArgs, config: &AnalysisConfig) -> Result<()> {
    let trades = load_trades(&args.trades)?;
    let strategies = load_strategies(args.strategies.as_deref())?;
    let now = args.as_of.unwrap_or_else(Utc::now);

    let generator = InsightGenerator::new(config)?;
    let insights = generator.generate(&trades, &strategies, now);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
    } else if insights.is_empty() {
        println!("No insights yet. Keep logging trades.");
    } else {
        println!("{}", render::insights_table(&insights));
    }
    Ok(())
}

// ==============================================================================
// Input & Logging
// ==============================================================================

/// Reads trade records and keeps the valid ones. Invalid records are logged and skipped.
fn load_trades(path: &Path) -> Result<Vec<Trade>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let records: Vec<TradeRecord> =
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse trade records in {}", path.display()))?;

    let (trades, rejected) = parse_records(records);
    for r in &rejected {
        tracing::warn!(index = r.index, id = %r.id, error = %r.error, "Skipping invalid trade record.");
    }
    tracing::info!(loaded = trades.len(), rejected = rejected.len(), "Loaded trades.");
    Ok(trades)
}

fn load_strategies(path: Option<&Path>) -> Result<Vec<PlaybookStrategy>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse playbook strategies in {}", path.display()))
}

/// The subscriber is built from the loaded settings, so the configuration can
/// only be logged once it is installed.
fn log_config(config: &AnalysisConfig, path: Option<&Path>) {
    let file = path.map_or_else(|| configuration::DEFAULT_CONFIG_FILE.to_string(), |p| p.display().to_string());
    tracing::debug!(%file, ?config, "Loaded analysis configuration.");
}

/// Logs go to stderr, and also to a daily rolling file when a log directory is
/// configured. The returned guard must live until the program exits.
fn init_tracing(settings: &LoggingSettings, cli_level: Option<&str>) -> Result<Option<WorkerGuard>> {
    let level = cli_level.unwrap_or(&settings.level);
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).with_context(|| format!("Invalid log level '{level}'"))?,
    };

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    match &settings.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "trade-insights.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry.with(fmt::layer().with_ansi(false).with_writer(writer)).try_init()?;
            Ok(Some(guard))
        }
        None => {
            registry.try_init()?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_loaded_config_is_logged_at_debug() {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = fmt::Subscriber::builder()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            log_config(&AnalysisConfig::default(), Some(Path::new("custom.toml")))
        });

        let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Loaded analysis configuration."));
        assert!(output.contains("custom.toml"));
    }
}
