use crate::error::ConfigError;
use config::{Environment, File};
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    AnalysisConfig, ContextThresholds, InsightSettings, LoggingSettings, PatternThresholds, PsychologyThresholds,
    RiskSettings, TrendThresholds,
};

/// The config file looked up when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "insights.toml";

/// Loads the analysis configuration.
///
/// Sources are layered in order, later ones winning:
/// 1. Built-in defaults (every field has one).
/// 2. The TOML file at `path`, or `insights.toml` if it exists.
/// 3. Environment variables, e.g. `INSIGHTS_PATTERNS__MIN_DIRECTION_TRADES=8`.
pub fn load_config(path: Option<&Path>) -> Result<AnalysisConfig, ConfigError> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix("INSIGHTS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config = builder.try_deserialize::<AnalysisConfig>()?;
    config.validate()?;

    tracing::debug!(?config, "Loaded analysis configuration.");
    Ok(config)
}
