use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Configuration error: {0}")]
    Config(#[from] configuration::error::ConfigError),

    #[error("Analytics error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Risk error: {0}")]
    Risk(#[from] risk::RiskError),
}
