use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read or a value had the wrong type.
    #[error("Failed to load analysis configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Invalid threshold `{field}`: {reason}")]
    InvalidThreshold { field: &'static str, reason: String },
}
