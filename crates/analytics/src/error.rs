use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Analysis window '{0}' is out of range: {1}")]
    InvalidWindow(String, String),
}
