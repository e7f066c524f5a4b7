//! # Risk Metrics
//!
//! Measures how a trader manages risk across a journal: stop-loss discipline,
//! realized reward per unit of risk, loss streaks, a composite 0-100 risk score
//! and a half-Kelly position-size recommendation.

pub mod calculator;
pub mod error;

// Re-export public types
pub use calculator::{KellyCriterion, RiskCalculator, RiskMetrics};
pub use error::RiskError;
