//! # Insights
//!
//! Turns the analyzers' findings into a short, ranked list of templated
//! messages for the insight panel. Nothing here is persisted: every call
//! regenerates the list from the trades it is given.

pub mod detectors;
pub mod error;
pub mod generator;
pub mod insight;

pub use error::InsightsError;
pub use generator::{InsightGenerator, rank};
pub use insight::{Insight, InsightCategory, Severity};
