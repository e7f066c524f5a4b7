//! # Trade Analytics
//!
//! This crate turns a journal of closed trades into numbers: aggregate
//! performance, segment comparisons, habit correlations and recent trends.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` and `configuration` (Layer 0).
//! - **Stateless Calculation:** Every analyzer holds nothing but its thresholds. It takes
//!   trades as input and returns plain values, never `NaN` or infinity. Rerunning it on
//!   the same trades gives the same output.
//! - **Order-sensitive work takes a `Timeline`:** drawdown, streaks and recent windows
//!   only accept the chronologically sorted view.
//!
//! ## Public API
//!
//! - `MetricsAggregator`: win rate, P&L, profit factor, drawdown, Sharpe.
//! - `PatternAnalyzer`: direction, session, instrument, setup and strategy segmentation.
//! - `PsychologyCorrelator`: habit tags against outcomes.
//! - `TrendAnalyzer`: last-N-trades and last-N-days windows, streaks.

// Declare the modules that constitute this crate.
pub mod error;
pub mod math;
pub mod metrics;
pub mod patterns;
pub mod psychology;
pub mod report;
pub mod trend;

// Re-export the key components to create a clean, public-facing API.
pub use error::AnalyticsError;
pub use metrics::MetricsAggregator;
pub use patterns::{DirectionEdge, PatternAnalyzer, SegmentComparison, Session, StrategyVerdict, TimePatterns};
pub use psychology::{HabitCorrelation, HabitStats, PsychologyCorrelator, PsychologyFinding};
pub use report::{PerformanceMetrics, SegmentStats};
pub use trend::{PeriodSummary, RecentWindow, Streak, StreakAlert, StreakKind, TrendAnalyzer, TrendDirection};
