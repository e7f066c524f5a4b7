//! # Trading Context
//!
//! Assembles every analyzer's output into one `TradingContext` read model:
//! performance, patterns, risk, recent trends and the derived strengths,
//! weaknesses and recommendations. The context is rebuilt from the full
//! journal on every call.

pub mod builder;
pub mod context;
pub mod error;

pub use builder::{FIRST_TRADE_RECOMMENDATION, TradingContextBuilder};
pub use context::{PatternSummary, RecentTrends, TradingContext};
pub use error::ContextError;
