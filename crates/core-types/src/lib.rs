//! # Core Types
//!
//! The shared vocabulary of the insight engine: closed trades as journaled by the
//! trader, playbook strategy summaries, and the `Timeline` view that every
//! order-sensitive calculation consumes.
//!
//! Raw journal exports enter through `TradeRecord` and are validated exactly once
//! by `Trade::try_from` / `parse_records`. Everything downstream works on the
//! strict `Trade` type.

pub mod enums;
pub mod error;
pub mod record;
pub mod structs;
pub mod timeline;

// Re-export the core types to provide a clean public API.
pub use enums::{Direction, Outcome};
pub use error::CoreError;
pub use record::{RejectedRecord, TradeRecord, parse_records};
pub use structs::{PlaybookStrategy, Trade};
pub use timeline::Timeline;
