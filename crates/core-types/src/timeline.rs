use crate::structs::Trade;
use chrono::{DateTime, TimeDelta, Utc};

/// A chronologically ordered, borrowed view over a set of trades.
///
/// Drawdown, loss streaks and recent-window trends all depend on trade order,
/// and callers hand trades over in arbitrary order. Those calculations accept a
/// `Timeline` instead of a slice, so the sort cannot be skipped.
///
/// The sort is stable; undated trades come first and are treated as the oldest.
#[derive(Debug, Clone)]
pub struct Timeline<'a> {
    trades: Vec<&'a Trade>,
}

impl<'a> Timeline<'a> {
    pub fn new(trades: &'a [Trade]) -> Self {
        Self::from_refs(trades.iter().collect())
    }

    pub fn from_refs(mut trades: Vec<&'a Trade>) -> Self {
        trades.sort_by_key(|t| t.executed_at);
        Self { trades }
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &'a Trade> + ExactSizeIterator + '_ {
        self.trades.iter().copied()
    }

    /// Newest to oldest.
    pub fn iter_recent_first(&self) -> impl Iterator<Item = &'a Trade> + '_ {
        self.trades.iter().rev().copied()
    }

    /// The `n` most recent trades, still in chronological order.
    pub fn last_n(&self, n: usize) -> Timeline<'a> {
        let start = self.trades.len().saturating_sub(n);
        Timeline {
            trades: self.trades[start..].to_vec(),
        }
    }

    /// Trades executed at or after `cutoff`. Undated trades are kept.
    pub fn since(&self, cutoff: DateTime<Utc>) -> Timeline<'a> {
        Timeline {
            trades: self
                .trades
                .iter()
                .copied()
                .filter(|t| t.executed_at.is_none_or(|at| at >= cutoff))
                .collect(),
        }
    }

    /// Trades inside the `window` ending at `now`. A window reaching back past
    /// the earliest representable instant keeps every trade.
    pub fn within(&self, now: DateTime<Utc>, window: TimeDelta) -> Timeline<'a> {
        let cutoff = now.checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.since(cutoff)
    }

    pub fn as_slice(&self) -> &[&'a Trade] {
        &self.trades
    }
}
