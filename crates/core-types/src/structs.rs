use crate::enums::{Direction, Outcome};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single closed trade as recorded in the journal.
///
/// Instances are only produced by boundary validation (`Trade::try_from(TradeRecord)`)
/// or by the constructor below, and are treated as read-only by every analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    /// `None` when the journal date could not be parsed.
    pub executed_at: Option<DateTime<Utc>>,
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub size: Decimal,
    pub outcome: Outcome,
    pub pnl: Decimal,
    pub setup_name: Option<String>,
    pub bad_habits: BTreeSet<String>,
    pub good_habits: BTreeSet<String>,
    pub strategy_id: Option<String>,
    pub session: Option<String>,
}

impl Trade {
    /// Creates a trade with the fields every analyzer relies on; everything else
    /// starts empty and can be filled in with the `with_*` methods.
    pub fn new(
        id: impl Into<String>,
        symbol: impl Into<String>,
        direction: Direction,
        outcome: Outcome,
        pnl: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            executed_at: None,
            symbol: symbol.into(),
            direction,
            entry_price: Decimal::ZERO,
            exit_price: Decimal::ZERO,
            stop_loss: None,
            take_profit: None,
            size: Decimal::ONE,
            outcome,
            pnl,
            setup_name: None,
            bad_habits: BTreeSet::new(),
            good_habits: BTreeSet::new(),
            strategy_id: None,
            session: None,
        }
    }

    pub fn with_executed_at(mut self, executed_at: DateTime<Utc>) -> Self {
        self.executed_at = Some(executed_at);
        self
    }

    pub fn with_prices(mut self, entry: Decimal, exit: Decimal, stop_loss: Option<Decimal>) -> Self {
        self.entry_price = entry;
        self.exit_price = exit;
        self.stop_loss = stop_loss;
        self
    }

    pub fn with_setup(mut self, setup_name: impl Into<String>) -> Self {
        self.setup_name = Some(setup_name.into());
        self
    }

    pub fn with_bad_habit(mut self, tag: impl Into<String>) -> Self {
        self.bad_habits.insert(tag.into());
        self
    }

    pub fn with_good_habit(mut self, tag: impl Into<String>) -> Self {
        self.good_habits.insert(tag.into());
        self
    }

    /// A stop loss counts as set only when it is present and nonzero.
    pub fn has_stop_loss(&self) -> bool {
        self.stop_loss.is_some_and(|sl| !sl.is_zero())
    }

    /// Whether the sign of `pnl` matches the journaled outcome.
    ///
    /// Mismatches are tolerated by the engine: `outcome` drives win/loss counts
    /// while `pnl` drives every money metric.
    pub fn pnl_agrees_with_outcome(&self) -> bool {
        match self.outcome {
            Outcome::Win => self.pnl > Decimal::ZERO,
            Outcome::Loss => self.pnl < Decimal::ZERO,
            Outcome::Breakeven => true,
        }
    }
}

/// Aggregate statistics of a named playbook strategy, maintained outside the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybookStrategy {
    pub name: String,
    /// Win rate in percent (0-100).
    pub win_rate: f64,
    pub trades_count: usize,
    pub pnl: Decimal,
    #[serde(default)]
    pub rules: Vec<String>,
}
