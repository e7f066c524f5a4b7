use crate::math;
use core_types::Trade;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregate performance of a set of trades.
///
/// This struct is the output of the `MetricsAggregator`. Every ratio follows the
/// safe-zero rule, so an empty or loss-free history reports zeros rather than
/// infinities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    // I. Trade counts (by journaled outcome)
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub breakeven_trades: usize,
    pub win_rate: f64,

    // II. Profitability (by pnl sign)
    pub total_pnl: Decimal,
    pub avg_pnl: Decimal,
    pub gross_profit: Decimal,
    pub gross_loss: Decimal,
    pub profit_factor: f64,
    pub average_win: Decimal,
    pub average_loss: Decimal,
    pub largest_win: Decimal,
    pub largest_loss: Decimal,
    pub payoff_ratio: f64,

    // III. Risk-adjusted
    pub max_drawdown: Decimal,
    pub sharpe_ratio: f64,
}

impl PerformanceMetrics {
    /// Creates a zeroed-out report, which is also the report of an empty history.
    pub fn new() -> Self {
        Self {
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            breakeven_trades: 0,
            win_rate: 0.0,
            total_pnl: Decimal::ZERO,
            avg_pnl: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
            gross_loss: Decimal::ZERO,
            profit_factor: 0.0,
            average_win: Decimal::ZERO,
            average_loss: Decimal::ZERO,
            largest_win: Decimal::ZERO,
            largest_loss: Decimal::ZERO,
            payoff_ratio: 0.0,
            max_drawdown: Decimal::ZERO,
            sharpe_ratio: 0.0,
        }
    }
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Win rate and P&L of one slice of the trade history (a side, a session, an
/// instrument, a setup, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentStats {
    pub label: String,
    pub trades: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub total_pnl: Decimal,
    pub avg_pnl: Decimal,
}

impl SegmentStats {
    pub fn from_trades<'a>(label: impl Into<String>, trades: impl IntoIterator<Item = &'a Trade>) -> Self {
        let mut acc = SegmentAccumulator::default();
        for trade in trades {
            acc.add(trade);
        }
        acc.finish(label)
    }
}

/// Running totals for a segment while trades are being grouped.
#[derive(Debug, Clone, Default)]
pub(crate) struct SegmentAccumulator {
    trades: usize,
    wins: usize,
    total_pnl: Decimal,
}

impl SegmentAccumulator {
    pub(crate) fn add(&mut self, trade: &Trade) {
        self.trades += 1;
        if trade.outcome.is_win() {
            self.wins += 1;
        }
        self.total_pnl += trade.pnl;
    }

    pub(crate) fn finish(self, label: impl Into<String>) -> SegmentStats {
        SegmentStats {
            label: label.into(),
            trades: self.trades,
            wins: self.wins,
            win_rate: math::percentage(self.wins, self.trades),
            total_pnl: self.total_pnl,
            avg_pnl: self
                .total_pnl
                .checked_div(Decimal::from(self.trades))
                .unwrap_or(Decimal::ZERO),
        }
    }
}
