use crate::math;
use crate::report::PerformanceMetrics;
use core_types::{Timeline, Trade};
use rust_decimal::{Decimal, MathematicalOps};
use serde::Serialize;

/// A stateless calculator for aggregate performance metrics.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsAggregator;

/// One step of the cumulative P&L fold used for drawdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrawdownPoint {
    pub cumulative: Decimal,
    pub peak: Decimal,
    pub drawdown: Decimal,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// Trades may arrive in any order; the drawdown fold sorts them first.
    #[tracing::instrument(name = "metrics_calculate", skip_all, fields(trades = trades.len()))]
    pub fn calculate(&self, trades: &[Trade]) -> PerformanceMetrics {
        let mut report = PerformanceMetrics::new();

        if trades.is_empty() {
            return report;
        }

        self.calculate_profitability(trades, &mut report);
        report.max_drawdown = max_drawdown(&Timeline::new(trades));
        report.sharpe_ratio = sharpe_ratio(trades);

        tracing::debug!(
            win_rate = report.win_rate,
            profit_factor = report.profit_factor,
            max_drawdown = %report.max_drawdown,
            "Calculated performance metrics."
        );
        report
    }

    fn calculate_profitability(&self, trades: &[Trade], report: &mut PerformanceMetrics) {
        report.total_trades = trades.len();

        let mut wins_by_pnl = 0usize;
        let mut losses_by_pnl = 0usize;

        for trade in trades {
            match trade.outcome {
                core_types::Outcome::Win => report.winning_trades += 1,
                core_types::Outcome::Loss => report.losing_trades += 1,
                core_types::Outcome::Breakeven => report.breakeven_trades += 1,
            }

            report.total_pnl += trade.pnl;
            if trade.pnl > Decimal::ZERO {
                report.gross_profit += trade.pnl;
                report.largest_win = report.largest_win.max(trade.pnl);
                wins_by_pnl += 1;
            } else if trade.pnl < Decimal::ZERO {
                report.gross_loss += trade.pnl.abs();
                report.largest_loss = report.largest_loss.min(trade.pnl);
                losses_by_pnl += 1;
            }
        }

        report.win_rate = math::percentage(report.winning_trades, report.total_trades);
        report.avg_pnl = report.total_pnl / Decimal::from(report.total_trades);
        report.profit_factor = profit_factor(report.gross_profit, report.gross_loss);

        if wins_by_pnl > 0 {
            report.average_win = report.gross_profit / Decimal::from(wins_by_pnl);
        }
        if losses_by_pnl > 0 {
            report.average_loss = report.gross_loss / Decimal::from(losses_by_pnl);
        }
        report.payoff_ratio = math::decimal_ratio(report.average_win, report.average_loss);
    }
}

/// Percentage of trades whose outcome is a win.
pub fn win_rate(trades: &[Trade]) -> f64 {
    let wins = trades.iter().filter(|t| t.outcome.is_win()).count();
    math::percentage(wins, trades.len())
}

/// Gross profit over gross loss magnitude; 0 when there is no loss to divide by.
pub fn profit_factor(gross_profit: Decimal, gross_loss: Decimal) -> f64 {
    math::decimal_ratio(gross_profit, gross_loss.abs())
}

/// Folds the timeline into its cumulative P&L curve with the running peak.
///
/// The peak starts at zero, so losses before the first gain count as drawdown.
pub fn drawdown_curve(timeline: &Timeline<'_>) -> Vec<DrawdownPoint> {
    let mut cumulative = Decimal::ZERO;
    let mut peak = Decimal::ZERO;

    timeline
        .iter()
        .map(|trade| {
            cumulative += trade.pnl;
            peak = peak.max(cumulative);
            DrawdownPoint {
                cumulative,
                peak,
                drawdown: peak - cumulative,
            }
        })
        .collect()
}

/// Largest peak-to-trough decline of cumulative P&L.
pub fn max_drawdown(timeline: &Timeline<'_>) -> Decimal {
    drawdown_curve(timeline)
        .into_iter()
        .map(|p| p.drawdown)
        .max()
        .unwrap_or(Decimal::ZERO)
}

/// Mean trade P&L over its population standard deviation (no risk-free rate,
/// not annualized). Zero when the P&L never varies.
pub fn sharpe_ratio(trades: &[Trade]) -> f64 {
    let mean = math::decimal_mean(trades.iter().map(|t| t.pnl));
    let squares: Option<Vec<Decimal>> = trades
        .iter()
        .map(|t| (t.pnl - mean).checked_mul(t.pnl - mean))
        .collect();
    let Some(squares) = squares else {
        return 0.0;
    };

    let variance = math::decimal_mean(squares);
    if variance <= Decimal::ZERO {
        return 0.0;
    }
    match variance.sqrt() {
        Some(std_dev) => math::decimal_ratio(mean, std_dev),
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_types::{Direction, Outcome};
    use rust_decimal_macros::dec;

    fn trade(day: u32, pnl: Decimal) -> Trade {
        let outcome = if pnl > dec!(0) {
            Outcome::Win
        } else if pnl < dec!(0) {
            Outcome::Loss
        } else {
            Outcome::Breakeven
        };
        Trade::new(format!("t{day}"), "ES", Direction::Long, outcome, pnl)
            .with_executed_at(Utc.with_ymd_and_hms(2024, 5, day, 15, 0, 0).unwrap())
    }

    #[test]
    fn test_empty_history_is_all_zero() {
        let report = MetricsAggregator::new().calculate(&[]);
        assert_eq!(report, PerformanceMetrics::default());
    }

    #[test]
    fn test_profitability_metrics() {
        let trades = vec![
            trade(1, dec!(100)),
            trade(2, dec!(-50)),
            trade(3, dec!(200)),
            trade(4, dec!(-100)),
            trade(5, dec!(0)),
        ];
        let report = MetricsAggregator::new().calculate(&trades);

        assert_eq!(report.total_trades, 5);
        assert_eq!(report.winning_trades, 2);
        assert_eq!(report.breakeven_trades, 1);
        assert_eq!(report.win_rate, 40.0);
        assert_eq!(report.total_pnl, dec!(150));
        assert_eq!(report.avg_pnl, dec!(30));
        assert_eq!(report.gross_profit, dec!(300));
        assert_eq!(report.gross_loss, dec!(150));
        assert_eq!(report.profit_factor, 2.0);
        assert_eq!(report.average_win, dec!(150));
        assert_eq!(report.average_loss, dec!(75));
        assert_eq!(report.payoff_ratio, 2.0);
        assert_eq!(report.largest_win, dec!(200));
        assert_eq!(report.largest_loss, dec!(-100));
    }

    #[test]
    fn test_profit_factor_without_losses_is_zero() {
        let report = MetricsAggregator::new().calculate(&[trade(1, dec!(100))]);
        assert_eq!(report.profit_factor, 0.0);
        assert!(report.profit_factor.is_finite());
        assert_eq!(report.sharpe_ratio, 0.0);
    }

    #[test]
    fn test_sharpe_is_zero_for_constant_fractional_pnl() {
        let trades = vec![trade(1, dec!(0.1)), trade(2, dec!(0.1)), trade(3, dec!(0.1))];
        assert_eq!(sharpe_ratio(&trades), 0.0);
    }

    #[test]
    fn test_max_drawdown_sorts_before_folding() {
        // Chronologically: +100, +50, -120, +30, -80 -> peak 150, trough -20 => drawdown 170.
        let trades = vec![
            trade(5, dec!(-80)),
            trade(2, dec!(50)),
            trade(4, dec!(30)),
            trade(1, dec!(100)),
            trade(3, dec!(-120)),
        ];
        let report = MetricsAggregator::new().calculate(&trades);
        assert_eq!(report.max_drawdown, dec!(170));
    }

    #[test]
    fn test_running_peak_is_monotonic() {
        let trades: Vec<Trade> = [10, -30, 25, -5, 40, -60, 5]
            .iter()
            .enumerate()
            .map(|(i, p)| trade(i as u32 + 1, Decimal::from(*p)))
            .collect();
        let curve = drawdown_curve(&Timeline::new(&trades));

        assert!(curve.windows(2).all(|w| w[1].peak >= w[0].peak));
        assert!(curve.iter().all(|p| p.drawdown >= dec!(0)));
    }

    #[test]
    fn test_sharpe_ratio() {
        let trades = vec![trade(1, dec!(10)), trade(2, dec!(30))];
        // mean 20, population stddev 10
        assert!((sharpe_ratio(&trades) - 2.0).abs() < 1e-9);
    }
}
