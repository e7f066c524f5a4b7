use crate::error::AnalyticsError;
use crate::math;
use chrono::{DateTime, TimeDelta, Utc};
use configuration::TrendThresholds;
use core_types::{Outcome, Timeline};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

/// Summary of the most recent N trades.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentWindow {
    pub trades: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub total_pnl: Decimal,
    pub trend: TrendDirection,
}

/// Summary of the trades in the last N calendar days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub days: u64,
    pub trades: usize,
    pub win_rate: f64,
    pub total_pnl: Decimal,
    /// Trades per day over the period.
    pub trade_frequency: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StreakKind {
    Winning,
    Losing,
}

/// The run of identical outcomes ending at the most recent trade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Streak {
    pub kind: StreakKind,
    pub length: usize,
    pub pnl: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StreakAlert {
    Hot(Streak),
    Losing(Streak),
}

#[derive(Debug, Clone)]
pub struct TrendAnalyzer {
    thresholds: TrendThresholds,
    lookback: TimeDelta,
}

impl TrendAnalyzer {
    pub fn new(thresholds: TrendThresholds) -> Result<Self, AnalyticsError> {
        let lookback = TimeDelta::from_std(thresholds.lookback)
            .map_err(|e| AnalyticsError::InvalidWindow("trend.lookback".to_string(), e.to_string()))?;
        Ok(Self { thresholds, lookback })
    }

    /// Win rate, P&L and direction of the most recent trades.
    pub fn last_trades(&self, timeline: &Timeline<'_>) -> RecentWindow {
        let window = timeline.last_n(self.thresholds.recent_trades);
        let wins = window.iter().filter(|t| t.outcome.is_win()).count();
        RecentWindow {
            trades: window.len(),
            wins,
            win_rate: math::percentage(wins, window.len()),
            total_pnl: window.iter().map(|t| t.pnl).sum(),
            trend: self.classify(&window),
        }
    }

    /// Compares the average P&L of the older half of the window with the newer half.
    pub fn classify(&self, window: &Timeline<'_>) -> TrendDirection {
        if window.len() < 2 {
            return TrendDirection::Stable;
        }
        let (older, newer) = window.as_slice().split_at(window.len() / 2);
        let older_avg = math::to_f64(math::decimal_mean(older.iter().map(|t| t.pnl)));
        let newer_avg = math::to_f64(math::decimal_mean(newer.iter().map(|t| t.pnl)));

        if newer_avg > older_avg * self.thresholds.improving_ratio {
            TrendDirection::Improving
        } else if newer_avg < older_avg * self.thresholds.declining_ratio {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        }
    }

    /// Activity over the lookback period ending at `now`. Undated trades are counted.
    pub fn last_days(&self, timeline: &Timeline<'_>, now: DateTime<Utc>) -> PeriodSummary {
        let recent = timeline.within(now, self.lookback);
        let wins = recent.iter().filter(|t| t.outcome.is_win()).count();
        let days = self.thresholds.lookback_days();
        PeriodSummary {
            days,
            trades: recent.len(),
            win_rate: math::percentage(wins, recent.len()),
            total_pnl: recent.iter().map(|t| t.pnl).sum(),
            trade_frequency: math::ratio(recent.len() as f64, days as f64),
        }
    }

    pub fn lookback(&self) -> TimeDelta {
        self.lookback
    }

    /// Hot or losing streak, if the current run is long enough to mention.
    pub fn streak_alert(&self, timeline: &Timeline<'_>) -> Option<StreakAlert> {
        let streak = current_streak(timeline)?;
        match streak.kind {
            StreakKind::Winning if streak.length >= self.thresholds.hot_streak => Some(StreakAlert::Hot(streak)),
            StreakKind::Losing if streak.length >= self.thresholds.losing_streak => {
                Some(StreakAlert::Losing(streak))
            }
            _ => None,
        }
    }
}

/// Walks back from the most recent trade while the outcome repeats.
/// A breakeven trade ends any run.
pub fn current_streak(timeline: &Timeline<'_>) -> Option<Streak> {
    let mut recent = timeline.iter_recent_first();
    let first = recent.next()?;
    let kind = match first.outcome {
        Outcome::Win => StreakKind::Winning,
        Outcome::Loss => StreakKind::Losing,
        Outcome::Breakeven => return None,
    };

    let mut streak = Streak {
        kind,
        length: 1,
        pnl: first.pnl,
    };
    for trade in recent {
        if trade.outcome != first.outcome {
            break;
        }
        streak.length += 1;
        streak.pnl += trade.pnl;
    }
    Some(streak)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_types::{Direction, Trade};
    use rust_decimal_macros::dec;

    fn analyzer() -> TrendAnalyzer {
        TrendAnalyzer::new(TrendThresholds::default()).unwrap()
    }

    fn series(pnls: &[i64]) -> Vec<Trade> {
        pnls.iter()
            .enumerate()
            .map(|(i, p)| {
                let outcome = match p.signum() {
                    1 => Outcome::Win,
                    -1 => Outcome::Loss,
                    _ => Outcome::Breakeven,
                };
                Trade::new(format!("t{i}"), "ES", Direction::Long, outcome, Decimal::from(*p))
                    .with_executed_at(Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap() + TimeDelta::days(i as i64))
            })
            .collect()
    }

    #[test]
    fn test_improving_and_declining() {
        let a = analyzer();
        let improving = series(&[10, -5, 10, 5, 10, 50, 40, 60, -10, 30]);
        assert_eq!(a.last_trades(&Timeline::new(&improving)).trend, TrendDirection::Improving);

        let declining = series(&[50, 40, 60, -10, 30, 10, -5, 10, 5, 10]);
        assert_eq!(a.last_trades(&Timeline::new(&declining)).trend, TrendDirection::Declining);

        let stable = series(&[10, 10, 10, 10]);
        assert_eq!(a.last_trades(&Timeline::new(&stable)).trend, TrendDirection::Stable);

        // The ratios scale the older average as-is, sign included.
        let losses = series(&[-100, -100, -110, -110]);
        assert_eq!(a.classify(&Timeline::new(&losses)), TrendDirection::Improving);

        let deeper_losses = series(&[-100, -100, -130, -130]);
        assert_eq!(a.classify(&Timeline::new(&deeper_losses)), TrendDirection::Declining);
    }

    #[test]
    fn test_last_trades_uses_only_recent_window() {
        let mut pnls = vec![-100; 5];
        pnls.extend([10, 20, -5, 10, 20, 10, 20, -5, 10, 20]);
        let trades = series(&pnls);
        let window = analyzer().last_trades(&Timeline::new(&trades));
        assert_eq!(window.trades, 10);
        assert_eq!(window.wins, 8);
        assert_eq!(window.win_rate, 80.0);
        assert_eq!(window.total_pnl, dec!(110));
    }

    #[test]
    fn test_last_days_includes_undated() {
        let mut trades = series(&[10, -10, 10, 10]);
        trades.push(Trade::new("undated", "ES", Direction::Long, Outcome::Win, dec!(5)));
        let now = Utc.with_ymd_and_hms(2024, 8, 2, 0, 0, 0).unwrap();

        // Only July 3rd and 4th fall inside the 30 days before August 2nd.
        let summary = analyzer().last_days(&Timeline::new(&trades), now);
        assert_eq!(summary.trades, 3);
        assert_eq!(summary.total_pnl, dec!(25));
        assert_eq!(summary.days, 30);
        assert!((summary.trade_frequency - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_last_days_with_huge_lookback_counts_everything() {
        let thresholds = TrendThresholds {
            lookback: std::time::Duration::from_secs(300_000 * 365 * 24 * 60 * 60),
            ..TrendThresholds::default()
        };
        let trades = series(&[10, -10, 10, 10]);
        let now = Utc.with_ymd_and_hms(2024, 8, 2, 0, 0, 0).unwrap();

        let summary = TrendAnalyzer::new(thresholds).unwrap().last_days(&Timeline::new(&trades), now);
        assert_eq!(summary.trades, 4);
        assert!(summary.trade_frequency.is_finite());
    }

    #[test]
    fn test_streaks() {
        let a = analyzer();
        let losing = series(&[20, 30, -10, -10, -10, -10, -10]);
        match a.streak_alert(&Timeline::new(&losing)) {
            Some(StreakAlert::Losing(s)) => {
                assert_eq!(s.length, 5);
                assert_eq!(s.pnl, dec!(-50));
            }
            other => panic!("expected losing streak, got {other:?}"),
        }

        let hot = series(&[-10, 20, 30, 10, 40]);
        assert!(matches!(a.streak_alert(&Timeline::new(&hot)), Some(StreakAlert::Hot(s)) if s.pnl == dec!(100)));

        let short_run = series(&[10, -10, 10, 10, 10]);
        assert!(a.streak_alert(&Timeline::new(&short_run)).is_none());

        let breakeven = series(&[-10, -10, -10, 0]);
        assert!(current_streak(&Timeline::new(&breakeven)).is_none());
    }
}
