//! Segment analysis: how win rate and P&L differ by side, time of day,
//! instrument, setup and playbook strategy.
//!
//! Every comparison is gated on a minimum sample per segment. A `None` from
//! one of the `*_edge` methods means "not enough evidence", which is a normal
//! result rather than a failure.

use crate::report::{SegmentAccumulator, SegmentStats};
use chrono::{Datelike, Timelike, Weekday};
use configuration::PatternThresholds;
use core_types::{Direction, PlaybookStrategy, Trade};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Time-of-day trading windows, by the hour the trade was executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Session {
    /// 09:00 - 11:59
    Morning,
    /// 12:00 - 15:59
    Afternoon,
    /// 16:00 - 20:59
    Evening,
}

impl Session {
    /// Hours outside the three windows (night trading) belong to no session.
    pub fn from_hour(hour: u32) -> Option<Self> {
        match hour {
            9..=11 => Some(Session::Morning),
            12..=15 => Some(Session::Afternoon),
            16..=20 => Some(Session::Evening),
            _ => None,
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Session::Morning => write!(f, "Morning"),
            Session::Afternoon => write!(f, "Afternoon"),
            Session::Evening => write!(f, "Evening"),
        }
    }
}

/// Long and short compared, with the stronger side named.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectionEdge {
    pub stronger: Direction,
    pub long: SegmentStats,
    pub short: SegmentStats,
    /// Win-rate difference in percentage points.
    pub spread: f64,
}

impl DirectionEdge {
    pub fn stronger_stats(&self) -> &SegmentStats {
        match self.stronger {
            Direction::Long => &self.long,
            Direction::Short => &self.short,
        }
    }

    pub fn weaker_stats(&self) -> &SegmentStats {
        match self.stronger {
            Direction::Long => &self.short,
            Direction::Short => &self.long,
        }
    }
}

/// The best and worst qualifying segments of one segmentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentComparison {
    pub best: SegmentStats,
    pub worst: SegmentStats,
    pub spread: f64,
}

impl SegmentComparison {
    pub fn sample_size(&self) -> usize {
        self.best.trades + self.worst.trades
    }
}

/// Judgement on the playbook as a whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StrategyVerdict {
    Strong(PlaybookStrategy),
    Weak(PlaybookStrategy),
}

/// Performance by session, hour of day and weekday.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimePatterns {
    pub sessions: Vec<SegmentStats>,
    pub hours: Vec<SegmentStats>,
    pub weekdays: Vec<SegmentStats>,
    pub best_hour: Option<SegmentStats>,
    pub worst_hour: Option<SegmentStats>,
    pub best_weekday: Option<SegmentStats>,
    pub worst_weekday: Option<SegmentStats>,
}

#[derive(Debug, Clone)]
pub struct PatternAnalyzer {
    thresholds: PatternThresholds,
}

impl PatternAnalyzer {
    pub fn new(thresholds: PatternThresholds) -> Self {
        Self { thresholds }
    }

    pub fn direction_breakdown(&self, trades: &[Trade]) -> (SegmentStats, SegmentStats) {
        let long = SegmentStats::from_trades(
            Direction::Long.to_string(),
            trades.iter().filter(|t| t.direction == Direction::Long),
        );
        let short = SegmentStats::from_trades(
            Direction::Short.to_string(),
            trades.iter().filter(|t| t.direction == Direction::Short),
        );
        (long, short)
    }

    /// Compares long against short once both sides have enough trades.
    pub fn direction_edge(&self, trades: &[Trade]) -> Option<DirectionEdge> {
        let (long, short) = self.direction_breakdown(trades);
        let min = self.thresholds.min_direction_trades;
        if long.trades < min || short.trades < min {
            tracing::debug!(long = long.trades, short = short.trades, min, "Direction edge gated.");
            return None;
        }

        let spread = (long.win_rate - short.win_rate).abs();
        if spread <= self.thresholds.direction_spread_pct {
            return None;
        }

        let stronger = if long.win_rate > short.win_rate {
            Direction::Long
        } else {
            Direction::Short
        };
        Some(DirectionEdge {
            stronger,
            long,
            short,
            spread,
        })
    }

    /// Hour of day used for bucketing; undated trades use the fallback hour.
    pub fn hour_of(&self, trade: &Trade) -> u32 {
        trade
            .executed_at
            .map(|at| at.hour())
            .unwrap_or(self.thresholds.fallback_hour)
    }

    /// Stats for every session that has at least one trade, in session order.
    pub fn session_breakdown(&self, trades: &[Trade]) -> Vec<SegmentStats> {
        let mut groups: BTreeMap<Session, SegmentAccumulator> = BTreeMap::new();
        for trade in trades {
            if let Some(session) = Session::from_hour(self.hour_of(trade)) {
                groups.entry(session).or_default().add(trade);
            }
        }
        groups
            .into_iter()
            .map(|(session, acc)| acc.finish(session.to_string()))
            .collect()
    }

    pub fn session_edge(&self, trades: &[Trade]) -> Option<SegmentComparison> {
        compare_segments(
            self.session_breakdown(trades),
            self.thresholds.min_session_trades,
            self.thresholds.session_spread_pct,
        )
    }

    /// Every traded instrument, most profitable first.
    pub fn instrument_breakdown(&self, trades: &[Trade]) -> Vec<SegmentStats> {
        let mut segments = group_by(trades, |t| Some(t.symbol.clone()));
        segments.sort_by(|a, b| b.total_pnl.cmp(&a.total_pnl).then_with(|| a.label.cmp(&b.label)));
        segments
    }

    pub fn instrument_edge(&self, trades: &[Trade]) -> Option<SegmentComparison> {
        compare_segments(
            group_by(trades, |t| Some(t.symbol.clone())),
            self.thresholds.min_instrument_trades,
            self.thresholds.instrument_spread_pct,
        )
    }

    /// Looks for a clearly strong, or failing that a clearly weak, playbook strategy.
    pub fn strategy_verdict(&self, strategies: &[PlaybookStrategy]) -> Option<StrategyVerdict> {
        let qualifying: Vec<&PlaybookStrategy> = strategies
            .iter()
            .filter(|s| s.trades_count >= self.thresholds.min_strategy_trades)
            .collect();

        let best = qualifying
            .iter()
            .copied()
            .max_by(|a, b| a.win_rate.total_cmp(&b.win_rate))?;
        if best.win_rate > self.thresholds.strong_strategy_win_rate {
            return Some(StrategyVerdict::Strong(best.clone()));
        }

        let worst = qualifying
            .iter()
            .copied()
            .min_by(|a, b| a.win_rate.total_cmp(&b.win_rate))?;
        if worst.win_rate < self.thresholds.weak_strategy_win_rate {
            return Some(StrategyVerdict::Weak(worst.clone()));
        }

        None
    }

    /// Setups with enough trades to rank, best win rate first (ties by P&L).
    pub fn setup_breakdown(&self, trades: &[Trade]) -> Vec<SegmentStats> {
        let mut segments: Vec<SegmentStats> = group_by(trades, |t| t.setup_name.clone())
            .into_iter()
            .filter(|s| s.trades >= self.thresholds.min_setup_trades)
            .collect();
        segments.sort_by(|a, b| {
            b.win_rate
                .total_cmp(&a.win_rate)
                .then_with(|| b.total_pnl.cmp(&a.total_pnl))
                .then_with(|| a.label.cmp(&b.label))
        });
        segments
    }

    pub fn top_setups(&self, trades: &[Trade], n: usize) -> Vec<SegmentStats> {
        self.setup_breakdown(trades).into_iter().take(n).collect()
    }

    /// Worst setups first.
    pub fn bottom_setups(&self, trades: &[Trade], n: usize) -> Vec<SegmentStats> {
        self.setup_breakdown(trades).into_iter().rev().take(n).collect()
    }

    pub fn time_patterns(&self, trades: &[Trade]) -> TimePatterns {
        let mut hours: BTreeMap<u32, SegmentAccumulator> = BTreeMap::new();
        let mut weekdays: BTreeMap<u32, (Weekday, SegmentAccumulator)> = BTreeMap::new();

        for trade in trades {
            hours.entry(self.hour_of(trade)).or_default().add(trade);
            // Undated trades have no weekday to fall back on.
            if let Some(at) = trade.executed_at {
                let day = at.weekday();
                weekdays
                    .entry(day.num_days_from_monday())
                    .or_insert_with(|| (day, SegmentAccumulator::default()))
                    .1
                    .add(trade);
            }
        }

        let hours: Vec<SegmentStats> = hours
            .into_iter()
            .map(|(hour, acc)| acc.finish(format!("{hour:02}:00")))
            .collect();
        let weekdays: Vec<SegmentStats> = weekdays
            .into_values()
            .map(|(day, acc)| acc.finish(day.to_string()))
            .collect();

        let min = self.thresholds.min_time_pattern_trades;
        let (best_hour, worst_hour) = extremes(&hours, min);
        let (best_weekday, worst_weekday) = extremes(&weekdays, min);

        TimePatterns {
            sessions: self.session_breakdown(trades),
            hours,
            weekdays,
            best_hour,
            worst_hour,
            best_weekday,
            worst_weekday,
        }
    }
}

/// Groups trades by a key, skipping trades without one. Segments come back in key order.
fn group_by<F>(trades: &[Trade], key: F) -> Vec<SegmentStats>
where
    F: Fn(&Trade) -> Option<String>,
{
    let mut groups: BTreeMap<String, SegmentAccumulator> = BTreeMap::new();
    for trade in trades {
        if let Some(k) = key(trade) {
            groups.entry(k).or_default().add(trade);
        }
    }
    groups
        .into_iter()
        .map(|(label, acc)| acc.finish(label))
        .collect()
}

/// Best and worst win rate among segments with at least `min_trades`.
fn extremes(segments: &[SegmentStats], min_trades: usize) -> (Option<SegmentStats>, Option<SegmentStats>) {
    let qualifying = || segments.iter().filter(|s| s.trades >= min_trades);
    // `max_by` keeps the last maximum and `min_by` the first minimum; reversing
    // the max search makes both pick the earliest segment on ties.
    let best = qualifying().rev().max_by(|a, b| a.win_rate.total_cmp(&b.win_rate)).cloned();
    let worst = qualifying().min_by(|a, b| a.win_rate.total_cmp(&b.win_rate)).cloned();
    (best, worst)
}

/// Compares the qualifying segments; needs at least two of them and a spread
/// strictly above `min_spread`.
fn compare_segments(segments: Vec<SegmentStats>, min_trades: usize, min_spread: f64) -> Option<SegmentComparison> {
    let qualifying: Vec<SegmentStats> = segments.into_iter().filter(|s| s.trades >= min_trades).collect();
    if qualifying.len() < 2 {
        return None;
    }

    let (best, worst) = extremes(&qualifying, min_trades);
    let (best, worst) = (best?, worst?);
    let spread = best.win_rate - worst.win_rate;
    if spread <= min_spread {
        return None;
    }
    Some(SegmentComparison { best, worst, spread })
}
