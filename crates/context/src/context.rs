use analytics::{
    HabitCorrelation, PerformanceMetrics, PeriodSummary, RecentWindow, SegmentStats, Streak, StreakKind,
    TimePatterns,
};
use chrono::{DateTime, Utc};
use core_types::PlaybookStrategy;
use risk::RiskMetrics;
use serde::Serialize;
use std::fmt::Write;

/// Segment-level view of the journal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatternSummary {
    /// Long then short; empty when there are no trades.
    pub directions: Vec<SegmentStats>,
    pub top_setups: Vec<SegmentStats>,
    pub bottom_setups: Vec<SegmentStats>,
    pub instruments: Vec<SegmentStats>,
    pub time: TimePatterns,
    pub habits: HabitCorrelation,
    /// Playbook strategies, best win rate first.
    pub playbook: Vec<PlaybookStrategy>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentTrends {
    pub last_trades: RecentWindow,
    pub last_days: PeriodSummary,
    pub current_streak: Option<Streak>,
}

/// Everything known about a trader's performance, rebuilt from scratch on
/// every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradingContext {
    pub as_of: DateTime<Utc>,
    pub performance: PerformanceMetrics,
    pub patterns: PatternSummary,
    pub risk: RiskMetrics,
    pub recent: RecentTrends,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

impl TradingContext {
    /// A compact plain-text rendering for chat assistants and reports.
    pub fn summary(&self) -> String {
        let p = &self.performance;
        let mut out = String::new();

        // Writing to a String cannot fail.
        let _ = writeln!(out, "Trading context as of {}", self.as_of.format("%Y-%m-%d %H:%M UTC"));
        let _ = writeln!(
            out,
            "Performance: {} trades, {:.1}% win rate, total P&L {:.2}, avg {:.2}, profit factor {:.2}, max drawdown {:.2}",
            p.total_trades, p.win_rate, p.total_pnl, p.avg_pnl, p.profit_factor, p.max_drawdown
        );
        let _ = writeln!(
            out,
            "Risk: score {:.0}/100, stop loss on {:.0}% of trades, reward/risk {:.2}, max {} losses in a row, suggested risk {:.1}% per trade",
            self.risk.risk_score,
            self.risk.stop_loss_usage,
            self.risk.risk_reward_ratio,
            self.risk.max_consecutive_losses,
            self.risk.kelly.recommended_risk_percent
        );

        let recent = &self.recent.last_trades;
        let _ = writeln!(
            out,
            "Last {} trades: {:.1}% win rate, P&L {:.2}, trend {:?}",
            recent.trades, recent.win_rate, recent.total_pnl, recent.trend
        );
        let days = &self.recent.last_days;
        let _ = writeln!(
            out,
            "Last {} days: {} trades ({:.2}/day), {:.1}% win rate, P&L {:.2}",
            days.days, days.trades, days.trade_frequency, days.win_rate, days.total_pnl
        );
        if let Some(streak) = &self.recent.current_streak {
            let kind = match streak.kind {
                StreakKind::Winning => "wins",
                StreakKind::Losing => "losses",
            };
            let _ = writeln!(out, "Current streak: {} {} ({:.2})", streak.length, kind, streak.pnl);
        }

        write_segments(&mut out, "Top setups", &self.patterns.top_setups);
        write_segments(&mut out, "Bottom setups", &self.patterns.bottom_setups);
        write_segments(&mut out, "Instruments", &self.patterns.instruments);

        write_list(&mut out, "Strengths", &self.strengths);
        write_list(&mut out, "Weaknesses", &self.weaknesses);
        write_list(&mut out, "Recommendations", &self.recommendations);
        out
    }
}

fn write_segments(out: &mut String, heading: &str, segments: &[SegmentStats]) {
    if segments.is_empty() {
        return;
    }
    let _ = writeln!(out, "{heading}:");
    for s in segments {
        let _ = writeln!(
            out,
            "  - {}: {} trades, {:.1}% win rate, P&L {:.2}",
            s.label, s.trades, s.win_rate, s.total_pnl
        );
    }
}

fn write_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "{heading}:");
    for item in items {
        let _ = writeln!(out, "  - {item}");
    }
}
