//! The insight detectors.
//!
//! Each detector is a plain function that looks at one aspect of the recent
//! trades and returns at most one insight. `DETECTORS` is the fixed battery run
//! by the generator, in this order.

use crate::insight::{Insight, InsightCategory, Severity};
use analytics::{
    PatternAnalyzer, PsychologyCorrelator, PsychologyFinding, StrategyVerdict, StreakAlert, TrendAnalyzer,
};
use chrono::{DateTime, Utc};
use configuration::InsightSettings;
use core_types::{PlaybookStrategy, Timeline, Trade};

/// Everything a detector may look at. Built once per `generate` call.
pub struct DetectorContext<'a> {
    /// Trades inside the recency window, oldest first.
    pub trades: &'a [Trade],
    /// The same trades, chronologically sorted.
    pub timeline: Timeline<'a>,
    pub strategies: &'a [PlaybookStrategy],
    pub now: DateTime<Utc>,
    pub patterns: &'a PatternAnalyzer,
    pub psychology: &'a PsychologyCorrelator,
    pub trend: &'a TrendAnalyzer,
    pub settings: &'a InsightSettings,
}

impl DetectorContext<'_> {
    /// Confidence grows with the number of trades behind a finding, up to the cap.
    pub fn confidence(&self, sample: usize) -> f64 {
        let raw = self.settings.base_confidence + self.settings.confidence_per_trade * sample as f64;
        raw.min(self.settings.max_confidence)
    }
}

pub type Detector = fn(&DetectorContext<'_>) -> Option<Insight>;

pub const DETECTORS: [(&str, Detector); 6] = [
    ("direction", detect_direction_edge),
    ("session", detect_session_edge),
    ("strategy", detect_strategy_performance),
    ("psychology", detect_psychology),
    ("streak", detect_streak),
    ("instrument", detect_instrument_edge),
];

pub fn detect_direction_edge(ctx: &DetectorContext<'_>) -> Option<Insight> {
    let edge = ctx.patterns.direction_edge(ctx.trades)?;
    let strong = edge.stronger_stats();
    let weak = edge.weaker_stats();

    Some(Insight::new(
        InsightCategory::Direction,
        Severity::Neutral,
        format!("{} Trades Outperform", strong.label),
        format!(
            "Your {} trades win {:.1}% of the time ({} trades) versus {:.1}% for {} trades ({} trades). \
             Consider favouring {} setups and tightening your criteria for {} entries.",
            strong.label.to_lowercase(),
            strong.win_rate,
            strong.trades,
            weak.win_rate,
            weak.label.to_lowercase(),
            weak.trades,
            strong.label.to_lowercase(),
            weak.label.to_lowercase(),
        ),
        ctx.confidence(strong.trades + weak.trades),
        true,
        ctx.now,
    ))
}

pub fn detect_session_edge(ctx: &DetectorContext<'_>) -> Option<Insight> {
    let cmp = ctx.patterns.session_edge(ctx.trades)?;

    Some(Insight::new(
        InsightCategory::Session,
        Severity::Neutral,
        format!("{} Session Is Your Best", cmp.best.label),
        format!(
            "You win {:.1}% of {} trades versus {:.1}% in the {} session, a {:.1} point gap. \
             Concentrate your trading in the {} window.",
            cmp.best.win_rate,
            cmp.best.label.to_lowercase(),
            cmp.worst.win_rate,
            cmp.worst.label.to_lowercase(),
            cmp.spread,
            cmp.best.label.to_lowercase(),
        ),
        ctx.confidence(cmp.sample_size()),
        true,
        ctx.now,
    ))
}

pub fn detect_strategy_performance(ctx: &DetectorContext<'_>) -> Option<Insight> {
    let insight = match ctx.patterns.strategy_verdict(ctx.strategies)? {
        StrategyVerdict::Strong(s) => Insight::new(
            InsightCategory::Strategy,
            Severity::Positive,
            format!("Strong Strategy: {}", s.name),
            format!(
                "{} wins {:.1}% across {} trades with a P&L of {:.2}. Keep following its rules.",
                s.name, s.win_rate, s.trades_count, s.pnl
            ),
            ctx.confidence(s.trades_count),
            false,
            ctx.now,
        ),
        StrategyVerdict::Weak(s) => Insight::new(
            InsightCategory::Strategy,
            Severity::Warning,
            format!("Underperforming Strategy: {}", s.name),
            format!(
                "{} wins only {:.1}% across {} trades. Review its rules or pause it until you find the leak.",
                s.name, s.win_rate, s.trades_count
            ),
            ctx.confidence(s.trades_count),
            true,
            ctx.now,
        ),
    };
    Some(insight)
}

pub fn detect_psychology(ctx: &DetectorContext<'_>) -> Option<Insight> {
    let insight = match ctx.psychology.assess(ctx.trades)? {
        PsychologyFinding::Destructive(h) => Insight::new(
            InsightCategory::Psychology,
            Severity::Critical,
            format!("Destructive Pattern: {}", h.tag),
            format!(
                "Trades tagged '{}' win only {:.1}% of the time ({} of {} trades). \
                 Add a rule that keeps you out of the market when this shows up.",
                h.tag, h.win_rate, h.wins, h.total
            ),
            ctx.confidence(h.total),
            true,
            ctx.now,
        ),
        PsychologyFinding::MentalEdge(h) => Insight::new(
            InsightCategory::Psychology,
            Severity::Positive,
            format!("Mental Edge: {}", h.tag),
            format!(
                "When you practise '{}' you win {:.1}% of your trades ({} trades). Make it part of your routine.",
                h.tag, h.win_rate, h.total
            ),
            ctx.confidence(h.total),
            false,
            ctx.now,
        ),
    };
    Some(insight)
}

pub fn detect_streak(ctx: &DetectorContext<'_>) -> Option<Insight> {
    let insight = match ctx.trend.streak_alert(&ctx.timeline)? {
        StreakAlert::Hot(s) => Insight::new(
            InsightCategory::Trend,
            Severity::Positive,
            format!("Hot Streak: {} Wins in a Row", s.length),
            format!(
                "You have won your last {} trades for a combined {:.2}. Stay disciplined and keep your size consistent.",
                s.length, s.pnl
            ),
            ctx.confidence(s.length),
            false,
            ctx.now,
        ),
        StreakAlert::Losing(s) => Insight::new(
            InsightCategory::Trend,
            Severity::Warning,
            format!("Losing Streak: {} Losses in a Row", s.length),
            format!(
                "Your last {} trades were losses totalling {:.2}. Consider pausing, reducing size and reviewing them before the next entry.",
                s.length, s.pnl
            ),
            ctx.confidence(s.length),
            true,
            ctx.now,
        ),
    };
    Some(insight)
}

pub fn detect_instrument_edge(ctx: &DetectorContext<'_>) -> Option<Insight> {
    let cmp = ctx.patterns.instrument_edge(ctx.trades)?;

    Some(Insight::new(
        InsightCategory::Instrument,
        Severity::Warning,
        format!("Instrument Gap: {} vs {}", cmp.best.label, cmp.worst.label),
        format!(
            "You win {:.1}% on {} but only {:.1}% on {} ({:.1} point gap). Consider cutting size on {} or trading it less.",
            cmp.best.win_rate, cmp.best.label, cmp.worst.win_rate, cmp.worst.label, cmp.spread, cmp.worst.label
        ),
        ctx.confidence(cmp.sample_size()),
        true,
        ctx.now,
    ))
}
