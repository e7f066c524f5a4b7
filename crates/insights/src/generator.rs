use crate::detectors::{DETECTORS, DetectorContext};
use crate::error::InsightsError;
use crate::insight::Insight;
use analytics::{PatternAnalyzer, PsychologyCorrelator, TrendAnalyzer};
use chrono::{DateTime, TimeDelta, Utc};
use configuration::{AnalysisConfig, InsightSettings};
use core_types::{PlaybookStrategy, Timeline, Trade};
use std::cmp::Ordering;

/// Runs the detector battery over recent trades and ranks what it finds.
#[derive(Debug, Clone)]
pub struct InsightGenerator {
    settings: InsightSettings,
    recency: TimeDelta,
    patterns: PatternAnalyzer,
    psychology: PsychologyCorrelator,
    trend: TrendAnalyzer,
}

impl InsightGenerator {
    pub fn new(config: &AnalysisConfig) -> Result<Self, InsightsError> {
        config.validate()?;
        let recency = TimeDelta::from_std(config.insights.recency_window)
            .map_err(|e| InsightsError::InvalidWindow(e.to_string()))?;

        Ok(Self {
            settings: config.insights.clone(),
            recency,
            patterns: PatternAnalyzer::new(config.patterns.clone()),
            psychology: PsychologyCorrelator::new(config.psychology.clone()),
            trend: TrendAnalyzer::new(config.trend.clone())?,
        })
    }

    /// Generates insights from the trades inside the recency window ending at `now`.
    ///
    /// Trades whose date could not be parsed are kept, and a window longer than
    /// the calendar keeps everything. An empty window yields no
    /// insights, whatever the playbook says.
    #[tracing::instrument(name = "generate_insights", skip_all, fields(trades = trades.len(), now = %now))]
    pub fn generate(&self, trades: &[Trade], strategies: &[PlaybookStrategy], now: DateTime<Utc>) -> Vec<Insight> {
        let recent: Vec<Trade> = Timeline::new(trades)
            .within(now, self.recency)
            .iter()
            .cloned()
            .collect();

        if recent.is_empty() {
            tracing::debug!("No trades inside the recency window.");
            return Vec::new();
        }

        let ctx = DetectorContext {
            trades: &recent,
            timeline: Timeline::new(&recent),
            strategies,
            now,
            patterns: &self.patterns,
            psychology: &self.psychology,
            trend: &self.trend,
            settings: &self.settings,
        };

        let mut insights: Vec<Insight> = DETECTORS
            .iter()
            .filter_map(|(name, detect)| {
                let found = detect(&ctx);
                tracing::debug!(detector = name, fired = found.is_some(), "Ran insight detector.");
                found
            })
            .collect();

        rank(&mut insights);
        tracing::info!(recent = recent.len(), insights = insights.len(), "Generated insights.");
        insights
    }
}

/// Most severe first, then most confident, then actionable before informational.
pub fn rank(insights: &mut [Insight]) {
    insights.sort_by(compare);
}

fn compare(a: &Insight, b: &Insight) -> Ordering {
    a.severity
        .rank()
        .cmp(&b.severity.rank())
        .then_with(|| b.confidence.total_cmp(&a.confidence))
        .then_with(|| b.actionable.cmp(&a.actionable))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::{InsightCategory, Severity};

    fn insight(severity: Severity, confidence: f64, actionable: bool) -> Insight {
        Insight::new(
            InsightCategory::Trend,
            severity,
            String::new(),
            String::new(),
            confidence,
            actionable,
            Utc::now(),
        )
    }

    #[test]
    fn test_rank_orders_by_severity_confidence_then_actionable() {
        let mut insights = vec![
            insight(Severity::Neutral, 90.0, true),
            insight(Severity::Positive, 60.0, false),
            insight(Severity::Warning, 60.0, false),
            insight(Severity::Warning, 60.0, true),
            insight(Severity::Warning, 80.0, false),
            insight(Severity::Critical, 50.0, true),
        ];
        rank(&mut insights);

        let order: Vec<(Severity, f64, bool)> =
            insights.iter().map(|i| (i.severity, i.confidence, i.actionable)).collect();
        assert_eq!(
            order,
            vec![
                (Severity::Critical, 50.0, true),
                (Severity::Warning, 80.0, false),
                (Severity::Warning, 60.0, true),
                (Severity::Warning, 60.0, false),
                (Severity::Positive, 60.0, false),
                (Severity::Neutral, 90.0, true),
            ]
        );
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = AnalysisConfig::default();
        config.patterns.min_direction_trades = 0;
        assert!(matches!(InsightGenerator::new(&config), Err(InsightsError::Config(_))));
    }
}
