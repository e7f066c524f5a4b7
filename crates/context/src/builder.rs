use crate::context::{PatternSummary, RecentTrends, TradingContext};
use crate::error::ContextError;
use analytics::trend::current_streak;
use analytics::{
    MetricsAggregator, PatternAnalyzer, PerformanceMetrics, PsychologyCorrelator, PsychologyFinding, StrategyVerdict,
    TrendAnalyzer, TrendDirection,
};
use chrono::{DateTime, Utc};
use configuration::{AnalysisConfig, ContextThresholds};
use core_types::{PlaybookStrategy, Timeline, Trade};
use risk::{RiskCalculator, RiskMetrics};
use rust_decimal::Decimal;

pub const FIRST_TRADE_RECOMMENDATION: &str = "Start by logging your first trade";

/// Builds the full `TradingContext` from an unfiltered journal.
#[derive(Debug, Clone)]
pub struct TradingContextBuilder {
    thresholds: ContextThresholds,
    metrics: MetricsAggregator,
    patterns: PatternAnalyzer,
    psychology: PsychologyCorrelator,
    risk: RiskCalculator,
    trend: TrendAnalyzer,
}

/// The qualitative half of the context.
#[derive(Debug, Default)]
struct Assessment {
    strengths: Vec<String>,
    weaknesses: Vec<String>,
    recommendations: Vec<String>,
}

impl TradingContextBuilder {
    pub fn new(config: &AnalysisConfig) -> Result<Self, ContextError> {
        config.validate()?;
        Ok(Self {
            thresholds: config.context.clone(),
            metrics: MetricsAggregator::new(),
            patterns: PatternAnalyzer::new(config.patterns.clone()),
            psychology: PsychologyCorrelator::new(config.psychology.clone()),
            risk: RiskCalculator::new(config.risk.clone())?,
            trend: TrendAnalyzer::new(config.trend.clone())?,
        })
    }

    #[tracing::instrument(name = "build_context", skip_all, fields(trades = trades.len(), as_of = %as_of))]
    pub fn build(&self, trades: &[Trade], strategies: &[PlaybookStrategy], as_of: DateTime<Utc>) -> TradingContext {
        let timeline = Timeline::new(trades);
        let performance = self.metrics.calculate(trades);
        let risk = self.risk.calculate_with(trades, &performance);
        let recent = RecentTrends {
            last_trades: self.trend.last_trades(&timeline),
            last_days: self.trend.last_days(&timeline, as_of),
            current_streak: current_streak(&timeline),
        };

        if trades.is_empty() {
            tracing::info!("Empty journal, returning the starter context.");
            return TradingContext {
                as_of,
                performance,
                patterns: PatternSummary::default(),
                risk,
                recent,
                strengths: Vec::new(),
                weaknesses: Vec::new(),
                recommendations: vec![FIRST_TRADE_RECOMMENDATION.to_string()],
            };
        }

        let patterns = self.summarize_patterns(trades, strategies);
        let assessment = self.assess(trades, strategies, &performance, &risk, &recent, &patterns);
        tracing::info!(
            strengths = assessment.strengths.len(),
            weaknesses = assessment.weaknesses.len(),
            recommendations = assessment.recommendations.len(),
            "Built trading context."
        );

        TradingContext {
            as_of,
            performance,
            patterns,
            risk,
            recent,
            strengths: assessment.strengths,
            weaknesses: assessment.weaknesses,
            recommendations: assessment.recommendations,
        }
    }

    fn summarize_patterns(&self, trades: &[Trade], strategies: &[PlaybookStrategy]) -> PatternSummary {
        let n = self.thresholds.setup_list_len;
        let (long, short) = self.patterns.direction_breakdown(trades);

        let mut playbook = strategies.to_vec();
        playbook.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate).then_with(|| a.name.cmp(&b.name)));

        PatternSummary {
            directions: vec![long, short],
            top_setups: self.patterns.top_setups(trades, n),
            bottom_setups: self.patterns.bottom_setups(trades, n),
            instruments: self.patterns.instrument_breakdown(trades),
            time: self.patterns.time_patterns(trades),
            habits: self.psychology.correlate(trades),
            playbook,
        }
    }

    fn assess(
        &self,
        trades: &[Trade],
        strategies: &[PlaybookStrategy],
        performance: &PerformanceMetrics,
        risk: &RiskMetrics,
        recent: &RecentTrends,
        patterns: &PatternSummary,
    ) -> Assessment {
        let th = &self.thresholds;
        let mut a = Assessment::default();

        if performance.win_rate >= th.strong_win_rate {
            a.strengths.push(format!("High win rate of {:.1}%", performance.win_rate));
        } else if performance.win_rate < th.weak_win_rate {
            a.weaknesses.push(format!("Low win rate of {:.1}%", performance.win_rate));
            a.recommendations
                .push("Be more selective: only take trades that meet every rule of your best setups".to_string());
        }

        // Without a losing trade the profit factor is reported as 0 and says nothing.
        if performance.gross_loss > Decimal::ZERO {
            if performance.profit_factor >= th.strong_profit_factor {
                a.strengths.push(format!("Excellent profit factor of {:.2}", performance.profit_factor));
            } else if performance.profit_factor < th.weak_profit_factor {
                a.weaknesses.push(format!(
                    "Profit factor of {:.2} leaves little room for error",
                    performance.profit_factor
                ));
                a.recommendations.push(format!(
                    "Let winners run and cut losers sooner to lift your profit factor above {:.1}",
                    th.weak_profit_factor
                ));
            }
        }

        if risk.stop_loss_usage >= th.strong_stop_loss_usage {
            a.strengths.push(format!("Consistent stop loss use ({:.0}% of trades)", risk.stop_loss_usage));
        } else if risk.stop_loss_usage < th.min_stop_loss_usage {
            a.weaknesses.push(format!("Stop loss set on only {:.0}% of trades", risk.stop_loss_usage));
            a.recommendations.push("Place a stop loss on every trade before you enter".to_string());
        }

        if risk.max_consecutive_losses >= th.max_consecutive_losses {
            a.weaknesses.push(format!("Losing streaks of up to {} trades", risk.max_consecutive_losses));
            a.recommendations
                .push("Set a daily loss limit and step away after three losses in a row".to_string());
        }

        if risk.stop_loss_usage > 0.0 && risk.risk_reward_ratio < th.min_risk_reward {
            a.weaknesses.push(format!(
                "Average reward of {:.2}R is below your risk",
                risk.risk_reward_ratio
            ));
            a.recommendations.push("Aim for targets at least as far away as your stop".to_string());
        }

        match recent.last_trades.trend {
            TrendDirection::Improving => a.strengths.push("Recent performance is improving".to_string()),
            TrendDirection::Declining => {
                a.weaknesses.push("Recent performance is declining".to_string());
                a.recommendations.push(format!(
                    "Reduce size until your last {} trades stabilize",
                    recent.last_trades.trades
                ));
            }
            TrendDirection::Stable => {}
        }

        let best = patterns.top_setups.first();
        if let Some(best) = best {
            a.strengths.push(format!(
                "Best setup: {} ({:.1}% win rate over {} trades)",
                best.label, best.win_rate, best.trades
            ));
        }
        if let Some(worst) = patterns.bottom_setups.first()
            && best.is_none_or(|b| b.label != worst.label)
            && worst.win_rate < th.weak_win_rate
        {
            a.recommendations.push(format!(
                "Review or drop the {} setup ({:.1}% win rate)",
                worst.label, worst.win_rate
            ));
        }

        match self.patterns.strategy_verdict(strategies) {
            Some(StrategyVerdict::Strong(s)) => a.strengths.push(format!(
                "Playbook strategy {} is working ({:.1}% win rate)",
                s.name, s.win_rate
            )),
            Some(StrategyVerdict::Weak(s)) => {
                a.weaknesses.push(format!(
                    "Playbook strategy {} wins only {:.1}%",
                    s.name, s.win_rate
                ));
                a.recommendations.push(format!("Revisit the rules of {}", s.name));
            }
            None => {}
        }

        if let Some(PsychologyFinding::Destructive(h)) = self.psychology.assess(trades) {
            a.weaknesses.push(format!("Trades tagged '{}' win only {:.1}%", h.tag, h.win_rate));
            a.recommendations.push(format!("Stay out of the market when '{}' shows up", h.tag));
        }

        let sizing = risk.kelly.recommended_risk_percent;
        if sizing > 0.0 {
            a.recommendations
                .push(format!("Risk no more than {sizing:.1}% of your account per trade"));
        }

        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_types::{Direction, Outcome};
    use rust_decimal_macros::dec;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 31, 18, 0, 0).unwrap()
    }

    fn builder() -> TradingContextBuilder {
        TradingContextBuilder::new(&AnalysisConfig::default()).unwrap()
    }

    fn trade(i: u32, outcome: Outcome, pnl: Decimal) -> Trade {
        Trade::new(format!("t{i}"), "EURUSD", Direction::Long, outcome, pnl)
            .with_executed_at(Utc.with_ymd_and_hms(2024, 3, 1 + i, 10, 0, 0).unwrap())
    }

    fn strategy(name: &str, win_rate: f64, trades_count: usize) -> PlaybookStrategy {
        PlaybookStrategy {
            name: name.to_string(),
            win_rate,
            trades_count,
            pnl: Decimal::ZERO,
            rules: Vec::new(),
        }
    }

    #[test]
    fn test_empty_journal_yields_starter_context() {
        let ctx = builder().build(&[], &[], as_of());

        assert_eq!(ctx.performance, PerformanceMetrics::new());
        assert_eq!(ctx.patterns, PatternSummary::default());
        assert!(ctx.strengths.is_empty());
        assert!(ctx.weaknesses.is_empty());
        assert_eq!(ctx.recommendations, vec![FIRST_TRADE_RECOMMENDATION.to_string()]);
        assert_eq!(ctx.risk.risk_score, 0.0);
        assert!(ctx.recent.current_streak.is_none());
    }

    #[test]
    fn test_single_winner_without_stop() {
        let ctx = builder().build(&[trade(1, Outcome::Win, dec!(100))], &[], as_of());

        assert_eq!(ctx.risk.stop_loss_usage, 0.0);
        assert_eq!(ctx.performance.gross_loss, Decimal::ZERO);
        assert_eq!(ctx.performance.profit_factor, 0.0);
        assert!(ctx.strengths.iter().any(|s| s.starts_with("High win rate")));
        assert!(ctx.weaknesses.iter().any(|s| s.starts_with("Stop loss set on only 0%")));
        assert!(!ctx.weaknesses.iter().any(|s| s.contains("Profit factor")));
    }

    #[test]
    fn test_losing_journal_is_flagged() {
        let trades: Vec<Trade> = (0..6)
            .map(|i| trade(i, Outcome::Loss, dec!(-50)).with_prices(dec!(1.10), dec!(1.09), Some(dec!(1.09))))
            .collect();
        let ctx = builder().build(&trades, &[], as_of());

        assert!(ctx.weaknesses.iter().any(|s| s.starts_with("Low win rate")));
        assert!(ctx.weaknesses.iter().any(|s| s.starts_with("Losing streaks of up to 6")));
        assert!(ctx.strengths.iter().any(|s| s.starts_with("Consistent stop loss use")));
        assert!(ctx.recommendations.iter().any(|s| s.contains("daily loss limit")));
        assert!(!ctx.recommendations.iter().any(|s| s == FIRST_TRADE_RECOMMENDATION));
    }

    #[test]
    fn test_best_setup_is_named_and_worst_reviewed() {
        let mut trades: Vec<Trade> = (0..3).map(|i| trade(i, Outcome::Win, dec!(40)).with_setup("Breakout")).collect();
        trades.extend((3..6).map(|i| trade(i, Outcome::Loss, dec!(-20)).with_setup("Reversal")));
        let ctx = builder().build(&trades, &[], as_of());

        assert_eq!(ctx.patterns.top_setups[0].label, "Breakout");
        assert!(ctx.strengths.iter().any(|s| s.starts_with("Best setup: Breakout")));
        assert!(ctx.recommendations.iter().any(|s| s.starts_with("Review or drop the Reversal setup")));
    }

    #[test]
    fn test_playbook_is_sorted_and_judged() {
        let strategies = vec![strategy("Fade", 35.0, 12), strategy("Trend", 75.0, 20)];
        let ctx = builder().build(&[trade(1, Outcome::Win, dec!(10))], &strategies, as_of());

        let names: Vec<&str> = ctx.patterns.playbook.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Trend", "Fade"]);
        assert!(ctx.strengths.iter().any(|s| s.contains("Trend is working")));
    }
}
