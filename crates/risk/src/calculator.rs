use crate::error::RiskError;
use analytics::{MetricsAggregator, PerformanceMetrics, math};
use configuration::RiskSettings;
use core_types::{Timeline, Trade};
use rust_decimal::Decimal;
use serde::Serialize;

/// Points awarded by each component of the risk score.
const STOP_LOSS_WEIGHT: f64 = 0.4;
const RISK_REWARD_POINTS: f64 = 30.0;
const STREAK_POINTS: f64 = 30.0;
const STREAK_PENALTY_PER_LOSS: f64 = 5.0;

/// Kelly-optimal sizing derived from win rate and payoff ratio.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KellyCriterion {
    /// Win probability as a fraction (0-1).
    pub win_probability: f64,
    pub payoff_ratio: f64,
    /// Full Kelly fraction in percent; negative when the edge is negative and
    /// equal to the win rate when there are wins but no losses.
    pub kelly_percent: f64,
    /// Half Kelly, clamped to `[0, max_recommended_risk_pct]`.
    pub recommended_risk_percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RiskMetrics {
    /// Percentage of trades with a stop loss set.
    pub stop_loss_usage: f64,
    /// Mean distance from entry to stop, as a fraction of entry price.
    pub avg_risk_per_trade: f64,
    /// Mean realized move divided by the planned risk.
    pub risk_reward_ratio: f64,
    pub max_consecutive_losses: usize,
    /// Composite discipline score between 0 and 100.
    pub risk_score: f64,
    pub kelly: KellyCriterion,
}

/// Derives risk-management metrics from a trade journal.
#[derive(Debug, Clone)]
pub struct RiskCalculator {
    settings: RiskSettings,
}

impl RiskCalculator {
    /// Creates a new `RiskCalculator`, validating its parameters.
    pub fn new(settings: RiskSettings) -> Result<Self, RiskError> {
        if !settings.max_recommended_risk_pct.is_finite() || settings.max_recommended_risk_pct < 0.0 {
            return Err(RiskError::InvalidParameters(format!(
                "max_recommended_risk_pct must be a non-negative number, got {}",
                settings.max_recommended_risk_pct
            )));
        }
        Ok(Self { settings })
    }

    #[tracing::instrument(name = "risk_calculate", skip_all, fields(trades = trades.len()))]
    pub fn calculate(&self, trades: &[Trade]) -> RiskMetrics {
        if trades.is_empty() {
            return RiskMetrics::default();
        }

        let performance = MetricsAggregator::new().calculate(trades);
        self.calculate_with(trades, &performance)
    }

    /// Same as `calculate`, reusing performance metrics the caller already has.
    pub fn calculate_with(&self, trades: &[Trade], performance: &PerformanceMetrics) -> RiskMetrics {
        if trades.is_empty() {
            return RiskMetrics::default();
        }

        let stop_loss_usage = stop_loss_usage(trades);
        let risk_reward_ratio = risk_reward_ratio(trades);
        let max_consecutive_losses = max_consecutive_losses(&Timeline::new(trades));

        let metrics = RiskMetrics {
            stop_loss_usage,
            avg_risk_per_trade: avg_risk_per_trade(trades),
            risk_reward_ratio,
            max_consecutive_losses,
            risk_score: self.risk_score(stop_loss_usage, risk_reward_ratio, max_consecutive_losses),
            kelly: self.kelly(performance),
        };

        tracing::debug!(
            stop_loss_usage = metrics.stop_loss_usage,
            risk_score = metrics.risk_score,
            max_consecutive_losses = metrics.max_consecutive_losses,
            "Calculated risk metrics."
        );
        metrics
    }

    /// 40 points for stop-loss usage, 30 for reaching 1:1 reward-to-risk and 30
    /// for avoiding long loss streaks.
    pub fn risk_score(&self, stop_loss_usage: f64, risk_reward_ratio: f64, max_consecutive_losses: usize) -> f64 {
        let tolerance = self.settings.loss_streak_tolerance;
        let streak_term = if max_consecutive_losses < tolerance {
            STREAK_POINTS
        } else {
            let excess = (max_consecutive_losses - tolerance) as f64;
            (STREAK_POINTS - excess * STREAK_PENALTY_PER_LOSS).max(0.0)
        };

        let score = stop_loss_usage * STOP_LOSS_WEIGHT + risk_reward_ratio.clamp(0.0, 1.0) * RISK_REWARD_POINTS + streak_term;
        score.clamp(0.0, 100.0)
    }

    /// `K = W - (1 - W) / R`, then half of it as the recommendation.
    ///
    /// A history with wins but no losing P&L has an unbounded payoff ratio, so
    /// `K` tends to `W` there.
    pub fn kelly(&self, performance: &PerformanceMetrics) -> KellyCriterion {
        let win_probability = performance.win_rate / 100.0;
        let payoff_ratio = performance.payoff_ratio;
        let loss_free = performance.average_loss.is_zero() && performance.average_win > Decimal::ZERO;

        let kelly_percent = if payoff_ratio > 0.0 {
            (win_probability - (1.0 - win_probability) / payoff_ratio) * 100.0
        } else if loss_free {
            win_probability * 100.0
        } else {
            0.0
        };
        let recommended_risk_percent = (kelly_percent / 2.0).clamp(0.0, self.settings.max_recommended_risk_pct);

        KellyCriterion {
            win_probability,
            payoff_ratio,
            kelly_percent,
            recommended_risk_percent,
        }
    }
}

/// Percentage of trades with a stop loss set.
pub fn stop_loss_usage(trades: &[Trade]) -> f64 {
    let with_stop = trades.iter().filter(|t| t.has_stop_loss()).count();
    math::percentage(with_stop, trades.len())
}

/// Mean `|entry - stop| / entry` over trades with a stop loss.
pub fn avg_risk_per_trade(trades: &[Trade]) -> f64 {
    let risks: Vec<f64> = trades
        .iter()
        .filter_map(|t| {
            let stop = t.stop_loss.filter(|sl| !sl.is_zero())?;
            Some(math::decimal_ratio((t.entry_price - stop).abs(), t.entry_price))
        })
        .collect();
    math::mean(&risks)
}

/// Mean `|exit - entry| / |entry - stop|` over trades with a stop loss; a trade
/// whose stop sits at its entry contributes 0.
pub fn risk_reward_ratio(trades: &[Trade]) -> f64 {
    let ratios: Vec<f64> = trades
        .iter()
        .filter_map(|t| {
            let stop = t.stop_loss.filter(|sl| !sl.is_zero())?;
            let reward = (t.exit_price - t.entry_price).abs();
            let risk = (t.entry_price - stop).abs();
            Some(if risk == Decimal::ZERO {
                0.0
            } else {
                math::decimal_ratio(reward, risk)
            })
        })
        .collect();
    math::mean(&ratios)
}

/// Longest run of consecutive losses; any non-loss resets the count.
pub fn max_consecutive_losses(timeline: &Timeline<'_>) -> usize {
    timeline
        .iter()
        .fold((0usize, 0usize), |(current, max), trade| {
            let current = if trade.outcome.is_loss() { current + 1 } else { 0 };
            (current, max.max(current))
        })
        .1
}
