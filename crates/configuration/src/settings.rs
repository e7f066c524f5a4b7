use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DAY: u64 = 24 * 60 * 60;

/// The root configuration structure for the insight engine.
///
/// Every minimum-sample gate and spread threshold is its own field. Several of
/// them look alike (the playbook strategy gate and the setup ranking gate, for
/// instance) but are tuned independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub patterns: PatternThresholds,
    pub psychology: PsychologyThresholds,
    pub risk: RiskSettings,
    pub trend: TrendThresholds,
    pub insights: InsightSettings,
    pub context: ContextThresholds,
    pub logging: LoggingSettings,
}

/// Gates and spreads for segment comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternThresholds {
    /// Minimum trades per side before long and short are compared.
    pub min_direction_trades: usize,
    /// Win-rate spread (percentage points) needed to report a direction edge.
    pub direction_spread_pct: f64,
    pub min_session_trades: usize,
    pub session_spread_pct: f64,
    pub min_instrument_trades: usize,
    pub instrument_spread_pct: f64,
    /// Minimum `trades_count` for a playbook strategy to be judged.
    pub min_strategy_trades: usize,
    pub strong_strategy_win_rate: f64,
    pub weak_strategy_win_rate: f64,
    /// Minimum trades for a setup to appear in the top/bottom rankings.
    pub min_setup_trades: usize,
    /// Minimum trades for an hour or weekday to count as best/worst.
    pub min_time_pattern_trades: usize,
    /// Hour of day used to bucket trades whose date could not be parsed.
    pub fallback_hour: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsychologyThresholds {
    pub min_good_habit_trades: usize,
    pub min_bad_habit_trades: usize,
    /// A bad habit below this win rate is reported as destructive.
    pub destructive_win_rate: f64,
    /// A good habit at or above this win rate is reported as a mental edge.
    pub mental_edge_win_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    /// Upper bound for the half-Kelly risk recommendation, in percent.
    pub max_recommended_risk_pct: f64,
    /// Consecutive losses tolerated before the risk score starts to drop.
    pub loss_streak_tolerance: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendThresholds {
    /// Size of the "last N trades" window.
    pub recent_trades: usize,
    /// Calendar window for the "last N days" summary.
    #[serde(with = "humantime_serde")]
    pub lookback: Duration,
    pub improving_ratio: f64,
    pub declining_ratio: f64,
    pub hot_streak: usize,
    pub losing_streak: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightSettings {
    /// Only trades inside this window feed the insight detectors.
    #[serde(with = "humantime_serde")]
    pub recency_window: Duration,
    pub base_confidence: f64,
    pub confidence_per_trade: f64,
    pub max_confidence: f64,
}

/// Cut-offs used to derive strengths, weaknesses and recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextThresholds {
    pub strong_win_rate: f64,
    pub weak_win_rate: f64,
    pub strong_profit_factor: f64,
    pub weak_profit_factor: f64,
    pub strong_stop_loss_usage: f64,
    pub min_stop_loss_usage: f64,
    pub max_consecutive_losses: usize,
    pub min_risk_reward: f64,
    /// Length of the top/bottom setup lists.
    pub setup_list_len: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

// --- Default Implementations ---

impl Default for PatternThresholds {
    fn default() -> Self {
        Self {
            min_direction_trades: 5,
            direction_spread_pct: 15.0,
            min_session_trades: 5,
            session_spread_pct: 15.0,
            min_instrument_trades: 5,
            instrument_spread_pct: 20.0,
            min_strategy_trades: 5,
            strong_strategy_win_rate: 70.0,
            weak_strategy_win_rate: 40.0,
            min_setup_trades: 3,
            min_time_pattern_trades: 3,
            fallback_hour: 12,
        }
    }
}

impl Default for PsychologyThresholds {
    fn default() -> Self {
        Self {
            min_good_habit_trades: 5,
            min_bad_habit_trades: 3,
            destructive_win_rate: 30.0,
            mental_edge_win_rate: 60.0,
        }
    }
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            max_recommended_risk_pct: 25.0,
            loss_streak_tolerance: 5,
        }
    }
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            recent_trades: 10,
            lookback: Duration::from_secs(30 * DAY),
            improving_ratio: 1.2,
            declining_ratio: 0.8,
            hot_streak: 4,
            losing_streak: 3,
        }
    }
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            recency_window: Duration::from_secs(30 * DAY),
            base_confidence: 50.0,
            confidence_per_trade: 2.0,
            max_confidence: 95.0,
        }
    }
}

impl Default for ContextThresholds {
    fn default() -> Self {
        Self {
            strong_win_rate: 60.0,
            weak_win_rate: 40.0,
            strong_profit_factor: 2.0,
            weak_profit_factor: 1.2,
            strong_stop_loss_usage: 90.0,
            min_stop_loss_usage: 60.0,
            max_consecutive_losses: 5,
            min_risk_reward: 1.0,
            setup_list_len: 3,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl AnalysisConfig {
    /// Rejects settings that would make the analyzers meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.patterns;
        for (name, value) in [
            ("patterns.direction_spread_pct", p.direction_spread_pct),
            ("patterns.session_spread_pct", p.session_spread_pct),
            ("patterns.instrument_spread_pct", p.instrument_spread_pct),
            ("patterns.strong_strategy_win_rate", p.strong_strategy_win_rate),
            ("patterns.weak_strategy_win_rate", p.weak_strategy_win_rate),
            ("psychology.destructive_win_rate", self.psychology.destructive_win_rate),
            ("psychology.mental_edge_win_rate", self.psychology.mental_edge_win_rate),
            ("risk.max_recommended_risk_pct", self.risk.max_recommended_risk_pct),
            ("insights.max_confidence", self.insights.max_confidence),
            ("insights.base_confidence", self.insights.base_confidence),
            ("context.strong_win_rate", self.context.strong_win_rate),
            ("context.weak_win_rate", self.context.weak_win_rate),
            ("context.strong_stop_loss_usage", self.context.strong_stop_loss_usage),
            ("context.min_stop_loss_usage", self.context.min_stop_loss_usage),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::InvalidThreshold {
                    field: name,
                    reason: format!("must be a percentage between 0 and 100, got {value}"),
                });
            }
        }

        for (name, value) in [
            ("patterns.min_direction_trades", p.min_direction_trades),
            ("patterns.min_session_trades", p.min_session_trades),
            ("patterns.min_instrument_trades", p.min_instrument_trades),
            ("patterns.min_strategy_trades", p.min_strategy_trades),
            ("patterns.min_setup_trades", p.min_setup_trades),
            ("patterns.min_time_pattern_trades", p.min_time_pattern_trades),
            ("psychology.min_good_habit_trades", self.psychology.min_good_habit_trades),
            ("psychology.min_bad_habit_trades", self.psychology.min_bad_habit_trades),
            ("trend.recent_trades", self.trend.recent_trades),
            ("trend.hot_streak", self.trend.hot_streak),
            ("trend.losing_streak", self.trend.losing_streak),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidThreshold {
                    field: name,
                    reason: "must be at least 1".to_string(),
                });
            }
        }

        if p.fallback_hour > 23 {
            return Err(ConfigError::InvalidThreshold {
                field: "patterns.fallback_hour",
                reason: format!("must be an hour between 0 and 23, got {}", p.fallback_hour),
            });
        }
        if self.trend.declining_ratio > self.trend.improving_ratio {
            return Err(ConfigError::InvalidThreshold {
                field: "trend.declining_ratio",
                reason: "must not exceed trend.improving_ratio".to_string(),
            });
        }
        for (name, window) in [
            ("trend.lookback", self.trend.lookback),
            ("insights.recency_window", self.insights.recency_window),
        ] {
            if window.as_secs() < DAY {
                return Err(ConfigError::InvalidThreshold {
                    field: name,
                    reason: "must span at least one day".to_string(),
                });
            }
        }
        if self.insights.confidence_per_trade < 0.0 {
            return Err(ConfigError::InvalidThreshold {
                field: "insights.confidence_per_trade",
                reason: "must not be negative".to_string(),
            });
        }

        Ok(())
    }
}

impl TrendThresholds {
    /// The lookback expressed in whole days, as used for trade frequency.
    pub fn lookback_days(&self) -> u64 {
        (self.lookback.as_secs() / DAY).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
        assert_eq!(AnalysisConfig::default().trend.lookback_days(), 30);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let cfg: AnalysisConfig = toml::from_str(
            r#"
            [patterns]
            min_direction_trades = 8

            [insights]
            recency_window = "2weeks"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.patterns.min_direction_trades, 8);
        assert_eq!(cfg.patterns.min_setup_trades, 3);
        assert_eq!(cfg.insights.recency_window, Duration::from_secs(14 * DAY));
        assert_eq!(cfg.trend.recent_trades, 10);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut cfg = AnalysisConfig::default();
        cfg.patterns.direction_spread_pct = 150.0;
        assert!(cfg.validate().is_err());

        let mut cfg = AnalysisConfig::default();
        cfg.psychology.min_bad_habit_trades = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidThreshold { field: "psychology.min_bad_habit_trades", .. })
        ));

        let mut cfg = AnalysisConfig::default();
        cfg.insights.recency_window = Duration::from_secs(3600);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidThreshold { field: "insights.recency_window", .. })
        ));

        let mut cfg = AnalysisConfig::default();
        cfg.trend.declining_ratio = 1.5;
        assert!(cfg.validate().is_err());
    }
}
