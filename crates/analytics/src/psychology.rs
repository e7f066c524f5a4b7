use crate::math;
use configuration::PsychologyThresholds;
use core_types::Trade;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Outcome record of one habit or emotion tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitStats {
    pub tag: String,
    pub wins: usize,
    pub total: usize,
    pub win_rate: f64,
}

/// Per-tag outcomes for both habit families. Good habits are listed best
/// first, bad habits worst first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HabitCorrelation {
    pub good: Vec<HabitStats>,
    pub bad: Vec<HabitStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PsychologyFinding {
    /// A bad habit that coincides with a very low win rate.
    Destructive(HabitStats),
    /// A good habit that coincides with a high win rate.
    MentalEdge(HabitStats),
}

/// Correlates the habit tags on each trade with its outcome.
#[derive(Debug, Clone)]
pub struct PsychologyCorrelator {
    thresholds: PsychologyThresholds,
}

impl PsychologyCorrelator {
    pub fn new(thresholds: PsychologyThresholds) -> Self {
        Self { thresholds }
    }

    pub fn correlate(&self, trades: &[Trade]) -> HabitCorrelation {
        let mut good = tally(trades, |t| &t.good_habits);
        let mut bad = tally(trades, |t| &t.bad_habits);

        good.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate).then_with(|| a.tag.cmp(&b.tag)));
        bad.sort_by(|a, b| a.win_rate.total_cmp(&b.win_rate).then_with(|| a.tag.cmp(&b.tag)));

        HabitCorrelation { good, bad }
    }

    /// Highest win-rate good habit among those seen on enough trades.
    pub fn best_good_habit<'a>(&self, correlation: &'a HabitCorrelation) -> Option<&'a HabitStats> {
        correlation
            .good
            .iter()
            .find(|h| h.total >= self.thresholds.min_good_habit_trades)
    }

    /// Lowest win-rate bad habit among those seen on enough trades.
    pub fn worst_bad_habit<'a>(&self, correlation: &'a HabitCorrelation) -> Option<&'a HabitStats> {
        correlation
            .bad
            .iter()
            .find(|h| h.total >= self.thresholds.min_bad_habit_trades)
    }

    /// A destructive bad habit outranks any mental edge.
    pub fn assess(&self, trades: &[Trade]) -> Option<PsychologyFinding> {
        let correlation = self.correlate(trades);

        if let Some(worst) = self.worst_bad_habit(&correlation) {
            if worst.win_rate < self.thresholds.destructive_win_rate {
                return Some(PsychologyFinding::Destructive(worst.clone()));
            }
        }

        self.best_good_habit(&correlation)
            .filter(|best| best.win_rate >= self.thresholds.mental_edge_win_rate)
            .map(|best| PsychologyFinding::MentalEdge(best.clone()))
    }
}

fn tally<F>(trades: &[Trade], tags: F) -> Vec<HabitStats>
where
    F: Fn(&Trade) -> &BTreeSet<String>,
{
    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for trade in trades {
        for tag in tags(trade) {
            let entry = counts.entry(tag.as_str()).or_default();
            entry.1 += 1;
            if trade.outcome.is_win() {
                entry.0 += 1;
            }
        }
    }

    counts
        .into_iter()
        .map(|(tag, (wins, total))| HabitStats {
            tag: tag.to_string(),
            wins,
            total,
            win_rate: math::percentage(wins, total),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Direction, Outcome};
    use rust_decimal_macros::dec;

    fn correlator() -> PsychologyCorrelator {
        PsychologyCorrelator::new(PsychologyThresholds::default())
    }

    fn tagged(n: usize, wins: usize, good: &[&str], bad: &[&str]) -> Vec<Trade> {
        (0..n)
            .map(|i| {
                let outcome = if i < wins { Outcome::Win } else { Outcome::Loss };
                let mut t = Trade::new(format!("t{i}"), "ES", Direction::Long, outcome, dec!(0));
                for g in good {
                    t = t.with_good_habit(*g);
                }
                for b in bad {
                    t = t.with_bad_habit(*b);
                }
                t
            })
            .collect()
    }

    #[test]
    fn test_destructive_habit_takes_priority() {
        let mut trades = tagged(3, 0, &[], &["revenge"]);
        trades.extend(tagged(6, 6, &["patience"], &[]));

        match correlator().assess(&trades) {
            Some(PsychologyFinding::Destructive(h)) => {
                assert_eq!(h.tag, "revenge");
                assert_eq!(h.total, 3);
                assert_eq!(h.win_rate, 0.0);
            }
            other => panic!("expected destructive finding, got {other:?}"),
        }
    }

    #[test]
    fn test_mental_edge_when_no_destructive_habit() {
        let mut trades = tagged(3, 2, &[], &["fomo"]);
        trades.extend(tagged(5, 4, &["patience"], &[]));

        match correlator().assess(&trades) {
            Some(PsychologyFinding::MentalEdge(h)) => assert_eq!(h.tag, "patience"),
            other => panic!("expected mental edge, got {other:?}"),
        }
    }

    #[test]
    fn test_sample_gates() {
        // Two bad-habit trades and four good-habit trades: neither qualifies.
        let mut trades = tagged(2, 0, &[], &["revenge"]);
        trades.extend(tagged(4, 4, &["patience"], &[]));
        let c = correlator();
        let correlation = c.correlate(&trades);
        assert!(c.worst_bad_habit(&correlation).is_none());
        assert!(c.best_good_habit(&correlation).is_none());
        assert!(c.assess(&trades).is_none());
    }

    #[test]
    fn test_correlation_ordering() {
        let mut trades = tagged(4, 1, &["journaling"], &["fomo"]);
        trades.extend(tagged(4, 3, &["checklist"], &["overtrading"]));
        let correlation = correlator().correlate(&trades);
        assert_eq!(correlation.good[0].tag, "checklist");
        assert_eq!(correlation.bad[0].tag, "fomo");
    }
}
