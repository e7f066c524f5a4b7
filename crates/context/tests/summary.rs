use chrono::{TimeDelta, TimeZone, Utc};
use configuration::AnalysisConfig;
use context::{FIRST_TRADE_RECOMMENDATION, TradingContextBuilder};
use core_types::{Direction, Outcome, Trade};
use rust_decimal_macros::dec;

fn journal() -> Vec<Trade> {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
    (0..12)
        .map(|i| {
            let (outcome, pnl, exit) = if i % 3 == 2 {
                (Outcome::Loss, dec!(-50), dec!(99))
            } else {
                (Outcome::Win, dec!(120), dec!(103))
            };
            Trade::new(format!("t{i}"), "NQ", Direction::Long, outcome, pnl)
                .with_executed_at(start + TimeDelta::days(i))
                .with_prices(dec!(100), exit, Some(dec!(99)))
                .with_setup("Opening Drive")
        })
        .collect()
}

#[test]
fn test_summary_mentions_every_section() {
    let as_of = Utc.with_ymd_and_hms(2024, 5, 20, 0, 0, 0).unwrap();
    let builder = TradingContextBuilder::new(&AnalysisConfig::default()).unwrap();
    let ctx = builder.build(&journal(), &[], as_of);
    let text = ctx.summary();

    assert!(text.starts_with("Trading context as of 2024-05-20 00:00 UTC"));
    assert!(text.contains("Performance: 12 trades"));
    assert!(text.contains("Risk: score"));
    assert!(text.contains("Top setups:\n  - Opening Drive: 12 trades"));
    assert!(text.contains("Strengths:"));
    assert!(text.contains("Recommendations:"));
    assert!(!text.contains(FIRST_TRADE_RECOMMENDATION));
}

#[test]
fn test_context_serializes_for_downstream_consumers() {
    let as_of = Utc.with_ymd_and_hms(2024, 5, 20, 0, 0, 0).unwrap();
    let builder = TradingContextBuilder::new(&AnalysisConfig::default()).unwrap();
    let ctx = builder.build(&journal(), &[], as_of);

    let json = serde_json::to_value(&ctx).unwrap();
    assert_eq!(json["performance"]["total_trades"], 12);
    assert_eq!(json["risk"]["stop_loss_usage"], 100.0);
    assert!(json["strengths"].as_array().is_some_and(|s| !s.is_empty()));
}

#[test]
fn test_empty_journal_summary() {
    let as_of = Utc.with_ymd_and_hms(2024, 5, 20, 0, 0, 0).unwrap();
    let builder = TradingContextBuilder::new(&AnalysisConfig::default()).unwrap();
    let ctx = builder.build(&[], &[], as_of);

    assert!(ctx.summary().contains(&format!("Recommendations:\n  - {FIRST_TRADE_RECOMMENDATION}")));
}
