//! Terminal rendering for the `context` and `insights` commands.

use analytics::SegmentStats;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use context::TradingContext;
use insights::Insight;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn performance_table(ctx: &TradingContext) -> Table {
    let p = &ctx.performance;
    let r = &ctx.risk;
    let mut table = new_table(vec!["Metric", "Value"]);
    table.add_row(vec!["Trades".to_string(), p.total_trades.to_string()]);
    table.add_row(vec!["Win Rate".to_string(), format!("{:.1}%", p.win_rate)]);
    table.add_row(vec!["Total P&L".to_string(), format!("{:.2}", p.total_pnl)]);
    table.add_row(vec!["Average P&L".to_string(), format!("{:.2}", p.avg_pnl)]);
    table.add_row(vec!["Profit Factor".to_string(), format!("{:.2}", p.profit_factor)]);
    table.add_row(vec!["Payoff Ratio".to_string(), format!("{:.2}", p.payoff_ratio)]);
    table.add_row(vec!["Max Drawdown".to_string(), format!("{:.2}", p.max_drawdown)]);
    table.add_row(vec!["Sharpe Ratio".to_string(), format!("{:.2}", p.sharpe_ratio)]);
    table.add_row(vec!["Stop Loss Usage".to_string(), format!("{:.0}%", r.stop_loss_usage)]);
    table.add_row(vec!["Reward / Risk".to_string(), format!("{:.2}", r.risk_reward_ratio)]);
    table.add_row(vec!["Max Losses in a Row".to_string(), r.max_consecutive_losses.to_string()]);
    table.add_row(vec!["Risk Score".to_string(), format!("{:.0}/100", r.risk_score)]);
    table.add_row(vec![
        "Suggested Risk".to_string(),
        format!("{:.1}% per trade", r.kelly.recommended_risk_percent),
    ]);
    table
}

pub fn segments_table(segments: &[SegmentStats]) -> Table {
    let mut table = new_table(vec!["Segment", "Trades", "Win Rate", "Total P&L", "Avg P&L"]);
    for s in segments {
        table.add_row(vec![
            s.label.clone(),
            s.trades.to_string(),
            format!("{:.1}%", s.win_rate),
            format!("{:.2}", s.total_pnl),
            format!("{:.2}", s.avg_pnl),
        ]);
    }
    table
}

pub fn insights_table(insights: &[Insight]) -> Table {
    let mut table = new_table(vec!["Severity", "Category", "Insight", "Confidence", "Action"]);
    for i in insights {
        table.add_row(vec![
            i.severity.to_string(),
            i.category.to_string(),
            format!("{}\n{}", i.title, i.message),
            format!("{:.0}%", i.confidence),
            if i.actionable { "yes" } else { "" }.to_string(),
        ]);
    }
    table
}

pub fn print_context(ctx: &TradingContext) {
    println!("Trading context as of {}", ctx.as_of.format("%Y-%m-%d %H:%M UTC"));
    println!("{}", performance_table(ctx));

    let sections = [
        ("Direction", &ctx.patterns.directions),
        ("Top Setups", &ctx.patterns.top_setups),
        ("Bottom Setups", &ctx.patterns.bottom_setups),
        ("Instruments", &ctx.patterns.instruments),
        ("Sessions", &ctx.patterns.time.sessions),
    ];
    for (title, segments) in sections {
        if !segments.is_empty() {
            println!("\n{title}");
            println!("{}", segments_table(segments));
        }
    }

    for (title, items) in [
        ("Strengths", &ctx.strengths),
        ("Weaknesses", &ctx.weaknesses),
        ("Recommendations", &ctx.recommendations),
    ] {
        if !items.is_empty() {
            println!("\n{title}");
            for item in items {
                println!("  - {item}");
            }
        }
    }
}
