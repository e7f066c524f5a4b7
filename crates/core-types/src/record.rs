//! Boundary schema for journal exports.
//!
//! Journals store trades loosely: dates as free-form strings, enums in whatever
//! casing the UI produced, and most numeric fields optional. `TradeRecord` mirrors
//! that shape and `Trade::try_from` turns it into the strict `Trade` once.

use crate::enums::{Direction, Outcome};
use crate::error::CoreError;
use crate::structs::Trade;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// A trade exactly as a journal export delivers it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradeRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(alias = "instrument", alias = "pair", default)]
    pub symbol: String,
    #[serde(default)]
    pub direction: String,
    #[serde(default)]
    pub entry_price: Option<Decimal>,
    #[serde(default)]
    pub exit_price: Option<Decimal>,
    #[serde(default)]
    pub stop_loss: Option<Decimal>,
    #[serde(default)]
    pub take_profit: Option<Decimal>,
    #[serde(alias = "quantity", alias = "lot_size", default)]
    pub size: Option<Decimal>,
    #[serde(default)]
    pub outcome: String,
    #[serde(default)]
    pub pnl: Option<Decimal>,
    #[serde(default)]
    pub setup_name: Option<String>,
    #[serde(default)]
    pub bad_habits: Vec<String>,
    #[serde(default)]
    pub good_habits: Vec<String>,
    #[serde(alias = "strategy", default)]
    pub strategy_id: Option<String>,
    #[serde(default)]
    pub session: Option<String>,
}

/// A record that failed validation, kept so callers can report it.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    /// Position of the record in the input batch.
    pub index: usize,
    pub id: String,
    pub error: CoreError,
}

impl TryFrom<TradeRecord> for Trade {
    type Error = CoreError;

    fn try_from(record: TradeRecord) -> Result<Self, Self::Error> {
        let id = record.id.trim().to_string();
        if id.is_empty() {
            return Err(CoreError::MissingField("id".to_string()));
        }
        let symbol = record.symbol.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return Err(CoreError::MissingField("symbol".to_string()));
        }

        let direction: Direction = record.direction.parse()?;
        let outcome: Outcome = record.outcome.parse()?;

        let entry_price = non_negative("entry_price", record.entry_price)?;
        let exit_price = non_negative("exit_price", record.exit_price)?;
        let size = non_negative("size", record.size)?;

        let executed_at = match record.date.as_deref() {
            Some(date) => {
                let parsed = parse_timestamp(date, record.time.as_deref());
                if parsed.is_none() {
                    tracing::warn!(trade_id = %id, date, "Unparseable trade date; keeping trade as undated.");
                }
                parsed
            }
            None => None,
        };

        let trade = Trade {
            id,
            executed_at,
            symbol,
            direction,
            entry_price,
            exit_price,
            stop_loss: record.stop_loss.filter(|sl| !sl.is_zero()),
            take_profit: record.take_profit.filter(|tp| !tp.is_zero()),
            size,
            outcome,
            pnl: record.pnl.unwrap_or_default(),
            setup_name: clean_optional(record.setup_name),
            bad_habits: clean_tags(record.bad_habits),
            good_habits: clean_tags(record.good_habits),
            strategy_id: clean_optional(record.strategy_id),
            session: clean_optional(record.session),
        };

        if !trade.pnl_agrees_with_outcome() {
            tracing::debug!(
                trade_id = %trade.id,
                pnl = %trade.pnl,
                outcome = %trade.outcome,
                "Trade pnl sign disagrees with its outcome."
            );
        }

        Ok(trade)
    }
}

/// Converts a batch of records, collecting failures instead of aborting.
pub fn parse_records(records: Vec<TradeRecord>) -> (Vec<Trade>, Vec<RejectedRecord>) {
    let mut trades = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();

    for (index, record) in records.into_iter().enumerate() {
        let id = record.id.clone();
        match Trade::try_from(record) {
            Ok(trade) => trades.push(trade),
            Err(error) => {
                tracing::warn!(index, trade_id = %id, error = %error, "Rejected trade record.");
                rejected.push(RejectedRecord { index, id, error });
            }
        }
    }

    (trades, rejected)
}

/// Parses a journal date with an optional separate time-of-day.
///
/// Date-only values resolve to midnight UTC unless `time` is given.
pub fn parse_timestamp(date: &str, time: Option<&str>) -> Option<DateTime<Utc>> {
    let date = date.trim();
    let base = DateTime::parse_from_rfc3339(date)
        .map(|dt| dt.with_timezone(&Utc).naive_utc())
        .ok()
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(date, fmt).ok())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })?;

    let with_time = match time.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => match TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(t, fmt).ok())
        {
            Some(tod) => base.date().and_time(tod),
            None => base,
        },
        None => base,
    };

    Some(with_time.and_utc())
}

fn non_negative(field: &str, value: Option<Decimal>) -> Result<Decimal, CoreError> {
    let value = value.unwrap_or_default();
    if value.is_sign_negative() && !value.is_zero() {
        return Err(CoreError::InvalidInput(
            field.to_string(),
            format!("must not be negative, got {value}"),
        ));
    }
    Ok(value)
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_tags(tags: Vec<String>) -> BTreeSet<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use rust_decimal_macros::dec;

    fn record() -> TradeRecord {
        TradeRecord {
            id: "t-1".to_string(),
            date: Some("2024-03-05".to_string()),
            time: Some("14:30".to_string()),
            symbol: " eurusd ".to_string(),
            direction: "buy".to_string(),
            entry_price: Some(dec!(1.0850)),
            exit_price: Some(dec!(1.0900)),
            stop_loss: Some(dec!(1.0820)),
            outcome: "win".to_string(),
            pnl: Some(dec!(50)),
            bad_habits: vec!["  fomo ".to_string(), "".to_string(), "fomo".to_string()],
            ..TradeRecord::default()
        }
    }

    #[test]
    fn test_valid_record_is_normalized() {
        let trade = Trade::try_from(record()).unwrap();
        assert_eq!(trade.symbol, "EURUSD");
        assert_eq!(trade.direction, Direction::Long);
        assert_eq!(trade.executed_at.unwrap().hour(), 14);
        assert_eq!(trade.bad_habits.len(), 1);
        assert!(trade.bad_habits.contains("fomo"));
        assert!(trade.has_stop_loss());
    }

    #[test]
    fn test_unparseable_date_keeps_trade() {
        let mut r = record();
        r.date = Some("last tuesday".to_string());
        let trade = Trade::try_from(r).unwrap();
        assert!(trade.executed_at.is_none());
    }

    #[test]
    fn test_rejects_negative_prices_and_unknown_enums() {
        let mut r = record();
        r.entry_price = Some(dec!(-1));
        assert!(matches!(Trade::try_from(r), Err(CoreError::InvalidInput(..))));

        let mut r = record();
        r.outcome = "pending".to_string();
        assert!(Trade::try_from(r).is_err());
    }

    #[test]
    fn test_parse_records_collects_rejections() {
        let mut bad = record();
        bad.symbol = String::new();
        let (trades, rejected) = parse_records(vec![record(), bad]);
        assert_eq!(trades.len(), 1);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].index, 1);
        assert_eq!(rejected[0].error, CoreError::MissingField("symbol".to_string()));
    }

    #[test]
    fn test_timestamp_formats() {
        assert!(parse_timestamp("2024-03-05T09:15:00Z", None).is_some());
        assert!(parse_timestamp("2024-03-05 09:15", None).is_some());
        let ts = parse_timestamp("2024-03-05T09:15:00+02:00", None).unwrap();
        assert_eq!(ts.hour(), 7);
        assert!(parse_timestamp("05/03/2024", None).is_none());
    }

    #[test]
    fn test_deserializes_loose_json() {
        let json = r#"{
            "id": "abc",
            "date": "2024-01-02 10:00:00",
            "instrument": "nq",
            "direction": "Short",
            "entry_price": 17000.25,
            "exit_price": "16950.25",
            "outcome": "WIN",
            "pnl": 1000
        }"#;
        let record: TradeRecord = serde_json::from_str(json).unwrap();
        let trade = Trade::try_from(record).unwrap();
        assert_eq!(trade.symbol, "NQ");
        assert_eq!(trade.pnl, dec!(1000));
        assert_eq!(trade.exit_price, dec!(16950.25));
        assert!(trade.stop_loss.is_none());
    }
}
