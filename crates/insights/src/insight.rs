use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsightCategory {
    Direction,
    Session,
    Strategy,
    Psychology,
    Trend,
    Instrument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    Warning,
    Positive,
    Neutral,
}

impl Severity {
    /// Sort rank: lower ranks are shown first.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::Warning => 1,
            Severity::Positive => 2,
            Severity::Neutral => 3,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "Critical"),
            Severity::Warning => write!(f, "Warning"),
            Severity::Positive => write!(f, "Positive"),
            Severity::Neutral => write!(f, "Neutral"),
        }
    }
}

impl fmt::Display for InsightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A templated observation about the trader's recent behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub id: Uuid,
    pub category: InsightCategory,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    /// How much evidence backs the insight, 0-100.
    pub confidence: f64,
    pub actionable: bool,
    pub generated_at: DateTime<Utc>,
}

impl Insight {
    pub fn new(
        category: InsightCategory,
        severity: Severity,
        title: String,
        message: String,
        confidence: f64,
        actionable: bool,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            title,
            message,
            severity,
            confidence: confidence.clamp(0.0, 100.0),
            actionable,
            generated_at,
        }
    }
}
