use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The side a trade was opened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Returns the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "Long"),
            Direction::Short => write!(f, "Short"),
        }
    }
}

impl FromStr for Direction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" | "buy" => Ok(Direction::Long),
            "short" | "sell" => Ok(Direction::Short),
            other => Err(CoreError::InvalidInput(
                "direction".to_string(),
                format!("unknown value '{other}'"),
            )),
        }
    }
}

/// How a closed trade was classified by the trader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    Breakeven,
}

impl Outcome {
    pub fn is_win(&self) -> bool {
        matches!(self, Outcome::Win)
    }

    pub fn is_loss(&self) -> bool {
        matches!(self, Outcome::Loss)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win => write!(f, "Win"),
            Outcome::Loss => write!(f, "Loss"),
            Outcome::Breakeven => write!(f, "Breakeven"),
        }
    }
}

impl FromStr for Outcome {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "win" | "won" => Ok(Outcome::Win),
            "loss" | "lost" | "lose" => Ok(Outcome::Loss),
            "breakeven" | "break_even" | "break-even" | "be" => Ok(Outcome::Breakeven),
            other => Err(CoreError::InvalidInput(
                "outcome".to_string(),
                format!("unknown value '{other}'"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_aliases() {
        assert_eq!("BUY".parse::<Direction>().unwrap(), Direction::Long);
        assert_eq!(" short ".parse::<Direction>().unwrap(), Direction::Short);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_outcome_aliases() {
        assert_eq!("BE".parse::<Outcome>().unwrap(), Outcome::Breakeven);
        assert_eq!("Loss".parse::<Outcome>().unwrap(), Outcome::Loss);
        assert!("maybe".parse::<Outcome>().is_err());
    }
}
