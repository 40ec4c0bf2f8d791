use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
        }
    }
}

/// Pre-assigned label of what drove a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeType {
    Emotional,
    Rational,
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeType::Emotional => write!(f, "Emotional"),
            TradeType::Rational => write!(f, "Rational"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub time: String,
    pub action: TradeAction,
    pub reason: String,
    pub profit: f64,
    #[serde(rename = "type")]
    pub kind: TradeType,
    #[serde(default)]
    pub ticker: String,
}

impl Trade {
    pub fn new(
        time: &str,
        action: TradeAction,
        reason: &str,
        profit: f64,
        kind: TradeType,
        ticker: &str,
    ) -> Self {
        Self {
            time: time.to_string(),
            action,
            reason: reason.to_string(),
            profit,
            kind,
            ticker: ticker.to_string(),
        }
    }

    pub fn is_emotional(&self) -> bool {
        self.kind == TradeType::Emotional
    }
}
