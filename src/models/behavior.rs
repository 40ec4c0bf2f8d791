use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DominantBias {
    Overtrading,
    LossAversion,
    Revenge,
    Mixed,
}

impl DominantBias {
    pub fn as_str(&self) -> &'static str {
        match self {
            DominantBias::Overtrading => "overtrading",
            DominantBias::LossAversion => "loss_aversion",
            DominantBias::Revenge => "revenge",
            DominantBias::Mixed => "mixed",
        }
    }

    /// Unknown labels coming back from storage collapse to `Mixed`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "overtrading" => DominantBias::Overtrading,
            "loss_aversion" => DominantBias::LossAversion,
            "revenge" => DominantBias::Revenge,
            _ => DominantBias::Mixed,
        }
    }
}

impl fmt::Display for DominantBias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketCondition {
    Bullish,
    Bearish,
    Volatile,
}

impl MarketCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketCondition::Bullish => "bullish",
            MarketCondition::Bearish => "bearish",
            MarketCondition::Volatile => "volatile",
        }
    }
}

impl fmt::Display for MarketCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
