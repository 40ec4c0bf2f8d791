use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionType {
    Emotional,
    Rational,
}

impl DecisionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionType::Emotional => "emotional",
            DecisionType::Rational => "rational",
        }
    }
}

impl fmt::Display for DecisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a classification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationSource {
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(rename = "type")]
    pub decision: DecisionType,
    pub score: f64,
    #[serde(default)]
    pub reasoning: Option<String>,
    pub source: ClassificationSource,
}

impl Classification {
    pub fn is_emotional(&self) -> bool {
        self.decision == DecisionType::Emotional
    }
}
