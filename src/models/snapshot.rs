use serde::{Deserialize, Serialize};

use crate::models::DominantBias;

/// One analyzed trading session, as handed to the snapshot repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralSnapshot {
    pub session_id: String,
    pub timestamp: String,
    pub emotional_self_score: f64,
    pub rational_self_score: f64,
    pub discipline_delta: f64,
    pub dominant_bias: DominantBias,
    pub trade_count_emotional: usize,
    pub trade_count_rational: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A snapshot as it sits in storage: keyed by the pseudonymous trader hash.
/// Records are only ever appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSnapshot {
    #[serde(flatten)]
    pub snapshot: BehavioralSnapshot,
    pub trader_hash: String,
    #[serde(default)]
    pub app_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionDataPoint {
    pub session_number: u32,
    pub timestamp: String,
    pub emotional_score: f64,
    pub rational_score: f64,
    pub discipline_delta: f64,
    pub discipline_improvement: Option<f64>,
    pub dominant_bias: DominantBias,
    /// Per-session trade counts; absent when the source row does not carry them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_count_emotional: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_count_rational: Option<usize>,
}

/// Result of a best-effort snapshot write. Failures are reported, never raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InsertOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}
