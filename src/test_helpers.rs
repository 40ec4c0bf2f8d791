use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::classifier::questionnaire::{
    Answers, FEELING_QUESTION, ITEM_QUESTION, NEED_QUESTION, RECENCY_QUESTION, TRIGGER_QUESTION,
};
use crate::classifier::TextGenerator;
use crate::errors::{MirrorError, Result};
use crate::models::{
    BehavioralSnapshot, DominantBias, EvolutionDataPoint, StoredSnapshot, Trade, TradeAction,
    TradeType,
};
use crate::storage::snapshots::evolution_from_snapshots;
use crate::storage::SnapshotWarehouse;

/// An emotional BUY with the given trigger and profit.
pub fn emotional(reason: &str, profit: f64) -> Trade {
    Trade::new("09:30", TradeAction::Buy, reason, profit, TradeType::Emotional, "TEST")
}

/// A rational SELL with the given reason and profit.
pub fn rational(reason: &str, profit: f64) -> Trade {
    Trade::new("10:30", TradeAction::Sell, reason, profit, TradeType::Rational, "TEST")
}

/// Answers scoring 3 + 3 + 2 + 3 = 11.
pub fn emotional_answers() -> Answers {
    Answers::new()
        .with(ITEM_QUESTION, "Limited edition sneakers")
        .with(FEELING_QUESTION, "Excited")
        .with(RECENCY_QUESTION, "Just now")
        .with(NEED_QUESTION, "2")
        .with(TRIGGER_QUESTION, "Saw an ad")
}

pub fn make_snapshot(session_id: &str, emotional: f64, rational: f64) -> BehavioralSnapshot {
    BehavioralSnapshot {
        session_id: session_id.to_string(),
        timestamp: "2024-01-15T12:00:00Z".to_string(),
        emotional_self_score: emotional,
        rational_self_score: rational,
        discipline_delta: rational - emotional,
        dominant_bias: DominantBias::Mixed,
        trade_count_emotional: 1,
        trade_count_rational: 1,
        market_condition: Some("volatile".to_string()),
        session_duration_minutes: Some(10),
        notes: None,
    }
}

/// A text generator that replays one canned reply, or always fails.
pub struct CannedGenerator {
    reply: Option<String>,
}

impl CannedGenerator {
    pub fn reply(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { reply: None }
    }
}

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.reply.clone().ok_or(MirrorError::Api {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

/// In-memory warehouse that records inserts, or fails every call with an API status.
#[derive(Clone, Default)]
pub struct MockWarehouse {
    rows: Arc<Mutex<Vec<StoredSnapshot>>>,
    fetches: Arc<AtomicUsize>,
    fail_status: Option<u16>,
}

impl MockWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_status: Some(status),
            ..Self::default()
        }
    }

    pub async fn inserted(&self) -> Vec<StoredSnapshot> {
        self.rows.lock().await.clone()
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        match self.fail_status {
            Some(status) => Err(MirrorError::Api {
                status,
                body: "warehouse unavailable".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SnapshotWarehouse for MockWarehouse {
    async fn insert_snapshot(&self, stored: &StoredSnapshot) -> Result<()> {
        self.check()?;
        self.rows.lock().await.push(stored.clone());
        Ok(())
    }

    async fn fetch_evolution(&self, trader_hash: &str) -> Result<Vec<EvolutionDataPoint>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mine: Vec<StoredSnapshot> = self
            .rows
            .lock()
            .await
            .iter()
            .filter(|s| s.trader_hash == trader_hash)
            .cloned()
            .collect();
        Ok(evolution_from_snapshots(&mine))
    }
}
