#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use market_mirror::classifier::questionnaire::{
    FEELING_QUESTION, ITEM_QUESTION, NEED_QUESTION, RECENCY_QUESTION, TRIGGER_QUESTION,
};
use market_mirror::classifier::{Answers, TextGenerator};
use market_mirror::errors::{MirrorError, Result};
use market_mirror::models::{Trade, TradeAction, TradeType};

/// Build trades from (reason, profit, emotional) tuples, one minute apart from 09:30.
pub fn make_trades(data: &[(&str, f64, bool)]) -> Vec<Trade> {
    data.iter()
        .enumerate()
        .map(|(i, &(reason, profit, is_emotional))| {
            let kind = if is_emotional {
                TradeType::Emotional
            } else {
                TradeType::Rational
            };
            let action = if i % 2 == 0 {
                TradeAction::Buy
            } else {
                TradeAction::Sell
            };
            Trade::new(
                &format!("09:{:02}", 30 + i),
                action,
                reason,
                profit,
                kind,
                "SPY",
            )
        })
        .collect()
}

/// A session where impulse trades lose and planned trades win.
pub fn disciplined_session() -> Vec<Trade> {
    make_trades(&[
        ("Chasing the breakout", -40.0, true),
        ("Planned entry", 150.0, false),
        ("Take profit at target", 90.0, false),
        ("Stop loss respected", -20.0, false),
    ])
}

/// A session dominated by revenge trading.
pub fn tilted_session() -> Vec<Trade> {
    make_trades(&[
        ("FOMO", -150.0, true),
        ("Revenge after loss", -220.0, true),
        ("Revenge again", -90.0, true),
        ("Plan", 30.0, false),
    ])
}

/// Answers that score well under the default cutoff.
pub fn rational_answers() -> Answers {
    Answers::new()
        .with(ITEM_QUESTION, "Replacement laptop battery")
        .with(FEELING_QUESTION, "Calm")
        .with(RECENCY_QUESTION, "Over a month ago")
        .with(NEED_QUESTION, "9")
        .with(TRIGGER_QUESTION, "Replacing something")
}

/// Answers that hit every emotional signal.
pub fn impulsive_answers() -> Answers {
    Answers::new()
        .with(ITEM_QUESTION, "Designer jacket")
        .with(FEELING_QUESTION, "Impulsive")
        .with(RECENCY_QUESTION, "Just now")
        .with(NEED_QUESTION, "3")
        .with(TRIGGER_QUESTION, "Social media")
}

/// A mock remote model that returns a fixed reply and counts calls.
#[derive(Clone)]
pub struct MockModel {
    reply: std::result::Result<String, u16>,
    calls: Arc<AtomicUsize>,
}

impl MockModel {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for MockModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(prompt.contains("Q1:"), "prompt should carry the questionnaire");
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(MirrorError::Api {
                status: *status,
                body: "mock failure".to_string(),
            }),
        }
    }
}
