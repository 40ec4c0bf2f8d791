use serde::{Deserialize, Serialize};

use crate::models::{Trade, TradeAction, TradeType};

pub const RATIONAL_BADGE: &str = "Rational Trader of the Day";

const RATIONAL_TIP: &str = "Today, your Rational self performed better. Consider planning trades in advance to avoid emotional decisions.";
const EMOTIONAL_TIP: &str = "Your Emotional self kept pace today, but that rarely lasts. Write down your entry and exit rules before the next session.";

/// The fixed demo trading day.
pub fn sample_trading_day() -> Vec<Trade> {
    vec![
        Trade::new("09:31", TradeAction::Buy, "FOMO", -120.0, TradeType::Emotional, "TSLA"),
        Trade::new("09:45", TradeAction::Sell, "Fear", -80.0, TradeType::Emotional, "TSLA"),
        Trade::new("10:30", TradeAction::Buy, "Strategy", 300.0, TradeType::Rational, "AAPL"),
        Trade::new("11:15", TradeAction::Sell, "Plan", 180.0, TradeType::Rational, "AAPL"),
    ]
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SideSummary {
    pub trades: usize,
    pub pnl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayReplay {
    pub emotional: SideSummary,
    pub rational: SideSummary,
}

impl DayReplay {
    pub fn from_trades(trades: &[Trade]) -> Self {
        let mut emotional = SideSummary::default();
        let mut rational = SideSummary::default();
        for t in trades {
            let side = match t.kind {
                TradeType::Emotional => &mut emotional,
                TradeType::Rational => &mut rational,
            };
            side.trades += 1;
            side.pnl += t.profit;
        }
        Self {
            emotional,
            rational,
        }
    }

    pub fn rational_won(&self) -> bool {
        self.rational.pnl > self.emotional.pnl
    }

    pub fn verdict(&self) -> Option<&'static str> {
        if self.emotional.pnl < 0.0 && self.rational_won() {
            Some("You lost to yourself.")
        } else {
            None
        }
    }

    pub fn coaching_tip(&self) -> &'static str {
        if self.rational_won() {
            RATIONAL_TIP
        } else {
            EMOTIONAL_TIP
        }
    }

    pub fn badge(&self) -> Option<&'static str> {
        self.rational_won().then_some(RATIONAL_BADGE)
    }
}

/// One line per trade, as shown on the replay timeline.
pub fn timeline(trades: &[Trade]) -> Vec<String> {
    trades
        .iter()
        .map(|t| {
            format!(
                "{} | {} {} | {} | {:+.0} [{}]",
                t.time, t.action, t.ticker, t.reason, t.profit, t.kind
            )
        })
        .collect()
}
