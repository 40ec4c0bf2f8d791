use serde::{Deserialize, Serialize};

use crate::models::{BehavioralSnapshot, DominantBias, MarketCondition, Trade, TradeType};

/// Net session profit above which the market reads as bullish.
const BULLISH_ABOVE: f64 = 0.0;
/// Net session profit below which the market reads as bearish.
const BEARISH_BELOW: f64 = -200.0;
/// Assumed time spent per trade; real session timing is not tracked.
const MINUTES_PER_TRADE: u32 = 5;
const MAX_SCORE: f64 = 100.0;

const OVERTRADING_MARKERS: &[&str] = &["fomo", "chasing"];
const LOSS_AVERSION_MARKERS: &[&str] = &["panic", "fear"];
const REVENGE_MARKERS: &[&str] = &["revenge"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiasCounts {
    pub overtrading: usize,
    pub loss_aversion: usize,
    pub revenge: usize,
}

impl BiasCounts {
    pub fn from_trades<'a>(emotional: impl IntoIterator<Item = &'a Trade>) -> Self {
        let mut counts = Self::default();
        for trade in emotional {
            let reason = trade.reason.to_lowercase();
            let hit = |markers: &[&str]| markers.iter().any(|m| reason.contains(m));
            if hit(OVERTRADING_MARKERS) {
                counts.overtrading += 1;
            }
            if hit(LOSS_AVERSION_MARKERS) {
                counts.loss_aversion += 1;
            }
            if hit(REVENGE_MARKERS) {
                counts.revenge += 1;
            }
        }
        counts
    }

    /// The single strictly-highest counter, or `Mixed` on any tie at the top
    /// (including all zero).
    pub fn dominant(&self) -> DominantBias {
        let ranked = [
            (DominantBias::Overtrading, self.overtrading),
            (DominantBias::LossAversion, self.loss_aversion),
            (DominantBias::Revenge, self.revenge),
        ];
        let max = ranked.iter().map(|(_, n)| *n).max().unwrap_or(0);
        if max == 0 {
            return DominantBias::Mixed;
        }
        let mut leaders = ranked.iter().filter(|(_, n)| *n == max);
        match (leaders.next(), leaders.next()) {
            (Some((bias, _)), None) => *bias,
            _ => DominantBias::Mixed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub emotional_score: f64,
    pub rational_score: f64,
    pub dominant_bias: DominantBias,
    pub bias_counts: BiasCounts,
    pub emotional_trades: Vec<Trade>,
    pub rational_trades: Vec<Trade>,
    pub total_profit: f64,
    pub market_condition: MarketCondition,
    pub duration_minutes: u32,
    pub summary: String,
}

impl AnalysisResult {
    pub fn trade_count(&self) -> usize {
        self.emotional_trades.len() + self.rational_trades.len()
    }

    /// Gap between the rational and emotional halves of the session.
    pub fn discipline_delta(&self) -> f64 {
        self.rational_score - self.emotional_score
    }

    pub fn to_snapshot(
        &self,
        session_id: &str,
        timestamp: &str,
        notes: Option<String>,
    ) -> BehavioralSnapshot {
        BehavioralSnapshot {
            session_id: session_id.to_string(),
            timestamp: timestamp.to_string(),
            emotional_self_score: self.emotional_score,
            rational_self_score: self.rational_score,
            discipline_delta: self.discipline_delta(),
            dominant_bias: self.dominant_bias,
            trade_count_emotional: self.emotional_trades.len(),
            trade_count_rational: self.rational_trades.len(),
            market_condition: Some(self.market_condition.to_string()),
            session_duration_minutes: Some(self.duration_minutes),
            notes,
        }
    }
}

pub fn market_condition(total_profit: f64) -> MarketCondition {
    if total_profit > BULLISH_ABOVE {
        MarketCondition::Bullish
    } else if total_profit < BEARISH_BELOW {
        MarketCondition::Bearish
    } else {
        MarketCondition::Volatile
    }
}

/// `min(100, share * 100 + avg / 10)`, where `avg` is the summed magnitude
/// spread over every trade on that side, contributing or not. Empty sides
/// score 0.
fn side_score(side_len: usize, all_len: usize, magnitude_sum: f64) -> f64 {
    if side_len == 0 || all_len == 0 {
        return 0.0;
    }
    let share = side_len as f64 / all_len as f64;
    let avg = magnitude_sum / side_len as f64;
    (share * MAX_SCORE + avg / 10.0).min(MAX_SCORE)
}

pub fn analyze_trader_behavior(trades: &[Trade]) -> AnalysisResult {
    let (emotional, rational): (Vec<Trade>, Vec<Trade>) = trades
        .iter()
        .cloned()
        .partition(|t| t.kind == TradeType::Emotional);

    let loss_sum: f64 = emotional
        .iter()
        .filter(|t| t.profit < 0.0)
        .map(|t| t.profit.abs())
        .sum();
    let gain_sum: f64 = rational
        .iter()
        .filter(|t| t.profit > 0.0)
        .map(|t| t.profit)
        .sum();

    let emotional_score = side_score(emotional.len(), trades.len(), loss_sum);
    let rational_score = side_score(rational.len(), trades.len(), gain_sum);

    let bias_counts = BiasCounts::from_trades(&emotional);
    let dominant_bias = bias_counts.dominant();

    let total_profit: f64 = trades.iter().map(|t| t.profit).sum();
    let duration_minutes = trades.len() as u32 * MINUTES_PER_TRADE;

    let summary = format!(
        "{} emotional trades, {} rational trades. Bias: {}",
        emotional.len(),
        rational.len(),
        dominant_bias
    );

    AnalysisResult {
        emotional_score,
        rational_score,
        dominant_bias,
        bias_counts,
        emotional_trades: emotional,
        rational_trades: rational,
        total_profit,
        market_condition: market_condition(total_profit),
        duration_minutes,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{emotional, rational};

    #[test]
    fn reference_session() {
        let trades = vec![
            emotional("FOMO", -120.0),
            emotional("Panic", -80.0),
            rational("Strategy", 300.0),
            rational("Plan", 180.0),
        ];
        let result = analyze_trader_behavior(&trades);

        assert_eq!(result.emotional_trades.len(), 2);
        assert_eq!(result.rational_trades.len(), 2);
        assert_eq!(result.total_profit, 280.0);
        assert_eq!(result.market_condition, MarketCondition::Bullish);
        assert_eq!(
            result.bias_counts,
            BiasCounts {
                overtrading: 1,
                loss_aversion: 1,
                revenge: 0
            }
        );
        assert_eq!(result.dominant_bias, DominantBias::Mixed);
        // 50 + (200 / 2) / 10
        assert!((result.emotional_score - 60.0).abs() < 1e-9);
        // 50 + (480 / 2) / 10
        assert!((result.rational_score - 74.0).abs() < 1e-9);
        assert_eq!(result.duration_minutes, 20);
        assert_eq!(
            result.summary,
            "2 emotional trades, 2 rational trades. Bias: mixed"
        );
    }

    #[test]
    fn no_emotional_trades_scores_zero() {
        let trades = vec![rational("Plan", 100.0), rational("Setup", -50.0)];
        let result = analyze_trader_behavior(&trades);
        assert_eq!(result.emotional_score, 0.0);
        assert!(!result.emotional_score.is_nan());
        // 100 + (100 / 2) / 10, capped
        assert_eq!(result.rational_score, 100.0);
        assert_eq!(result.dominant_bias, DominantBias::Mixed);
    }

    #[test]
    fn empty_session_is_all_zero() {
        let result = analyze_trader_behavior(&[]);
        assert_eq!(result.emotional_score, 0.0);
        assert_eq!(result.rational_score, 0.0);
        assert_eq!(result.duration_minutes, 0);
        assert_eq!(result.market_condition, MarketCondition::Volatile);
        assert_eq!(result.dominant_bias, DominantBias::Mixed);
    }

    #[test]
    fn emotional_gains_do_not_offset_losses() {
        let trades = vec![
            emotional("FOMO", -100.0),
            emotional("Chasing", 300.0),
            rational("Plan", 0.0),
            rational("Setup", 0.0),
        ];
        let result = analyze_trader_behavior(&trades);
        // 50 + (100 / 2) / 10
        assert!((result.emotional_score - 55.0).abs() < 1e-9);
        assert_eq!(result.rational_score, 50.0);
        assert_eq!(result.dominant_bias, DominantBias::Overtrading);
    }

    #[test]
    fn averages_spread_over_whole_side() {
        let trades = vec![
            emotional("FOMO", -100.0),
            emotional("Chasing", 300.0),
            rational("Plan", 150.0),
            rational("Target", 90.0),
            rational("Stop", -20.0),
        ];
        let result = analyze_trader_behavior(&trades);
        // 40 + (100 / 2) / 10
        assert!((result.emotional_score - 45.0).abs() < 1e-9);
        // 60 + (240 / 3) / 10
        assert!((result.rational_score - 68.0).abs() < 1e-9);
    }

    #[test]
    fn score_is_capped() {
        let trades = vec![emotional("panic", -5000.0)];
        let result = analyze_trader_behavior(&trades);
        assert_eq!(result.emotional_score, 100.0);
        assert_eq!(result.rational_score, 0.0);
    }

    #[test]
    fn single_leader_wins_bias() {
        let trades = vec![
            emotional("Revenge after loss", -50.0),
            emotional("revenge again", -20.0),
            emotional("Fear of missing out", -10.0),
        ];
        assert_eq!(analyze_trader_behavior(&trades).dominant_bias, DominantBias::Revenge);
    }

    #[test]
    fn any_tie_at_the_top_is_mixed() {
        let two_way = BiasCounts {
            overtrading: 0,
            loss_aversion: 2,
            revenge: 2,
        };
        assert_eq!(two_way.dominant(), DominantBias::Mixed);

        let three_way = BiasCounts {
            overtrading: 1,
            loss_aversion: 1,
            revenge: 1,
        };
        assert_eq!(three_way.dominant(), DominantBias::Mixed);

        let lower_tie = BiasCounts {
            overtrading: 3,
            loss_aversion: 1,
            revenge: 1,
        };
        assert_eq!(lower_tie.dominant(), DominantBias::Overtrading);
    }

    #[test]
    fn rational_reasons_are_ignored_for_bias() {
        let trades = vec![rational("fomo-proof plan", 20.0), emotional("panic", -10.0)];
        assert_eq!(
            analyze_trader_behavior(&trades).dominant_bias,
            DominantBias::LossAversion
        );
    }

    #[test]
    fn one_reason_can_hit_several_markers() {
        let counts = BiasCounts::from_trades(&[emotional("Panic revenge after FOMO", -1.0)]);
        assert_eq!(counts.overtrading, 1);
        assert_eq!(counts.loss_aversion, 1);
        assert_eq!(counts.revenge, 1);
        assert_eq!(counts.dominant(), DominantBias::Mixed);
    }

    #[test]
    fn market_condition_boundaries() {
        assert_eq!(market_condition(0.0), MarketCondition::Volatile);
        assert_eq!(market_condition(0.01), MarketCondition::Bullish);
        assert_eq!(market_condition(-200.0), MarketCondition::Volatile);
        assert_eq!(market_condition(-200.01), MarketCondition::Bearish);
    }

    #[test]
    fn snapshot_carries_discipline_delta() {
        let trades = vec![emotional("FOMO", -120.0), rational("Plan", 180.0)];
        let result = analyze_trader_behavior(&trades);
        let snap = result.to_snapshot("s-1", "2024-01-15T12:00:00Z", Some("note".into()));
        assert_eq!(snap.trade_count_emotional, 1);
        assert_eq!(snap.trade_count_rational, 1);
        assert_eq!(snap.discipline_delta, result.rational_score - result.emotional_score);
        assert_eq!(snap.market_condition.as_deref(), Some("bullish"));
        assert_eq!(snap.session_duration_minutes, Some(10));
        assert_eq!(snap.notes.as_deref(), Some("note"));
    }
}
