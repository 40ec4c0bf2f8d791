use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{DominantBias, EvolutionDataPoint};

/// Average discipline delta beyond which a trader leans one way.
const PROFILE_LEAN: f64 = 10.0;
/// First-to-last discipline change that counts as a trend.
const TREND_THRESHOLD: f64 = 5.0;
const RECENT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraderProfileKind {
    Emotional,
    Rational,
    Balanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImprovementTrend {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiasDistribution {
    pub overtrading: usize,
    pub loss_aversion: usize,
    pub revenge: usize,
    pub mixed: usize,
}

impl BiasDistribution {
    fn add(&mut self, bias: DominantBias) {
        match bias {
            DominantBias::Overtrading => self.overtrading += 1,
            DominantBias::LossAversion => self.loss_aversion += 1,
            DominantBias::Revenge => self.revenge += 1,
            DominantBias::Mixed => self.mixed += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraderProfile {
    pub total_sessions: usize,
    pub avg_discipline_delta: f64,
    pub dominant_profile: TraderProfileKind,
    pub improvement_trend: ImprovementTrend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentBehavior {
    pub last_7_days_discipline: f64,
    pub bias_distribution: BiasDistribution,
    /// Emotional trades over all trades, across sessions that report counts.
    pub emotional_trade_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionMetrics {
    pub discipline_improvement: f64,
    pub consistency_score: f64,
    pub behavioral_drift: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraderInsights {
    pub trader_profile: TraderProfile,
    pub recent_behavior: RecentBehavior,
    pub evolution_metrics: EvolutionMetrics,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n > 0 {
        sum / n as f64
    } else {
        0.0
    }
}

fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values.iter().copied());
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

fn most_frequent_bias(points: &[EvolutionDataPoint]) -> Option<DominantBias> {
    let mut counts: HashMap<DominantBias, usize> = HashMap::new();
    for p in points {
        *counts.entry(p.dominant_bias).or_default() += 1;
    }
    let best = counts.values().copied().max()?;
    // Ties go to the bias seen first.
    points
        .iter()
        .map(|p| p.dominant_bias)
        .find(|b| counts[b] == best)
}

/// Summarises a trader's evolution. `points` must be in session order.
pub fn compute_insights(points: &[EvolutionDataPoint], now: DateTime<Utc>) -> TraderInsights {
    let deltas: Vec<f64> = points.iter().map(|p| p.discipline_delta).collect();
    let avg_delta = mean(deltas.iter().copied());

    let dominant_profile = if avg_delta > PROFILE_LEAN {
        TraderProfileKind::Rational
    } else if avg_delta < -PROFILE_LEAN {
        TraderProfileKind::Emotional
    } else {
        TraderProfileKind::Balanced
    };

    let discipline_improvement = match (deltas.first(), deltas.last()) {
        (Some(first), Some(last)) => last - first,
        _ => 0.0,
    };

    let improvement_trend = if discipline_improvement > TREND_THRESHOLD {
        ImprovementTrend::Improving
    } else if discipline_improvement < -TREND_THRESHOLD {
        ImprovementTrend::Declining
    } else {
        ImprovementTrend::Stable
    };

    let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
    let last_7_days_discipline = mean(
        points
            .iter()
            .filter(|p| {
                DateTime::parse_from_rfc3339(&p.timestamp)
                    .map(|t| t.with_timezone(&Utc) >= cutoff)
                    .unwrap_or(false)
            })
            .map(|p| p.discipline_delta),
    );

    let mut bias_distribution = BiasDistribution::default();
    for p in points {
        bias_distribution.add(p.dominant_bias);
    }

    let (emotional_trades, all_trades) = points
        .iter()
        .filter_map(|p| Some((p.trade_count_emotional?, p.trade_count_rational?)))
        .fold((0usize, 0usize), |(e, n), (pe, pr)| (e + pe, n + pe + pr));
    let emotional_trade_ratio = if all_trades > 0 {
        emotional_trades as f64 / all_trades as f64
    } else {
        0.0
    };

    let consistency_score = (100.0 - std_dev(&deltas)).clamp(0.0, 100.0);

    let behavioral_drift = match (points.last(), most_frequent_bias(points)) {
        (Some(latest), Some(usual)) => latest.dominant_bias != usual,
        _ => false,
    };

    TraderInsights {
        trader_profile: TraderProfile {
            total_sessions: points.len(),
            avg_discipline_delta: avg_delta,
            dominant_profile,
            improvement_trend,
        },
        recent_behavior: RecentBehavior {
            last_7_days_discipline,
            bias_distribution,
            emotional_trade_ratio,
        },
        evolution_metrics: EvolutionMetrics {
            discipline_improvement,
            consistency_score,
            behavioral_drift,
        },
    }
}
