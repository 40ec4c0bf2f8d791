use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use market_mirror::config::Config;
use market_mirror::models::{EvolutionDataPoint, Trade};
use market_mirror::storage::SnapshotRepository;
use market_mirror::trading::{
    analyze_trader_behavior, compute_insights, AnalysisResult, DayReplay, TraderInsights,
};
use market_mirror::trading::replay::timeline;

pub struct SessionReport {
    pub replay: DayReplay,
    pub analysis: AnalysisResult,
    pub saved: bool,
    pub evolution: Vec<EvolutionDataPoint>,
    pub insights: TraderInsights,
}

/// Replays a trading day for one user and records how they behaved.
pub struct MirrorSession {
    repo: SnapshotRepository,
    user_id: String,
}

impl MirrorSession {
    pub fn new(cfg: &Config, user_id: &str) -> Self {
        info!("{}", "=".repeat(60));
        info!("Market Mirror session starting");
        info!(
            "Snapshots: {}",
            if cfg.snowflake.is_some() {
                "Snowflake"
            } else {
                "local storage"
            }
        );
        info!("Data dir: {}", cfg.data_dir);
        info!("{}", "=".repeat(60));

        Self {
            repo: SnapshotRepository::from_config(cfg),
            user_id: user_id.to_string(),
        }
    }

    pub async fn run(&self, trades: &[Trade], notes: Option<String>) -> Result<SessionReport> {
        if trades.is_empty() {
            anyhow::bail!("no trades to replay");
        }

        for line in timeline(trades) {
            info!("  {}", line);
        }

        let replay = DayReplay::from_trades(trades);
        let analysis = analyze_trader_behavior(trades);
        info!("{}", analysis.summary);

        let now = Utc::now();
        let session_id = format!("session_{}", now.timestamp_millis());
        let snapshot = analysis.to_snapshot(&session_id, &now.to_rfc3339(), notes);

        // A failed save does not abort the session.
        let outcome = self.repo.insert_snapshot(&self.user_id, snapshot).await;
        if let Some(err) = &outcome.error {
            warn!("Snapshot not saved: {}", err);
        }

        let evolution = self.repo.get_trader_evolution(&self.user_id).await;
        let insights = compute_insights(&evolution, now);

        Ok(SessionReport {
            replay,
            analysis,
            saved: outcome.success,
            evolution,
            insights,
        })
    }
}
