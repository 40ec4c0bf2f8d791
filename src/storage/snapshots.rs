use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::{Config, APP_VERSION};
use crate::errors::Result;
use crate::models::{BehavioralSnapshot, EvolutionDataPoint, InsertOutcome, StoredSnapshot};
use crate::storage::{trader_hash, FileStore, KeyValueStore, SnapshotWarehouse, SnowflakeClient};

/// Local key holding the JSON array of every stored snapshot.
pub const SNAPSHOTS_KEY: &str = "behavioral_snapshots";

/// Append-only snapshot storage: the remote warehouse when configured, the
/// local key/value store otherwise.
pub struct SnapshotRepository {
    local: Box<dyn KeyValueStore>,
    remote: Option<Box<dyn SnapshotWarehouse>>,
}

impl SnapshotRepository {
    pub fn new(local: Box<dyn KeyValueStore>, remote: Option<Box<dyn SnapshotWarehouse>>) -> Self {
        Self { local, remote }
    }

    pub fn local_only(local: Box<dyn KeyValueStore>) -> Self {
        Self::new(local, None)
    }

    pub fn from_config(cfg: &Config) -> Self {
        let remote = cfg.snowflake.as_ref().and_then(|sf| match SnowflakeClient::new(sf) {
            Ok(client) => Some(Box::new(client) as Box<dyn SnapshotWarehouse>),
            Err(e) => {
                warn!("Snowflake client unavailable, storing locally: {}", e);
                None
            }
        });
        Self::new(Box::new(FileStore::new(&cfg.data_dir)), remote)
    }

    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Best-effort write. Failures come back in the outcome and are logged.
    pub async fn insert_snapshot(&self, user_id: &str, snapshot: BehavioralSnapshot) -> InsertOutcome {
        let stored = StoredSnapshot {
            snapshot,
            trader_hash: trader_hash(user_id),
            app_version: APP_VERSION.to_string(),
        };

        info!(
            "Saving behavioral snapshot: trader={} emotional={:.1} rational={:.1} delta={:+.1} bias={}",
            stored.trader_hash,
            stored.snapshot.emotional_self_score,
            stored.snapshot.rational_self_score,
            stored.snapshot.discipline_delta,
            stored.snapshot.dominant_bias
        );

        let result = match &self.remote {
            Some(remote) => remote.insert_snapshot(&stored).await,
            None => self.append_local(&stored).await,
        };

        match result {
            Ok(()) => {
                info!(
                    "Snapshot saved {}",
                    if self.is_remote() { "remotely" } else { "locally" }
                );
                InsertOutcome::ok()
            }
            Err(e) => {
                error!("Snapshot insert failed: {}", e);
                InsertOutcome::failed(e.to_string())
            }
        }
    }

    /// Evolution for one trader, oldest session first. Never fails: remote
    /// errors fall back to local data, local errors yield an empty list.
    pub async fn get_trader_evolution(&self, user_id: &str) -> Vec<EvolutionDataPoint> {
        let hash = trader_hash(user_id);

        if let Some(remote) = &self.remote {
            match remote.fetch_evolution(&hash).await {
                Ok(points) => return points,
                Err(e) => warn!("Remote evolution fetch failed, using local data: {}", e),
            }
        }

        match self.local_evolution(&hash).await {
            Ok(points) => points,
            Err(e) => {
                error!("Error reading local snapshots: {}", e);
                Vec::new()
            }
        }
    }

    /// Every locally stored snapshot that still parses, in insertion order.
    pub async fn local_snapshots(&self) -> Result<Vec<StoredSnapshot>> {
        let records = self.read_records().await?;
        Ok(records
            .into_iter()
            .filter_map(|v| match serde_json::from_value::<StoredSnapshot>(v) {
                Ok(s) => Some(s),
                Err(e) => {
                    debug!("Skipping unreadable snapshot record: {}", e);
                    None
                }
            })
            .collect())
    }

    async fn read_records(&self) -> Result<Vec<Value>> {
        match self.local.get_item(SNAPSHOTS_KEY).await? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }

    async fn append_local(&self, stored: &StoredSnapshot) -> Result<()> {
        // Existing records are carried over untouched, even ones this version
        // cannot parse.
        let mut records = self.read_records().await?;
        records.push(serde_json::to_value(stored)?);
        let json = serde_json::to_string(&records)?;
        self.local.set_item(SNAPSHOTS_KEY, &json).await
    }

    async fn local_evolution(&self, hash: &str) -> Result<Vec<EvolutionDataPoint>> {
        let mine: Vec<StoredSnapshot> = self
            .local_snapshots()
            .await?
            .into_iter()
            .filter(|s| s.trader_hash == hash)
            .collect();

        Ok(evolution_from_snapshots(&mine))
    }
}

/// Numbers sessions from 1 in the given order; improvement is the change in
/// discipline delta from the previous session.
pub fn evolution_from_snapshots(snapshots: &[StoredSnapshot]) -> Vec<EvolutionDataPoint> {
    snapshots
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let snap = &s.snapshot;
            let improvement = i
                .checked_sub(1)
                .map(|prev| snap.discipline_delta - snapshots[prev].snapshot.discipline_delta);
            EvolutionDataPoint {
                session_number: (i + 1) as u32,
                timestamp: snap.timestamp.clone(),
                emotional_score: snap.emotional_self_score,
                rational_score: snap.rational_self_score,
                discipline_delta: snap.discipline_delta,
                discipline_improvement: improvement,
                dominant_bias: snap.dominant_bias,
                trade_count_emotional: Some(snap.trade_count_emotional),
                trade_count_rational: Some(snap.trade_count_rational),
            }
        })
        .collect()
}
