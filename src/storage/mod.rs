pub mod local;
pub mod snapshots;
pub mod snowflake;

pub use local::{FileStore, MemoryStore};
pub use snapshots::{SnapshotRepository, SNAPSHOTS_KEY};
pub use snowflake::SnowflakeClient;

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::{EvolutionDataPoint, StoredSnapshot};

/// On-device string key/value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>>;
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

/// Remote analytical store for snapshots.
#[async_trait]
pub trait SnapshotWarehouse: Send + Sync {
    async fn insert_snapshot(&self, stored: &StoredSnapshot) -> Result<()>;

    /// Evolution rows for one trader hash, oldest session first.
    async fn fetch_evolution(&self, trader_hash: &str) -> Result<Vec<EvolutionDataPoint>>;
}

/// Pseudonymous trader id: 31-multiplier string hash over UTF-16 code units,
/// wrapped to 32 bits, absolute value, lowercase hex.
///
/// Not a cryptographic hash. It only keeps raw user ids out of stored rows.
pub fn trader_hash(user_id: &str) -> String {
    let hash = user_id.encode_utf16().fold(0i32, |h, unit| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(unit as i32)
    });
    format!("{:x}", (hash as i64).abs())
}
