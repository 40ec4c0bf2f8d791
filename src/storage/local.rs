use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::errors::Result;
use crate::storage::KeyValueStore;

/// One JSON file per key under a data directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.path_for(key), value).await?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
