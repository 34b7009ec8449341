//! Bounded, most-recent-first log of past recommendation requests.

use crate::error::RecommendError;
use crate::model::{EnrichedRecommendation, Filters};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

/// Key the history is stored under
pub const HISTORY_KEY: &str = "recommendationHistory";

/// Default number of entries retained
pub const HISTORY_LIMIT: usize = 20;

const DEFAULT_PROMPT: &str = "Genel öneri";

/// Opaque string key-value storage
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, RecommendError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), RecommendError>;
    async fn remove(&self, key: &str) -> Result<(), RecommendError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RecommendError> {
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RecommendError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), RecommendError> {
        self.lock().remove(key);
        Ok(())
    }
}

impl MemoryStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RecommendError> {
        match tokio::fs::read_to_string(self.path(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RecommendError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.path(key), value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), RecommendError> {
        match tokio::fs::remove_file(self.path(key)).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Creation time in milliseconds since the epoch
    pub id: i64,
    pub prompt: String,
    pub filters: Filters,
    pub recommendations: Vec<EnrichedRecommendation>,
    pub display_date: String,
}

pub struct History<S: KeyValueStore> {
    store: S,
    limit: usize,
}

impl<S: KeyValueStore> History<S> {
    pub fn new(store: S) -> Self {
        History {
            store,
            limit: HISTORY_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Stored entries, newest first. Unreadable data counts as empty history.
    pub async fn entries(&self) -> Result<Vec<HistoryEntry>, RecommendError> {
        let Some(raw) = self.store.get(HISTORY_KEY).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!("Discarding unreadable history: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Create an entry for a finished request and store it.
    pub async fn record(
        &self,
        prompt: &str,
        filters: &Filters,
        recommendations: &[EnrichedRecommendation],
        now: DateTime<Local>,
    ) -> Result<HistoryEntry, RecommendError> {
        let prompt = prompt.trim();
        let entry = HistoryEntry {
            id: now.timestamp_millis(),
            prompt: if prompt.is_empty() {
                DEFAULT_PROMPT.to_string()
            } else {
                prompt.to_string()
            },
            filters: filters.clone(),
            recommendations: recommendations.to_vec(),
            display_date: now.format("%d.%m.%Y %H:%M:%S").to_string(),
        };

        self.push(entry.clone()).await?;
        Ok(entry)
    }

    /// Insert at the front and drop everything past the limit.
    pub async fn push(&self, entry: HistoryEntry) -> Result<(), RecommendError> {
        let mut entries = self.entries().await?;
        entries.insert(0, entry);
        entries.truncate(self.limit);
        debug!("History now holds {} entries", entries.len());

        let raw = serde_json::to_string(&entries)?;
        self.store.set(HISTORY_KEY, &raw).await
    }

    pub async fn find(&self, id: i64) -> Result<Option<HistoryEntry>, RecommendError> {
        Ok(self.entries().await?.into_iter().find(|entry| entry.id == id))
    }

    pub async fn clear(&self) -> Result<(), RecommendError> {
        self.store.remove(HISTORY_KEY).await
    }
}
