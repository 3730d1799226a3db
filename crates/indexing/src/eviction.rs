//! `EvictionService`: per-entry-type TTL sweep, a max-entries cap, and a
//! full flush, runnable on a schedule or on demand.

use chrono::Utc;
use noetic_common::config::EvictionConfig;
use noetic_common::types::{MetadataFilter, ENTRY_TYPE_CRAWL_CHUNK, ENTRY_TYPE_QUERY_CACHE, ENTRY_TYPE_SEARCH_RESULT};
use noetic_common::Result;
use noetic_storage::VectorStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct EvictionReport {
    pub deleted_by_ttl: usize,
    pub deleted_by_cap: usize,
}

pub struct EvictionService {
    store: Arc<dyn VectorStore>,
    config: EvictionConfig,
}

impl EvictionService {
    #[must_use]
    pub fn new(store: Arc<dyn VectorStore>, config: EvictionConfig) -> Self {
        Self { store, config }
    }

    fn policies(&self) -> [(&'static str, i64); 3] {
        [
            (ENTRY_TYPE_SEARCH_RESULT, self.config.search_result_ttl_secs),
            (ENTRY_TYPE_QUERY_CACHE, self.config.query_cache_ttl_secs),
            (ENTRY_TYPE_CRAWL_CHUNK, self.config.crawl_chunk_ttl_secs),
        ]
    }

    /// Sweeps every entry-type TTL policy, then sheds the oldest bucket if
    /// the total entry count still exceeds `maxEntries`.
    #[instrument(skip(self))]
    pub async fn run_eviction(&self) -> Result<EvictionReport> {
        let now = Utc::now().timestamp();
        let mut deleted_by_ttl = 0usize;
        for (entry_type, ttl_secs) in self.policies() {
            let filter = MetadataFilter::new().with_entry_type(entry_type).with_created_before(now - ttl_secs);
            let removed = self.store.delete_by_metadata(None, &filter).await?;
            deleted_by_ttl += removed;
        }

        let mut deleted_by_cap = 0usize;
        if self.store.count().await? > self.config.max_entries {
            let filter = MetadataFilter::new().with_created_before(now - 86_400);
            deleted_by_cap = self.store.delete_by_metadata(None, &filter).await?;
        }

        info!(deleted_by_ttl, deleted_by_cap, "eviction sweep complete");
        Ok(EvictionReport { deleted_by_ttl, deleted_by_cap })
    }

    /// Deletes every entry in the store, regardless of age or type.
    #[instrument(skip(self))]
    pub async fn flush_all(&self) -> Result<usize> {
        let cutoff = Utc::now().timestamp() + 1;
        let filter = MetadataFilter::new().with_created_before(cutoff);
        let removed = self.store.delete_by_metadata(None, &filter).await?;
        info!(removed, "flushed all entries");
        Ok(removed)
    }

    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.config.sweep_interval_secs)
    }

    /// Runs `run_eviction` on the configured interval until the process
    /// exits. Intended to be spawned once at startup.
    pub async fn run_scheduled(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.sweep_interval());
        loop {
            ticker.tick().await;
            if let Err(e) = self.run_eviction().await {
                tracing::warn!(error = %e, "scheduled eviction sweep failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noetic_storage::{LocalVectorStore, VectorEntry};
    use std::collections::HashMap;

    fn aged_entry(id: &str, entry_type: &str, age: chrono::Duration) -> VectorEntry {
        VectorEntry {
            id: id.to_string(),
            vector: vec![1.0, 0.0],
            content: "x".to_string(),
            entry_type: entry_type.to_string(),
            namespace: "default".to_string(),
            created_at: Utc::now() - age,
            metadata: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn run_eviction_removes_only_expired_entries_per_type() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn VectorStore> = Arc::new(LocalVectorStore::server(dir.path()));
        store.initialize().await.unwrap();
        store.upsert(aged_entry("stale-search", ENTRY_TYPE_SEARCH_RESULT, chrono::Duration::hours(25))).await.unwrap();
        store.upsert(aged_entry("fresh-search", ENTRY_TYPE_SEARCH_RESULT, chrono::Duration::hours(1))).await.unwrap();
        store.upsert(aged_entry("fresh-chunk", ENTRY_TYPE_CRAWL_CHUNK, chrono::Duration::hours(1))).await.unwrap();

        let service = EvictionService::new(store.clone(), EvictionConfig::default());
        let report = service.run_eviction().await.unwrap();

        assert_eq!(report.deleted_by_ttl, 1);
        assert!(store.get("default", "stale-search").await.unwrap().is_none());
        assert!(store.get("default", "fresh-search").await.unwrap().is_some());
        assert!(store.get("default", "fresh-chunk").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn flush_all_removes_every_entry_regardless_of_age() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn VectorStore> = Arc::new(LocalVectorStore::server(dir.path()));
        store.initialize().await.unwrap();
        store.upsert(aged_entry("a", ENTRY_TYPE_CRAWL_CHUNK, chrono::Duration::seconds(1))).await.unwrap();

        let service = EvictionService::new(store.clone(), EvictionConfig::default());
        let removed = service.flush_all().await.unwrap();

        assert_eq!(removed, 1);
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
