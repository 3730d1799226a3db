//! The default "local" `VectorStore` backend: a durable, namespaced,
//! brute-force-cosine index persisted as a single JSON snapshot per tier.
//!
//! Two-tier layout (spec.md §4.1): in agent mode, writes land in a
//! per-agent directory; reads union the agent tier with an optional
//! read-only shared tier. `promote()` copies the agent tier's live
//! entries into the shared tier, replacing by id.

use crate::entry::{VectorEntry, VectorMatch};
use crate::store::VectorStore;
use async_trait::async_trait;
use noetic_common::types::MetadataFilter;
use noetic_common::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info, instrument, warn};

const SNAPSHOT_FILE: &str = "entries.json";
const LOCK_FILE: &str = "write.lock";

type Key = (String, String);

fn load_snapshot(dir: &Path) -> Result<HashMap<Key, VectorEntry>> {
    let path = dir.join(SNAPSHOT_FILE);
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(&path)?;
    if content.trim().is_empty() {
        return Ok(HashMap::new());
    }
    let entries: Vec<VectorEntry> = serde_json::from_str(&content)?;
    Ok(entries
        .into_iter()
        .map(|e| ((e.namespace.clone(), e.id.clone()), e))
        .collect())
}

fn write_snapshot(dir: &Path, entries: &HashMap<Key, VectorEntry>) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let values: Vec<&VectorEntry> = entries.values().collect();
    let serialized = serde_json::to_string(&values)?;
    let tmp_path = dir.join(format!("{SNAPSHOT_FILE}.tmp"));
    std::fs::write(&tmp_path, serialized)?;
    std::fs::rename(&tmp_path, dir.join(SNAPSHOT_FILE))?;
    Ok(())
}

/// Clears a stale `write.lock` left behind by a prior crashed process.
/// Per the open-question resolution in DESIGN.md, only the lock marker is
/// removed — partial segment files are left alone.
fn clear_stale_lock(dir: &Path) -> Result<()> {
    let lock_path = dir.join(LOCK_FILE);
    if lock_path.exists() {
        warn!(path = %lock_path.display(), "clearing stale write lock");
        std::fs::remove_file(&lock_path)?;
    }
    Ok(())
}

fn acquire_lock(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join(LOCK_FILE), std::process::id().to_string())?;
    Ok(())
}

fn release_lock(dir: &Path) -> Result<()> {
    let lock_path = dir.join(LOCK_FILE);
    if lock_path.exists() {
        std::fs::remove_file(&lock_path)?;
    }
    Ok(())
}

pub struct LocalVectorStore {
    agent_dir: PathBuf,
    shared_dir: Option<PathBuf>,
    agent_entries: RwLock<HashMap<Key, VectorEntry>>,
    shared_entries: RwLock<HashMap<Key, VectorEntry>>,
}

impl LocalVectorStore {
    /// Server-mode store: a single writable index directory.
    #[must_use]
    pub fn server(dir: impl Into<PathBuf>) -> Self {
        Self {
            agent_dir: dir.into(),
            shared_dir: None,
            agent_entries: RwLock::new(HashMap::new()),
            shared_entries: RwLock::new(HashMap::new()),
        }
    }

    /// Agent-mode store: per-agent writable directory plus an optional
    /// read-only shared index.
    #[must_use]
    pub fn agent(agent_dir: impl Into<PathBuf>, shared_dir: impl Into<PathBuf>) -> Self {
        Self {
            agent_dir: agent_dir.into(),
            shared_dir: Some(shared_dir.into()),
            agent_entries: RwLock::new(HashMap::new()),
            shared_entries: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn is_agent_mode(&self) -> bool {
        self.shared_dir.is_some()
    }

    fn commit_agent(&self) -> Result<()> {
        let guard = self.agent_entries.read().map_err(|_| Error::StoreFailure("agent lock poisoned".into()))?;
        write_snapshot(&self.agent_dir, &guard)
    }

    fn commit_shared(&self) -> Result<()> {
        let Some(shared_dir) = &self.shared_dir else {
            return Ok(());
        };
        let guard = self.shared_entries.read().map_err(|_| Error::StoreFailure("shared lock poisoned".into()))?;
        write_snapshot(shared_dir, &guard)
    }

    fn matches_filter(entry: &VectorEntry, namespace: Option<&str>, filter: Option<&MetadataFilter>) -> bool {
        if let Some(ns) = namespace {
            if entry.namespace != ns {
                return false;
            }
        }
        let Some(filter) = filter else { return true };
        if let Some(entry_type) = &filter.entry_type {
            if &entry.entry_type != entry_type {
                return false;
            }
        }
        for (k, v) in &filter.equals {
            match entry.metadata.get(k) {
                Some(value) if value == v => {}
                _ => return false,
            }
        }
        let epoch = entry.created_at_epoch();
        if let Some(after) = filter.created_after {
            if epoch <= after {
                return false;
            }
        }
        if let Some(before) = filter.created_before {
            if epoch >= before {
                return false;
            }
        }
        true
    }

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        let len = a.len().min(b.len());
        a[..len].iter().zip(&b[..len]).map(|(x, y)| x * y).sum()
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    #[instrument(skip(self))]
    async fn initialize(&self) -> Result<()> {
        clear_stale_lock(&self.agent_dir)?;
        acquire_lock(&self.agent_dir)?;
        {
            let mut guard = self.agent_entries.write().map_err(|_| Error::StoreFailure("agent lock poisoned".into()))?;
            *guard = load_snapshot(&self.agent_dir)?;
        }
        if let Some(shared_dir) = self.shared_dir.clone() {
            std::fs::create_dir_all(&shared_dir)?;
            let mut guard = self.shared_entries.write().map_err(|_| Error::StoreFailure("shared lock poisoned".into()))?;
            *guard = load_snapshot(&shared_dir)?;
        }
        info!(agent_dir = %self.agent_dir.display(), agent_mode = self.is_agent_mode(), "vector store initialized");
        Ok(())
    }

    #[instrument(skip(self, entry), fields(id = %entry.id, namespace = %entry.namespace))]
    async fn upsert(&self, entry: VectorEntry) -> Result<()> {
        if entry.vector.is_empty() {
            return Err(Error::InvalidInput("vector must be non-empty".to_string()));
        }
        {
            let mut guard = self.agent_entries.write().map_err(|_| Error::StoreFailure("agent lock poisoned".into()))?;
            guard.insert((entry.namespace.clone(), entry.id.clone()), entry);
        }
        self.commit_agent()
    }

    #[instrument(skip(self, entries), fields(count = entries.len()))]
    async fn upsert_batch(&self, entries: Vec<VectorEntry>) -> Result<()> {
        for entry in &entries {
            if entry.vector.is_empty() {
                return Err(Error::InvalidInput("vector must be non-empty".to_string()));
            }
        }
        {
            let mut guard = self.agent_entries.write().map_err(|_| Error::StoreFailure("agent lock poisoned".into()))?;
            for entry in entries {
                guard.insert((entry.namespace.clone(), entry.id.clone()), entry);
            }
        }
        self.commit_agent()
    }

    async fn get(&self, namespace: &str, id: &str) -> Result<Option<VectorEntry>> {
        let key = (namespace.to_string(), id.to_string());
        {
            let guard = self.agent_entries.read().map_err(|_| Error::StoreFailure("agent lock poisoned".into()))?;
            if let Some(entry) = guard.get(&key) {
                return Ok(Some(entry.clone()));
            }
        }
        let guard = self.shared_entries.read().map_err(|_| Error::StoreFailure("shared lock poisoned".into()))?;
        Ok(guard.get(&key).cloned())
    }

    #[instrument(skip(self))]
    async fn delete(&self, namespace: &str, id: &str) -> Result<()> {
        {
            let mut guard = self.agent_entries.write().map_err(|_| Error::StoreFailure("agent lock poisoned".into()))?;
            guard.remove(&(namespace.to_string(), id.to_string()));
        }
        self.commit_agent()
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn delete_batch(&self, namespace: &str, ids: &[String]) -> Result<()> {
        {
            let mut guard = self.agent_entries.write().map_err(|_| Error::StoreFailure("agent lock poisoned".into()))?;
            for id in ids {
                guard.remove(&(namespace.to_string(), id.clone()));
            }
        }
        self.commit_agent()
    }

    #[instrument(skip(self, query_vector, filter), fields(top_k, threshold))]
    async fn search(
        &self,
        query_vector: &[f32],
        top_k: usize,
        threshold: f32,
        namespace: Option<&str>,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<VectorMatch>> {
        let agent = self.agent_entries.read().map_err(|_| Error::StoreFailure("agent lock poisoned".into()))?;
        let shared = self.shared_entries.read().map_err(|_| Error::StoreFailure("shared lock poisoned".into()))?;

        // Union both tiers; the agent tier wins on key collision (it is
        // the most recently written copy of a promoted entry).
        let mut candidates: HashMap<&Key, &VectorEntry> = HashMap::new();
        for (k, v) in shared.iter() {
            candidates.insert(k, v);
        }
        for (k, v) in agent.iter() {
            candidates.insert(k, v);
        }

        let mut scored: Vec<VectorMatch> = candidates
            .values()
            .filter(|e| Self::matches_filter(e, namespace, filter))
            .map(|e| {
                let score = Self::cosine(query_vector, &e.vector);
                VectorMatch {
                    id: e.id.clone(),
                    score,
                    content: e.content.clone(),
                    metadata: e.metadata.clone(),
                }
            })
            .filter(|m| m.score >= threshold)
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.id.cmp(&b.id)));
        scored.truncate(top_k);
        debug!(matches = scored.len(), "search complete");
        Ok(scored)
    }

    #[instrument(skip(self, filter))]
    async fn delete_by_metadata(&self, namespace: Option<&str>, filter: &MetadataFilter) -> Result<usize> {
        let mut removed = 0usize;
        {
            let mut guard = self.agent_entries.write().map_err(|_| Error::StoreFailure("agent lock poisoned".into()))?;
            let doomed: Vec<Key> = guard
                .iter()
                .filter(|(_, e)| Self::matches_filter(e, namespace, Some(filter)))
                .map(|(k, _)| k.clone())
                .collect();
            for key in doomed {
                guard.remove(&key);
                removed += 1;
            }
        }
        if removed > 0 {
            self.commit_agent()?;
        }
        Ok(removed)
    }

    async fn count(&self) -> Result<usize> {
        let agent = self.agent_entries.read().map_err(|_| Error::StoreFailure("agent lock poisoned".into()))?;
        let shared = self.shared_entries.read().map_err(|_| Error::StoreFailure("shared lock poisoned".into()))?;
        let mut ids: std::collections::HashSet<&Key> = shared.keys().collect();
        ids.extend(agent.keys());
        Ok(ids.len())
    }

    #[instrument(skip(self))]
    async fn close(&self) -> Result<()> {
        self.commit_agent()?;
        release_lock(&self.agent_dir)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn promote(&self) -> Result<usize> {
        if self.shared_dir.is_none() {
            return Err(Error::ProviderUnavailable("promote requires agent mode".to_string()));
        }
        let agent = self.agent_entries.read().map_err(|_| Error::StoreFailure("agent lock poisoned".into()))?;
        let mut shared = self.shared_entries.write().map_err(|_| Error::StoreFailure("shared lock poisoned".into()))?;
        let promoted = agent.len();
        for (k, v) in agent.iter() {
            shared.insert(k.clone(), v.clone());
        }
        drop(agent);
        drop(shared);
        self.commit_shared()?;
        info!(promoted, "promoted agent tier into shared tier");
        Ok(promoted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noetic_common::types::ENTRY_TYPE_CRAWL_CHUNK;

    fn entry(id: &str, namespace: &str, vector: Vec<f32>) -> VectorEntry {
        VectorEntry {
            id: id.to_string(),
            vector,
            content: format!("content for {id}"),
            entry_type: ENTRY_TYPE_CRAWL_CHUNK.to_string(),
            namespace: namespace.to_string(),
            created_at: chrono::Utc::now(),
            metadata: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn upsert_then_get_roundtrips_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalVectorStore::server(dir.path());
        store.initialize().await.unwrap();
        let e = entry("a", "default", vec![1.0, 0.0]);
        store.upsert(e.clone()).await.unwrap();
        let fetched = store.get("default", "a").await.unwrap().unwrap();
        assert_eq!(fetched.id, e.id);
        assert_eq!(fetched.content, e.content);
        assert_eq!(fetched.entry_type, e.entry_type);
        assert_eq!(fetched.namespace, e.namespace);
    }

    #[tokio::test]
    async fn namespace_isolation_excludes_other_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalVectorStore::server(dir.path());
        store.initialize().await.unwrap();
        store.upsert(entry("a", "x", vec![1.0, 0.0])).await.unwrap();

        let in_y = store.search(&[1.0, 0.0], 10, 0.0, Some("y"), None).await.unwrap();
        assert!(in_y.is_empty());

        let in_x = store.search(&[1.0, 0.0], 10, 0.0, Some("x"), None).await.unwrap();
        assert_eq!(in_x.len(), 1);
        assert_eq!(in_x[0].id, "a");
    }

    #[tokio::test]
    async fn search_orders_by_score_descending_then_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalVectorStore::server(dir.path());
        store.initialize().await.unwrap();
        store.upsert(entry("b", "default", vec![0.5, 0.5])).await.unwrap();
        store.upsert(entry("a", "default", vec![1.0, 0.0])).await.unwrap();
        store.upsert(entry("c", "default", vec![0.5, 0.5])).await.unwrap();

        let results = store.search(&[1.0, 0.0], 10, 0.0, None, None).await.unwrap();
        assert_eq!(results[0].id, "a");
        // b and c tie on score; id order breaks the tie.
        assert_eq!(results[1].id, "b");
        assert_eq!(results[2].id, "c");
    }

    #[tokio::test]
    async fn delete_by_metadata_removes_matching_entries_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalVectorStore::server(dir.path());
        store.initialize().await.unwrap();
        let mut old = entry("old", "default", vec![1.0, 0.0]);
        old.created_at = chrono::Utc::now() - chrono::Duration::hours(25);
        store.upsert(old).await.unwrap();
        store.upsert(entry("new", "default", vec![1.0, 0.0])).await.unwrap();

        let filter = MetadataFilter::new()
            .with_entry_type(ENTRY_TYPE_CRAWL_CHUNK)
            .with_created_before((chrono::Utc::now() - chrono::Duration::hours(24)).timestamp());
        let removed = store.delete_by_metadata(None, &filter).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.get("default", "new").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn promote_copies_agent_entries_into_shared_tier() {
        let agent_dir = tempfile::tempdir().unwrap();
        let shared_dir = tempfile::tempdir().unwrap();
        let store = LocalVectorStore::agent(agent_dir.path(), shared_dir.path());
        store.initialize().await.unwrap();
        store.upsert(entry("a", "default", vec![1.0, 0.0])).await.unwrap();

        let promoted = store.promote().await.unwrap();
        assert_eq!(promoted, 1);

        // A fresh store reading only the shared dir should see it.
        let reader = LocalVectorStore::server(shared_dir.path());
        reader.initialize().await.unwrap();
        assert!(reader.get("default", "a").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn stale_lock_file_is_cleared_on_initialize() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(LOCK_FILE), "1234").unwrap();
        let store = LocalVectorStore::server(dir.path());
        store.initialize().await.unwrap();
        assert!(dir.path().join(LOCK_FILE).exists());
    }
}
