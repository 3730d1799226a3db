//! `VectorStore` capability: durable namespaced KNN index.

use crate::entry::{VectorEntry, VectorMatch};
use async_trait::async_trait;
use noetic_common::types::MetadataFilter;
use noetic_common::Result;

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the on-disk index directory if absent; idempotent.
    async fn initialize(&self) -> Result<()>;

    /// Replace any entry with the same id, then commit.
    async fn upsert(&self, entry: VectorEntry) -> Result<()>;

    /// Single commit for the whole batch.
    async fn upsert_batch(&self, entries: Vec<VectorEntry>) -> Result<()>;

    async fn get(&self, namespace: &str, id: &str) -> Result<Option<VectorEntry>>;

    async fn delete(&self, namespace: &str, id: &str) -> Result<()>;

    async fn delete_batch(&self, namespace: &str, ids: &[String]) -> Result<()>;

    /// Up to `top_k` matches whose similarity is >= `threshold`, strictly
    /// descending by score, ties broken by id lexicographically.
    async fn search(
        &self,
        query_vector: &[f32],
        top_k: usize,
        threshold: f32,
        namespace: Option<&str>,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<VectorMatch>>;

    /// Delete every entry matching the conjunction of equality/range
    /// constraints in `filter`. Returns the number of entries removed.
    async fn delete_by_metadata(&self, namespace: Option<&str>, filter: &MetadataFilter) -> Result<usize>;

    /// Total live entries across all namespaces (both tiers in agent mode).
    async fn count(&self) -> Result<usize>;

    /// Commit and release files.
    async fn close(&self) -> Result<()>;

    /// Copy all live entries of the agent tier into the shared tier,
    /// replacing by id. Only meaningful (and only implemented) in agent
    /// mode; other modes return `ProviderUnavailable`.
    async fn promote(&self) -> Result<usize> {
        Err(noetic_common::Error::ProviderUnavailable(
            "promote is only available in agent mode".to_string(),
        ))
    }
}
