//! Remote backend adapters.
//!
//! spec.md scopes only the local backend as fully specified; Pinecone,
//! Weaviate and Milvus are named as valid `StoreBackend` values but have
//! no behavior defined beyond "a `VectorStore` implementation exists".
//! Qdrant gets a real adapter here because noetic-storage already depends
//! on `qdrant-client` for it; the others are `ProviderUnavailable` stubs
//! that keep the config surface honest without faking a working backend.

use crate::entry::{VectorEntry, VectorMatch};
use crate::store::VectorStore;
use async_trait::async_trait;
use noetic_common::types::MetadataFilter;
use noetic_common::{Error, Result};
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter, PointId,
    PointStruct, SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use std::collections::HashMap;
use tracing::instrument;

pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
    vector_dim: u64,
}

impl QdrantVectorStore {
    pub fn new(url: &str, collection: impl Into<String>, vector_dim: u64) -> Result<Self> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| Error::ProviderUnavailable(format!("qdrant client: {e}")))?;
        Ok(Self { client, collection: collection.into(), vector_dim })
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    #[instrument(skip(self))]
    async fn initialize(&self) -> Result<()> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| Error::ProviderUnavailable(e.to_string()))?;
        if !exists {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection)
                        .vectors_config(VectorParamsBuilder::new(self.vector_dim, Distance::Cosine)),
                )
                .await
                .map_err(|e| Error::ProviderUnavailable(e.to_string()))?;
        }
        Ok(())
    }

    async fn upsert(&self, entry: VectorEntry) -> Result<()> {
        self.upsert_batch(vec![entry]).await
    }

    async fn upsert_batch(&self, entries: Vec<VectorEntry>) -> Result<()> {
        let points: Vec<PointStruct> = entries
            .into_iter()
            .map(|e| {
                let mut payload: HashMap<String, qdrant_client::qdrant::Value> = HashMap::new();
                payload.insert("content".into(), e.content.into());
                payload.insert("entry_type".into(), e.entry_type.into());
                payload.insert("namespace".into(), e.namespace.into());
                payload.insert("created_at".into(), e.created_at.timestamp().into());
                for (k, v) in e.metadata {
                    payload.insert(k, v.into());
                }
                PointStruct::new(e.id, e.vector, payload)
            })
            .collect();
        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points))
            .await
            .map_err(|e| Error::StoreFailure(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, _namespace: &str, _id: &str) -> Result<Option<VectorEntry>> {
        Err(Error::ProviderUnavailable("point lookup by id not implemented for qdrant backend".to_string()))
    }

    async fn delete(&self, _namespace: &str, id: &str) -> Result<()> {
        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points::<Vec<PointId>>(vec![id.to_string().into()]),
            )
            .await
            .map_err(|e| Error::StoreFailure(e.to_string()))?;
        Ok(())
    }

    async fn delete_batch(&self, namespace: &str, ids: &[String]) -> Result<()> {
        for id in ids {
            self.delete(namespace, id).await?;
        }
        Ok(())
    }

    async fn search(
        &self,
        query_vector: &[f32],
        top_k: usize,
        threshold: f32,
        namespace: Option<&str>,
        _filter: Option<&MetadataFilter>,
    ) -> Result<Vec<VectorMatch>> {
        let mut search = SearchPointsBuilder::new(&self.collection, query_vector.to_vec(), top_k as u64)
            .score_threshold(threshold)
            .with_payload(true);
        if let Some(ns) = namespace {
            search = search.filter(Filter::must([Condition::matches("namespace", ns.to_string())]));
        }
        let response = self
            .client
            .search_points(search)
            .await
            .map_err(|e| Error::ProviderUnavailable(e.to_string()))?;
        Ok(response
            .result
            .into_iter()
            .map(|point| {
                let content = point
                    .payload
                    .get("content")
                    .and_then(|v| v.as_str().map(|s| s.to_string()))
                    .unwrap_or_default();
                let id = point.id.map(|i| format!("{i:?}")).unwrap_or_default();
                VectorMatch { id, score: point.score, content, metadata: HashMap::new() }
            })
            .collect())
    }

    async fn delete_by_metadata(&self, _namespace: Option<&str>, _filter: &MetadataFilter) -> Result<usize> {
        Err(Error::ProviderUnavailable("delete_by_metadata not implemented for qdrant backend".to_string()))
    }

    async fn count(&self) -> Result<usize> {
        let info = self
            .client
            .collection_info(&self.collection)
            .await
            .map_err(|e| Error::ProviderUnavailable(e.to_string()))?;
        Ok(info.result.and_then(|r| r.points_count).unwrap_or(0) as usize)
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Stand-in for backends named in config but not implemented: Pinecone,
/// Weaviate, Milvus. Every operation fails loudly rather than silently
/// behaving like a local store.
pub struct UnavailableVectorStore {
    backend_name: String,
}

impl UnavailableVectorStore {
    #[must_use]
    pub fn new(backend_name: impl Into<String>) -> Self {
        Self { backend_name: backend_name.into() }
    }

    fn err(&self) -> Error {
        Error::ProviderUnavailable(format!("{} backend is not implemented", self.backend_name))
    }
}

#[async_trait]
impl VectorStore for UnavailableVectorStore {
    async fn initialize(&self) -> Result<()> {
        Err(self.err())
    }
    async fn upsert(&self, _entry: VectorEntry) -> Result<()> {
        Err(self.err())
    }
    async fn upsert_batch(&self, _entries: Vec<VectorEntry>) -> Result<()> {
        Err(self.err())
    }
    async fn get(&self, _namespace: &str, _id: &str) -> Result<Option<VectorEntry>> {
        Err(self.err())
    }
    async fn delete(&self, _namespace: &str, _id: &str) -> Result<()> {
        Err(self.err())
    }
    async fn delete_batch(&self, _namespace: &str, _ids: &[String]) -> Result<()> {
        Err(self.err())
    }
    async fn search(
        &self,
        _query_vector: &[f32],
        _top_k: usize,
        _threshold: f32,
        _namespace: Option<&str>,
        _filter: Option<&MetadataFilter>,
    ) -> Result<Vec<VectorMatch>> {
        Err(self.err())
    }
    async fn delete_by_metadata(&self, _namespace: Option<&str>, _filter: &MetadataFilter) -> Result<usize> {
        Err(self.err())
    }
    async fn count(&self) -> Result<usize> {
        Err(self.err())
    }
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
