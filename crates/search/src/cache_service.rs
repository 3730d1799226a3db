//! `CacheService`: the read-only query path over the semantic cache —
//! embed, then KNN with a similarity threshold.

use noetic_common::types::EmbeddingHint;
use noetic_common::Result;
use noetic_indexing::Embedder;
use noetic_storage::{VectorMatch, VectorStore};
use std::sync::Arc;
use tracing::instrument;

pub struct CacheService {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl CacheService {
    #[must_use]
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    #[instrument(skip(self, query), fields(namespace, top_k, threshold))]
    pub async fn query(&self, query: &str, top_k: usize, threshold: f32, namespace: &str) -> Result<Vec<VectorMatch>> {
        let vector = self.embedder.embed(query, EmbeddingHint::Query).await?;
        self.store.search(&vector, top_k, threshold, Some(namespace), None).await
    }
}
