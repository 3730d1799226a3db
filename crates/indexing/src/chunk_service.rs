//! `ChunkService`: chunk a document, embed each chunk, and upsert the
//! results as `crawl_chunk` entries.

use crate::chunker;
use crate::embedder::Embedder;
use noetic_common::types::{EmbeddingHint, ENTRY_TYPE_CRAWL_CHUNK};
use noetic_common::Result;
use noetic_storage::{VectorEntry, VectorStore};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, serde::Serialize)]
pub struct ChunkOutcome {
    pub chunk_ids: Vec<String>,
    pub chunk_count: usize,
}

pub struct ChunkService {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl ChunkService {
    #[must_use]
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    #[instrument(skip(self, content), fields(strategy, namespace, len = content.len()))]
    pub async fn chunk(
        &self,
        content: &str,
        strategy: &str,
        max_chunk_size: usize,
        overlap: usize,
        source_url: Option<&str>,
        namespace: &str,
    ) -> Result<ChunkOutcome> {
        let chunker = chunker::resolve(strategy);
        let chunks = chunker.chunk(content, max_chunk_size, overlap)?;

        let mut chunk_ids = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let vector = self.embedder.embed(&chunk.text, EmbeddingHint::Document).await?;
            let mut metadata = HashMap::new();
            metadata.insert("tokenCount".to_string(), chunk.token_count.to_string());
            if let Some(url) = source_url {
                metadata.insert("sourceUrl".to_string(), url.to_string());
            }
            let entry = VectorEntry {
                id: Uuid::new_v4().to_string(),
                vector,
                content: chunk.text,
                entry_type: ENTRY_TYPE_CRAWL_CHUNK.to_string(),
                namespace: namespace.to_string(),
                created_at: chrono::Utc::now(),
                metadata,
            };
            chunk_ids.push(entry.id.clone());
            self.store.upsert(entry).await?;
        }

        info!(chunk_count = chunk_ids.len(), "chunked and indexed content");
        Ok(ChunkOutcome { chunk_count: chunk_ids.len(), chunk_ids })
    }
}
