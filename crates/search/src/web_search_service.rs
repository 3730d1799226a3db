//! `WebSearchService`: embed the query, probe the semantic cache, fall
//! through to the live provider on a miss, and write results back.

use crate::provider::SearchProvider;
use crate::types::{SearchRequest, SearchResponse, SearchResult};
use noetic_common::types::{EmbeddingHint, ENTRY_TYPE_SEARCH_RESULT};
use noetic_common::Result;
use noetic_indexing::Embedder;
use noetic_storage::{VectorEntry, VectorStore};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{instrument, warn};
use uuid::Uuid;

pub struct WebSearchService {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    provider: Arc<dyn SearchProvider>,
    cache_threshold: f32,
}

impl WebSearchService {
    #[must_use]
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>, provider: Arc<dyn SearchProvider>, cache_threshold: f32) -> Self {
        Self { embedder, store, provider, cache_threshold }
    }

    #[instrument(skip(self, request), fields(query_len = request.query.len(), namespace))]
    pub async fn search(&self, request: &SearchRequest, namespace: &str) -> Result<SearchResponse> {
        let started = Instant::now();

        if !request.skip_cache {
            let query_vector = self.embedder.embed(&request.query, EmbeddingHint::Query).await?;
            let matches = self.store.search(&query_vector, request.max_results, self.cache_threshold, Some(namespace), None).await?;
            if !matches.is_empty() {
                let results = matches
                    .into_iter()
                    .map(|m| SearchResult {
                        title: m.metadata.get("title").cloned().unwrap_or_default(),
                        url: m.metadata.get("url").cloned().unwrap_or_default(),
                        snippet: m.content,
                        extra_snippets: Vec::new(),
                        raw_content: None,
                        score: m.score,
                        published_date: None,
                    })
                    .collect();
                return Ok(SearchResponse { provider: "cache".to_string(), from_cache: true, results, elapsed_ms: started.elapsed().as_millis() });
            }
        }

        let live_results = self.provider.search(request).await?;
        self.write_back(&live_results, &request.query, namespace).await;

        Ok(SearchResponse {
            provider: self.provider.name().to_string(),
            from_cache: false,
            results: live_results,
            elapsed_ms: started.elapsed().as_millis(),
        })
    }

    /// Cache write-back is best-effort: a failure here must never fail
    /// the search the caller is waiting on.
    async fn write_back(&self, results: &[SearchResult], query: &str, namespace: &str) {
        for result in results {
            let text = format!("{} {}", result.title, result.snippet);
            let vector = match self.embedder.embed(&text, EmbeddingHint::Document).await {
                Ok(v) => v,
                Err(e) => {
                    warn!(error = %e, "embedding failed during search write-back");
                    continue;
                }
            };
            let mut metadata = HashMap::new();
            metadata.insert("title".to_string(), result.title.clone());
            metadata.insert("url".to_string(), result.url.clone());
            metadata.insert("query".to_string(), query.to_string());

            let entry = VectorEntry {
                id: Uuid::new_v4().to_string(),
                vector,
                content: result.snippet.clone(),
                entry_type: ENTRY_TYPE_SEARCH_RESULT.to_string(),
                namespace: namespace.to_string(),
                created_at: chrono::Utc::now(),
                metadata,
            };
            if let Err(e) = self.store.upsert(entry).await {
                warn!(error = %e, "cache write-back upsert failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::SearchProvider;
    use async_trait::async_trait;
    use noetic_storage::LocalVectorStore;

    struct StubEmbedder;
    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str, _hint: EmbeddingHint) -> Result<Vec<f32>> {
            let hash = text.bytes().fold(0u32, |acc, b| acc.wrapping_add(u32::from(b)));
            Ok(vec![(hash % 100) as f32 / 100.0, 1.0 - (hash % 100) as f32 / 100.0])
        }
        async fn embed_batch(&self, texts: &[String], hint: EmbeddingHint) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::new();
            for t in texts {
                out.push(self.embed(t, hint).await?);
            }
            Ok(out)
        }
        fn dimensions(&self) -> usize {
            2
        }
    }

    struct StubProvider;
    #[async_trait]
    impl SearchProvider for StubProvider {
        fn name(&self) -> &'static str {
            "stub"
        }
        async fn search(&self, _request: &SearchRequest) -> Result<Vec<SearchResult>> {
            Ok(vec![SearchResult { title: "T".to_string(), url: "https://x".to_string(), snippet: "S".to_string(), ..Default::default() }])
        }
    }

    #[tokio::test]
    async fn cache_miss_calls_provider_and_writes_back() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn VectorStore> = Arc::new(LocalVectorStore::server(dir.path()));
        store.initialize().await.unwrap();
        let service = WebSearchService::new(Arc::new(StubEmbedder), store.clone(), Arc::new(StubProvider), 0.92);

        let request = SearchRequest::new("query text");
        let response = service.search(&request, "default").await.unwrap();

        assert!(!response.from_cache);
        assert_eq!(response.results.len(), 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn skip_cache_bypasses_cache_probe_even_on_hit() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn VectorStore> = Arc::new(LocalVectorStore::server(dir.path()));
        store.initialize().await.unwrap();
        let service = WebSearchService::new(Arc::new(StubEmbedder), store.clone(), Arc::new(StubProvider), 0.0);

        let mut request = SearchRequest::new("query text");
        request.skip_cache = true;
        let response = service.search(&request, "default").await.unwrap();

        assert!(!response.from_cache);
    }
}
