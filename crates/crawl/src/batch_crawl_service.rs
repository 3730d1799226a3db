//! `BatchCrawlService`: discover (or accept) a URL list, then crawl it
//! under bounded concurrency with a single-permit rate limiter, chunking
//! successes and recording failures.

use crate::crawl_service::CrawlService;
use crate::sitemap::SitemapParser;
use noetic_common::types::FetchMode;
use noetic_common::Result;
use noetic_indexing::ChunkService;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{instrument, warn};

const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, serde::Serialize)]
pub struct CrawlFailure {
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct BatchCrawlReport {
    pub total_urls: usize,
    pub crawled: usize,
    pub failed: usize,
    pub chunked: usize,
    pub failures: Vec<CrawlFailure>,
    pub elapsed_ms: u128,
}

pub struct BatchCrawlRequest {
    pub urls: Vec<String>,
    pub domain: Option<String>,
    pub fetch_mode: FetchMode,
    pub chunk_strategy: String,
    pub max_concurrency: usize,
    pub rate_limit_ms: u64,
    pub path_filter: Option<String>,
    pub max_urls: usize,
    pub auto_chunk: bool,
    pub namespace: String,
}

pub struct BatchCrawlService {
    crawl: Arc<CrawlService>,
    sitemap: Arc<SitemapParser>,
    chunk: Arc<ChunkService>,
}

impl BatchCrawlService {
    #[must_use]
    pub fn new(crawl: Arc<CrawlService>, sitemap: Arc<SitemapParser>, chunk: Arc<ChunkService>) -> Self {
        Self { crawl, sitemap, chunk }
    }

    #[instrument(skip(self, request), fields(max_concurrency = request.max_concurrency))]
    pub async fn batch_crawl(&self, request: BatchCrawlRequest) -> Result<BatchCrawlReport> {
        self.batch_crawl_cancellable(request, Arc::new(AtomicBool::new(false))).await
    }

    /// Same as `batch_crawl`, but the dispatch loop checks `cancel` before
    /// starting each new URL. URLs already dispatched still run to
    /// completion; only the ones not yet started are skipped.
    #[instrument(skip(self, request, cancel), fields(max_concurrency = request.max_concurrency))]
    pub async fn batch_crawl_cancellable(&self, request: BatchCrawlRequest, cancel: Arc<AtomicBool>) -> Result<BatchCrawlReport> {
        let started = Instant::now();

        let urls = if let Some(domain) = &request.domain {
            self.sitemap.discover(domain, request.max_urls, request.path_filter.as_deref()).await?
        } else {
            request.urls.clone()
        };
        let total_urls = urls.len();

        let concurrency_limit = Arc::new(Semaphore::new(request.max_concurrency.max(1)));
        let rate_limiter = Arc::new(Semaphore::new(1));
        let crawled = Arc::new(AtomicUsize::new(0));
        let failed = Arc::new(AtomicUsize::new(0));
        let chunked = Arc::new(AtomicUsize::new(0));
        let failures = Arc::new(tokio::sync::Mutex::new(Vec::new()));

        let mut handles = Vec::with_capacity(urls.len());
        for url in urls {
            if cancel.load(Ordering::SeqCst) {
                break;
            }

            let permit = concurrency_limit.clone();
            let rate_limiter = rate_limiter.clone();
            let crawl = self.crawl.clone();
            let chunk = self.chunk.clone();
            let crawled = crawled.clone();
            let failed = failed.clone();
            let chunked = chunked.clone();
            let failures = failures.clone();
            let fetch_mode = request.fetch_mode.clone();
            let chunk_strategy = request.chunk_strategy.clone();
            let namespace = request.namespace.clone();
            let auto_chunk = request.auto_chunk;
            let rate_limit_ms = request.rate_limit_ms;

            let handle = tokio::spawn(async move {
                let _slot = permit.acquire_owned().await.expect("semaphore not closed");

                let rate_permit = rate_limiter.acquire_owned().await.expect("rate limiter not closed");
                let outcome = tokio::time::timeout(DEFAULT_TASK_TIMEOUT, crawl.crawl(&url, &fetch_mode)).await;
                tokio::time::sleep(Duration::from_millis(rate_limit_ms)).await;
                drop(rate_permit);

                match outcome {
                    Ok(Ok(result)) if result.status != 0 => {
                        crawled.fetch_add(1, Ordering::SeqCst);
                        if auto_chunk && !result.content.trim().is_empty() {
                            match chunk.chunk(&result.content, &chunk_strategy, 1000, 100, Some(&url), &namespace).await {
                                Ok(outcome) => {
                                    chunked.fetch_add(outcome.chunk_count, Ordering::SeqCst);
                                }
                                Err(e) => warn!(url, error = %e, "auto-chunk failed"),
                            }
                        }
                    }
                    Ok(Ok(result)) => {
                        failed.fetch_add(1, Ordering::SeqCst);
                        failures.lock().await.push(CrawlFailure { url: url.clone(), reason: format!("transport failure, status={}", result.status) });
                    }
                    Ok(Err(e)) => {
                        failed.fetch_add(1, Ordering::SeqCst);
                        failures.lock().await.push(CrawlFailure { url: url.clone(), reason: e.to_string() });
                    }
                    Err(_) => {
                        failed.fetch_add(1, Ordering::SeqCst);
                        failures.lock().await.push(CrawlFailure { url: url.clone(), reason: "task timed out".to_string() });
                    }
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            let _ = handle.await;
        }

        Ok(BatchCrawlReport {
            total_urls,
            crawled: crawled.load(Ordering::SeqCst),
            failed: failed.load(Ordering::SeqCst),
            chunked: chunked.load(Ordering::SeqCst),
            failures: Arc::try_unwrap(failures).map(|m| m.into_inner()).unwrap_or_default(),
            elapsed_ms: started.elapsed().as_millis(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use noetic_common::types::EmbeddingHint;
    use noetic_fetch::{FetchRequest, FetchResult, Fetcher, FetcherResolver};
    use noetic_indexing::{ChunkService, Embedder};
    use noetic_storage::LocalVectorStore;
    use std::collections::HashMap;

    struct StubFetcher {
        failing_url: String,
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn supports(&self, _request: &FetchRequest) -> bool {
            true
        }

        async fn fetch(&self, request: &FetchRequest) -> Result<FetchResult> {
            if request.url == self.failing_url {
                return Err(noetic_common::Error::FetchFailure("simulated failure".to_string()));
            }
            Ok(FetchResult {
                final_url: request.url.clone(),
                title: "stub".to_string(),
                content: "stub content long enough to chunk".to_string(),
                raw_html: String::new(),
                links: Vec::new(),
                images: Vec::new(),
                word_count: 5,
                status: 200,
                fetcher_used: "stub".to_string(),
                elapsed: Duration::from_millis(1),
                screenshot_base64: None,
                provider_meta: HashMap::new(),
            })
        }
    }

    #[derive(Default)]
    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, _text: &str, _hint: EmbeddingHint) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }
        async fn embed_batch(&self, texts: &[String], _hint: EmbeddingHint) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
        fn dimensions(&self) -> usize {
            2
        }
    }

    fn service(dir: &std::path::Path, failing_url: &str) -> BatchCrawlService {
        let fetcher: Arc<dyn Fetcher> = Arc::new(StubFetcher { failing_url: failing_url.to_string() });
        let resolver = Arc::new(FetcherResolver::new(vec![fetcher], Vec::new(), vec!["stub".to_string()]));
        let crawl = Arc::new(CrawlService::new(resolver));
        let sitemap = Arc::new(SitemapParser::new());
        let store: Arc<dyn noetic_storage::VectorStore> = Arc::new(LocalVectorStore::server(dir));
        let embedder: Arc<dyn Embedder> = Arc::new(StubEmbedder);
        let chunk = Arc::new(ChunkService::new(embedder, store));
        BatchCrawlService::new(crawl, sitemap, chunk)
    }

    fn request(urls: Vec<&str>, max_concurrency: usize, rate_limit_ms: u64) -> BatchCrawlRequest {
        BatchCrawlRequest {
            urls: urls.into_iter().map(String::from).collect(),
            domain: None,
            fetch_mode: FetchMode::Named("stub".to_string()),
            chunk_strategy: "sentence".to_string(),
            max_concurrency,
            rate_limit_ms,
            path_filter: None,
            max_urls: 100,
            auto_chunk: true,
            namespace: "default".to_string(),
        }
    }

    #[tokio::test]
    async fn reports_per_url_success_and_failure() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path(), "https://x/2");
        let report = svc.batch_crawl(request(vec!["https://x/1", "https://x/2", "https://x/3"], 2, 0)).await.unwrap();

        assert_eq!(report.total_urls, 3);
        assert_eq!(report.crawled, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.chunked, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].url, "https://x/2");
    }

    #[tokio::test]
    async fn rate_limiter_serializes_request_starts() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path(), "");
        let rate_limit_ms = 50;
        let urls = vec!["https://x/1", "https://x/2", "https://x/3"];
        let n = urls.len() as u64;

        let started = Instant::now();
        let report = svc.batch_crawl(request(urls, 1, rate_limit_ms)).await.unwrap();

        assert_eq!(report.crawled, 3);
        assert!(started.elapsed() >= Duration::from_millis((n - 1) * rate_limit_ms));
    }
}
