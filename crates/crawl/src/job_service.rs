//! `JobService`: an in-memory registry of async batch-crawl jobs.
//!
//! Cancellation is cooperative: a cancelled job's worker task checks a
//! flag at per-URL loop boundaries rather than aborting in-flight
//! requests.

use crate::batch_crawl_service::{BatchCrawlReport, BatchCrawlRequest, BatchCrawlService};
use noetic_common::types::JobState;
use noetic_common::{Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

struct JobEntry {
    state: JobState,
    report: Option<BatchCrawlReport>,
    error: Option<String>,
    cancel_flag: Arc<AtomicBool>,
    started_at: Instant,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct JobStatus {
    pub id: String,
    pub state: JobState,
    pub report: Option<BatchCrawlReport>,
    pub error: Option<String>,
    pub elapsed_ms: u128,
}

pub struct JobService {
    batch_crawl: Arc<BatchCrawlService>,
    jobs: Arc<RwLock<HashMap<String, JobEntry>>>,
}

impl JobService {
    #[must_use]
    pub fn new(batch_crawl: Arc<BatchCrawlService>) -> Self {
        Self { batch_crawl, jobs: Arc::new(RwLock::new(HashMap::new())) }
    }

    #[instrument(skip(self, request))]
    pub async fn submit(&self, request: BatchCrawlRequest) -> String {
        let id = Uuid::new_v4().to_string();
        let cancel_flag = Arc::new(AtomicBool::new(false));

        self.jobs.write().await.insert(
            id.clone(),
            JobEntry { state: JobState::Pending, report: None, error: None, cancel_flag: cancel_flag.clone(), started_at: Instant::now() },
        );

        let jobs = self.jobs.clone();
        let batch_crawl = self.batch_crawl.clone();
        let job_id = id.clone();
        let worker_cancel_flag = cancel_flag.clone();

        tokio::spawn(async move {
            if let Some(entry) = jobs.write().await.get_mut(&job_id) {
                entry.state = JobState::Running;
            }

            let outcome = batch_crawl.batch_crawl_cancellable(request, worker_cancel_flag).await;

            let mut jobs = jobs.write().await;
            let Some(entry) = jobs.get_mut(&job_id) else { return };

            if entry.cancel_flag.load(Ordering::SeqCst) {
                entry.state = JobState::Cancelled;
                return;
            }

            match outcome {
                Ok(report) => {
                    info!(job_id, crawled = report.crawled, failed = report.failed, "batch crawl job completed");
                    entry.report = Some(report);
                    entry.state = JobState::Completed;
                }
                Err(e) => {
                    warn!(job_id, error = %e, "batch crawl job failed");
                    entry.error = Some(e.to_string());
                    entry.state = JobState::Failed;
                }
            }
        });

        id
    }

    #[instrument(skip(self))]
    pub async fn status(&self, job_id: &str) -> Result<JobStatus> {
        let jobs = self.jobs.read().await;
        let entry = jobs.get(job_id).ok_or_else(|| Error::NotFound(format!("job {job_id} not found")))?;
        Ok(JobStatus {
            id: job_id.to_string(),
            state: entry.state,
            report: entry.report.clone(),
            error: entry.error.clone(),
            elapsed_ms: entry.started_at.elapsed().as_millis(),
        })
    }

    /// Best-effort cancellation. The running worker observes the flag at
    /// its next per-URL boundary; in-flight requests are not interrupted.
    #[instrument(skip(self))]
    pub async fn cancel(&self, job_id: &str) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        let entry = jobs.get_mut(job_id).ok_or_else(|| Error::NotFound(format!("job {job_id} not found")))?;
        if matches!(entry.state, JobState::Completed | JobState::Failed | JobState::Cancelled) {
            return Ok(());
        }
        entry.cancel_flag.store(true, Ordering::SeqCst);
        entry.state = JobState::Cancelled;
        Ok(())
    }

    pub async fn list(&self) -> Vec<JobStatus> {
        let jobs = self.jobs.read().await;
        jobs.iter()
            .map(|(id, entry)| JobStatus {
                id: id.clone(),
                state: entry.state,
                report: entry.report.clone(),
                error: entry.error.clone(),
                elapsed_ms: entry.started_at.elapsed().as_millis(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl_service::CrawlService;
    use crate::sitemap::SitemapParser;
    use async_trait::async_trait;
    use noetic_common::types::EmbeddingHint;
    use noetic_fetch::FetcherResolver;
    use noetic_indexing::{ChunkService, Embedder};
    use noetic_storage::LocalVectorStore;
    use std::sync::Arc;

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

    fn job_service(dir: &std::path::Path) -> JobService {
        let resolver = Arc::new(FetcherResolver::new(Vec::new(), Vec::new(), Vec::new()));
        let crawl = Arc::new(CrawlService::new(resolver));
        let sitemap = Arc::new(SitemapParser::new());
        let store: Arc<dyn noetic_storage::VectorStore> = Arc::new(LocalVectorStore::server(dir));
        let embedder: Arc<dyn Embedder> = Arc::new(StubEmbedder);
        let chunk = Arc::new(ChunkService::new(embedder, store));
        let batch = Arc::new(BatchCrawlService::new(crawl, sitemap, chunk));
        JobService::new(batch)
    }

    #[tokio::test]
    async fn status_on_unknown_job_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let svc = job_service(dir.path());
        let err = svc.status("does-not-exist").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn cancel_on_unknown_job_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let svc = job_service(dir.path());
        let err = svc.cancel("does-not-exist").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn list_includes_submitted_job() {
        let dir = tempfile::tempdir().unwrap();
        let svc = job_service(dir.path());
        let id = svc
            .submit(BatchCrawlRequest {
                urls: vec![],
                domain: None,
                fetch_mode: noetic_common::types::FetchMode::Auto,
                chunk_strategy: "sentence".to_string(),
                max_concurrency: 2,
                rate_limit_ms: 0,
                path_filter: None,
                max_urls: 10,
                auto_chunk: false,
                namespace: "default".to_string(),
            })
            .await;
        let jobs = svc.list().await;
        assert!(jobs.iter().any(|j| j.id == id));
    }
}
