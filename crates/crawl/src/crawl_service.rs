//! `CrawlService`: resolves a single URL fetch through the fetcher
//! resolver. Shared by `MapService` and `BatchCrawlService`.

use noetic_common::types::FetchMode;
use noetic_common::Result;
use noetic_fetch::{FetchRequest, FetchResult, FetcherResolver};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

pub struct CrawlService {
    resolver: Arc<FetcherResolver>,
}

impl CrawlService {
    #[must_use]
    pub fn new(resolver: Arc<FetcherResolver>) -> Self {
        Self { resolver }
    }

    #[instrument(skip(self), fields(url, mode = mode.as_str()))]
    pub async fn crawl(&self, url: &str, mode: &FetchMode) -> Result<FetchResult> {
        let request = FetchRequest::new(url);
        self.resolver.resolve(&request, mode).await
    }

    #[instrument(skip(self), fields(url))]
    pub async fn crawl_with_timeout(&self, url: &str, mode: &FetchMode, timeout: Duration) -> Result<FetchResult> {
        let mut request = FetchRequest::new(url);
        request.timeout = timeout;
        self.resolver.resolve(&request, mode).await
    }
}
