//! `NoeticService`: the facade that wires the storage, indexing, fetch,
//! search, and crawl subsystems together behind one handle, the role the
//! teacher's `OrchestratorSystem` played for its agent layers.
//!
//! Heavy subsystems (vector index, embedder model, browser pool) are only
//! initialized once a transport actually needs them; fast-path commands
//! (version, help) never touch this module.

use noetic_common::config::NoeticConfig;
use noetic_common::types::FetchMode;
use noetic_common::{NamespaceResolver, Result};
use noetic_crawl::{BatchCrawlService, CrawlService, JobService, MapService, SitemapParser};
use noetic_fetch::{DynamicFetcher, FetcherResolver, ProxyConfig, StaticFetcher};
use noetic_indexing::{ChunkService, EvictionService, FastEmbedEmbedder};
use noetic_search::{CacheService, ScrapingSearchProvider, WebSearchService};
use noetic_storage::VectorStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

pub struct NoeticService {
    pub config: NoeticConfig,
    pub namespace: NamespaceResolver,
    pub store: Arc<dyn VectorStore>,
    pub resolver: Arc<FetcherResolver>,
    pub chunk: Arc<ChunkService>,
    pub eviction: Arc<EvictionService>,
    pub cache: Arc<CacheService>,
    pub web_search: Arc<WebSearchService>,
    pub crawl: Arc<CrawlService>,
    pub sitemap: Arc<SitemapParser>,
    pub map: Arc<MapService>,
    pub batch_crawl: Arc<BatchCrawlService>,
    pub jobs: Arc<JobService>,
}

impl NoeticService {
    /// Boots every subsystem the configured transport will need. Called
    /// once per process; a stale `write.lock` in the index directory is
    /// cleared here via `VectorStore::initialize`.
    #[instrument(skip(config), fields(backend = ?config.store.backend, mode = ?config.store.mode))]
    pub async fn start(config: NoeticConfig) -> Result<Self> {
        let store = noetic_storage::build_store(&config)?;
        store.initialize().await?;
        info!("vector store initialized");

        let embedder: Arc<dyn noetic_indexing::Embedder> = Arc::new(FastEmbedEmbedder::new(&config.embed.model_name)?);
        info!(dimensions = embedder.dimensions(), "embedder ready");

        let resolver = Arc::new(Self::build_resolver(&config));

        let namespace = NamespaceResolver::new(config.namespace.clone());
        let chunk = Arc::new(ChunkService::new(embedder.clone(), store.clone()));
        let eviction = Arc::new(EvictionService::new(store.clone(), config.eviction.clone()));
        let cache = Arc::new(CacheService::new(embedder.clone(), store.clone()));

        let provider = Arc::new(ScrapingSearchProvider::new(
            config.search.scraping_endpoint.clone(),
            config.fetch.proxy_url.clone(),
            config.search.stream_rotate_every,
            Duration::from_secs(config.fetch.default_timeout_secs),
        ));
        let web_search = Arc::new(WebSearchService::new(embedder, store.clone(), provider, config.search.cache_threshold));

        let crawl = Arc::new(CrawlService::new(resolver.clone()));
        let sitemap = Arc::new(SitemapParser::new());
        let map = Arc::new(MapService::new(crawl.clone()));
        let batch_crawl = Arc::new(BatchCrawlService::new(crawl.clone(), sitemap.clone(), chunk.clone()));
        let jobs = Arc::new(JobService::new(batch_crawl.clone()));

        Ok(Self { config, namespace, store, resolver, chunk, eviction, cache, web_search, crawl, sitemap, map, batch_crawl, jobs })
    }

    fn build_resolver(config: &NoeticConfig) -> FetcherResolver {
        let proxy = ProxyConfig {
            kind: if config.fetch.proxy_url.is_some() { noetic_common::types::ProxyKind::Socks5 } else { noetic_common::types::ProxyKind::None },
            url: config.fetch.proxy_url.clone(),
        };
        let static_fetcher: Arc<dyn noetic_fetch::Fetcher> = Arc::new(StaticFetcher::new(proxy.clone()));

        let pool = Arc::new(noetic_fetch::BrowserPool::new(config.fetch.browser_pool_size, config.fetch.chromium_path.clone(), config.fetch.proxy_url.clone()));
        let dynamic_fetcher: Arc<dyn noetic_fetch::Fetcher> = Arc::new(DynamicFetcher::new(pool, StaticFetcher::new(proxy), config.fetch.chromium_path.as_deref()));

        FetcherResolver::new(vec![static_fetcher, dynamic_fetcher], Vec::new(), config.fetch.fallback_chain.clone())
    }

    /// Resolve the namespace for one call per the documented priority
    /// chain, then run eviction/search/crawl against it.
    #[must_use]
    pub fn resolve_namespace(&self, explicit: Option<&str>, header: Option<&str>) -> String {
        self.namespace.resolve(explicit, header)
    }

    pub async fn crawl_page(&self, url: &str, mode: FetchMode) -> Result<noetic_fetch::FetchResult> {
        self.crawl.crawl(url, &mode).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.store.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn start_wires_every_subsystem_against_a_temp_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = NoeticConfig::default();
        config.store.backend = noetic_common::config::StoreBackend::Local;
        config.store.mode = noetic_common::config::StoreMode::Server;
        std::env::set_var("HOME", dir.path());

        // FastEmbedEmbedder requires a real ONNX download; this test only
        // exercises the parts of startup that do not need the network.
        let store = noetic_storage::build_store(&config).unwrap();
        store.initialize().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
