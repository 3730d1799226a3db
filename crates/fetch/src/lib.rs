//! The fetch pipeline: content extraction, static and dynamic fetchers,
//! and the resolver that picks between them.

pub mod browser_pool;
pub mod dynamic_fetcher;
pub mod extractor;
pub mod fetcher;
pub mod resolver;
pub mod static_fetcher;
pub mod types;

pub use browser_pool::{BrowserPool, PooledBrowser};
pub use dynamic_fetcher::DynamicFetcher;
pub use extractor::{ContentExtractor, ExtractedPage};
pub use fetcher::{looks_like_spa_shell, Fetcher, MIN_CONTENT_LENGTH, SPA_MARKERS};
pub use resolver::{DomainRule, FetcherResolver};
pub use static_fetcher::{ProxyConfig, StaticFetcher};
pub use types::{FetchRequest, FetchResult};
