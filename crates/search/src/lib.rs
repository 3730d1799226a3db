//! Search-with-cache orchestration: the scraping provider, SOCKS5 stream
//! isolation, the query-path cache, and the full search service.

pub mod cache_service;
pub mod provider;
pub mod scraping_provider;
pub mod stream_isolation;
pub mod types;
pub mod web_search_service;

pub use cache_service::CacheService;
pub use provider::{SearchProvider, UnavailableProvider};
pub use scraping_provider::ScrapingSearchProvider;
pub use stream_isolation::StreamIsolation;
pub use types::{SearchRequest, SearchResponse, SearchResult};
pub use web_search_service::WebSearchService;
