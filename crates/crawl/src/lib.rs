//! The crawl subsystem: sitemap discovery, same-host site mapping, and
//! bounded-concurrency batch crawl jobs, all layered over a fetcher
//! resolver shared with the single-URL crawl path.

pub mod batch_crawl_service;
pub mod crawl_service;
pub mod job_service;
pub mod map_service;
pub mod sitemap;

pub use batch_crawl_service::{BatchCrawlReport, BatchCrawlRequest, BatchCrawlService, CrawlFailure};
pub use crawl_service::CrawlService;
pub use job_service::{JobService, JobStatus};
pub use map_service::MapService;
pub use sitemap::SitemapParser;
