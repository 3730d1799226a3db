pub mod batch_crawl;
pub mod cache;
pub mod chunk;
pub mod crawl;
pub mod jobs;
pub mod map;
pub mod search;
pub mod sitemap;
