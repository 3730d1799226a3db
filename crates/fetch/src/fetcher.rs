//! The `Fetcher` capability implemented by every concrete fetch strategy.

use crate::types::{FetchRequest, FetchResult};
use async_trait::async_trait;
use noetic_common::Result;

#[async_trait]
pub trait Fetcher: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cheap, synchronous check used by the resolver's fallback chain
    /// before committing to a potentially expensive fetch.
    fn supports(&self, request: &FetchRequest) -> bool;

    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResult>;
}

pub const MIN_CONTENT_LENGTH: usize = 100;

pub const SPA_MARKERS: &[&str] = &[
    "<div id=\"root\"></div>",
    "<div id=\"__next\"></div>",
    "<div id=\"__next\">",
    "<div id=\"app\"></div>",
    "<div id=\"__nuxt\"></div>",
    "<noscript>You need to enable JavaScript",
    "<noscript>Please enable JavaScript",
    "<noscript>This app works best with JavaScript enabled",
    "window.__INITIAL_STATE__",
    "window.__NEXT_DATA__",
];

/// True when a result looks like an un-rendered SPA shell rather than
/// real content — triggers the resolver's fallback to the next fetcher.
#[must_use]
pub fn looks_like_spa_shell(content_len: usize, raw_html: &str) -> bool {
    content_len < MIN_CONTENT_LENGTH || SPA_MARKERS.iter().any(|marker| raw_html.contains(marker))
}
