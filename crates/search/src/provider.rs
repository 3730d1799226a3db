//! `SearchProvider` capability.

use crate::types::{SearchRequest, SearchResult};
use async_trait::async_trait;
use noetic_common::{Error, Result};

#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>>;
}

/// Named third-party providers beyond the default scraping provider live
/// outside this core's scope; the name is kept in config and routing so
/// selecting one fails with a clear configuration error instead of a
/// silent fallback to scraping.
pub struct UnavailableProvider {
    name: &'static str,
}

impl UnavailableProvider {
    #[must_use]
    pub fn brave() -> Self {
        Self { name: "brave" }
    }
    #[must_use]
    pub fn serp() -> Self {
        Self { name: "serp" }
    }
    #[must_use]
    pub fn tavily() -> Self {
        Self { name: "tavily" }
    }
}

#[async_trait]
impl SearchProvider for UnavailableProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn search(&self, _request: &SearchRequest) -> Result<Vec<SearchResult>> {
        Err(Error::ProviderUnavailable(format!("{} search provider is not implemented", self.name)))
    }
}
