//! Search value types.

use noetic_common::types::{Freshness, SearchDepth};
use std::collections::HashSet;

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: usize,
    pub freshness: Freshness,
    pub language: Option<String>,
    pub country: Option<String>,
    pub include_domains: HashSet<String>,
    pub exclude_domains: HashSet<String>,
    pub safe_search: bool,
    pub depth: SearchDepth,
    pub skip_cache: bool,
}

impl SearchRequest {
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: 10,
            freshness: Freshness::None,
            language: None,
            country: None,
            include_domains: HashSet::new(),
            exclude_domains: HashSet::new(),
            safe_search: false,
            depth: SearchDepth::Basic,
            skip_cache: false,
        }
    }
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self::new("")
    }
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub extra_snippets: Vec<String>,
    pub raw_content: Option<String>,
    pub score: f32,
    pub published_date: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SearchResponse {
    pub provider: String,
    pub from_cache: bool,
    pub results: Vec<SearchResult>,
    pub elapsed_ms: u128,
}
