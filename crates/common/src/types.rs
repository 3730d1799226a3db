//! Closed enumerations and small value types shared across crates.
//!
//! Treated as sum types throughout, not open hierarchies: `PageAction`,
//! `Freshness`, `SearchDepth`, `OutputFormat`, `ProxyKind`, `JobState`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Output format requested for extracted page content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Html,
    Text,
    Markdown,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Markdown
    }
}

/// Freshness constraint on a search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    None,
    Day,
    Week,
    Month,
    Year,
}

impl Default for Freshness {
    fn default() -> Self {
        Freshness::None
    }
}

/// Requested search depth; providers may not honour `Advanced`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchDepth {
    Basic,
    Advanced,
}

impl Default for SearchDepth {
    fn default() -> Self {
        SearchDepth::Basic
    }
}

/// Proxy transport in front of the static/dynamic fetchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyKind {
    None,
    Http,
    Socks4,
    Socks5,
}

impl Default for ProxyKind {
    fn default() -> Self {
        ProxyKind::None
    }
}

/// A single scripted interaction step for the dynamic fetcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PageAction {
    Click { selector: String },
    Type { selector: String, value: String },
    Scroll { pixels: i64 },
    Wait { ms: u64 },
    WaitForSelector { selector: String },
}

impl PageAction {
    /// Optional post-delay attached out-of-band by the caller (ms).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            PageAction::Click { .. } => "click",
            PageAction::Type { .. } => "type",
            PageAction::Scroll { .. } => "scroll",
            PageAction::Wait { .. } => "wait",
            PageAction::WaitForSelector { .. } => "wait_for_selector",
        }
    }
}

/// Explicit fetcher selection mode, or automatic resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    Auto,
    Named(String),
}

impl Default for FetchMode {
    fn default() -> Self {
        FetchMode::Auto
    }
}

impl FetchMode {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            FetchMode::Auto => "auto",
            FetchMode::Named(name) => name,
        }
    }
}

/// Job lifecycle state for the async batch-crawl registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Cancelled,
    Failed,
}

/// Embedding intent hint; local embedders are free to ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingHint {
    Document,
    Query,
    Classification,
    Clustering,
}

/// Entry-type tag; drives TTL class selection in the eviction policy.
pub type EntryType = String;

pub const ENTRY_TYPE_SEARCH_RESULT: &str = "search_result";
pub const ENTRY_TYPE_QUERY_CACHE: &str = "query_cache";
pub const ENTRY_TYPE_CRAWL_CHUNK: &str = "crawl_chunk";

pub const DEFAULT_NAMESPACE: &str = "default";

/// Conjunction of equality constraints over metadata, plus optional
/// `createdAt` epoch bounds. Shared by search and eviction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataFilter {
    pub equals: HashMap<String, String>,
    pub entry_type: Option<String>,
    pub created_after: Option<i64>,
    pub created_before: Option<i64>,
}

impl MetadataFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entry_type(mut self, entry_type: impl Into<String>) -> Self {
        self.entry_type = Some(entry_type.into());
        self
    }

    #[must_use]
    pub fn with_created_before(mut self, epoch: i64) -> Self {
        self.created_before = Some(epoch);
        self
    }

    #[must_use]
    pub fn with_created_after(mut self, epoch: i64) -> Self {
        self.created_after = Some(epoch);
        self
    }

    #[must_use]
    pub fn with_equals(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.equals.insert(key.into(), value.into());
        self
    }
}
