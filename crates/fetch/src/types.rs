//! Fetch-pipeline value types.

use noetic_common::types::{OutputFormat, PageAction};
use std::collections::HashMap;
use std::time::Duration;

/// Immutable once built; the resolver and every fetcher read it, none
/// mutate it.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub render_js: bool,
    pub timeout: Duration,
    pub wait_for_network_idle: bool,
    pub wait_for_selector: Option<String>,
    pub include_links: bool,
    pub include_images: bool,
    pub output_format: OutputFormat,
    pub headers: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
    pub mobile: bool,
    pub skip_tls_verify: bool,
    pub screenshot: bool,
    pub actions: Vec<PageAction>,
}

impl FetchRequest {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            render_js: false,
            timeout: Duration::from_secs(30),
            wait_for_network_idle: false,
            wait_for_selector: None,
            include_links: false,
            include_images: false,
            output_format: OutputFormat::Markdown,
            headers: HashMap::new(),
            cookies: HashMap::new(),
            mobile: false,
            skip_tls_verify: false,
            screenshot: false,
            actions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FetchResult {
    pub final_url: String,
    pub title: String,
    pub content: String,
    pub raw_html: String,
    pub links: Vec<String>,
    pub images: Vec<String>,
    pub word_count: usize,
    /// HTTP status; 0 signals a transport-level failure rather than a
    /// server response.
    pub status: u16,
    pub fetcher_used: String,
    pub elapsed: Duration,
    pub screenshot_base64: Option<String>,
    pub provider_meta: HashMap<String, String>,
}

impl FetchResult {
    #[must_use]
    pub fn transport_failure(fetcher_used: &str, elapsed: Duration) -> Self {
        Self {
            status: 0,
            fetcher_used: fetcher_used.to_string(),
            elapsed,
            ..Default::default()
        }
    }
}
