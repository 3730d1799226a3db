//! `MapService`: BFS link crawl constrained to the start URL's host.

use crate::crawl_service::CrawlService;
use noetic_common::types::FetchMode;
use noetic_common::{Error, Result};
use regex::Regex;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const SHORT_TIMEOUT: Duration = Duration::from_secs(8);

pub struct MapService {
    crawl: Arc<CrawlService>,
}

impl MapService {
    #[must_use]
    pub fn new(crawl: Arc<CrawlService>) -> Self {
        Self { crawl }
    }

    #[instrument(skip(self), fields(start_url, max_depth, max_urls))]
    pub async fn map(&self, start_url: &str, max_depth: u32, max_urls: usize, path_filter: Option<&str>) -> Result<Vec<String>> {
        let filter = path_filter.map(Regex::new).transpose().map_err(|e| Error::InvalidInput(format!("invalid pathFilter: {e}")))?;

        let start = Url::parse(start_url).map_err(|e| Error::InvalidInput(format!("invalid startUrl: {e}")))?;
        let host = start.host_str().ok_or_else(|| Error::InvalidInput("startUrl has no host".to_string()))?.to_string();

        let mut visited: HashSet<String> = HashSet::new();
        let mut ordered: Vec<String> = Vec::new();
        let mut queue: VecDeque<(String, u32)> = VecDeque::new();
        queue.push_back((start.to_string(), 0));

        while let Some((url, depth)) = queue.pop_front() {
            if visited.len() >= max_urls {
                break;
            }
            if visited.contains(&url) {
                continue;
            }
            if depth > max_depth {
                continue;
            }
            visited.insert(url.clone());

            if filter.as_ref().map_or(true, |re| re.is_match(&url)) {
                ordered.push(url.clone());
            }

            if depth < max_depth {
                if let Ok(result) = self.crawl.crawl_with_timeout(&url, &FetchMode::Auto, SHORT_TIMEOUT).await {
                    for link in extract_links_same_host(&result.raw_html, &url, &host) {
                        if !visited.contains(&link) {
                            queue.push_back((link, depth + 1));
                        }
                    }
                } else {
                    debug!(url, "map crawl step failed, skipping links");
                }
            }
        }

        ordered.truncate(max_urls);
        Ok(ordered)
    }
}

fn extract_links_same_host(html: &str, base_url: &str, host: &str) -> Vec<String> {
    let document = scraper::Html::parse_document(html);
    let selector = scraper::Selector::parse("a[href]").unwrap();
    let base = Url::parse(base_url).ok();

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for el in document.select(&selector) {
        let Some(href) = el.value().attr("href") else { continue };
        let Some(resolved) = base.as_ref().and_then(|b| b.join(href).ok()) else { continue };
        if resolved.host_str() != Some(host) {
            continue;
        }
        let mut stripped = resolved.clone();
        stripped.set_fragment(None);
        stripped.set_query(None);
        let normalized = stripped.to_string();
        if seen.insert(normalized.clone()) {
            links.push(normalized);
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_query_and_fragment_and_keeps_same_host_only() {
        let html = r#"<a href="/a?x=1#frag">a</a><a href="https://other.com/b">b</a>"#;
        let links = extract_links_same_host(html, "https://example.com/", "example.com");
        assert_eq!(links, vec!["https://example.com/a".to_string()]);
    }
}
