//! The default `SearchProvider`: scrapes a privacy-respecting HTML search
//! endpoint (DuckDuckGo's HTML front end by default) behind an optional
//! SOCKS5 proxy with per-request stream isolation.

use crate::provider::SearchProvider;
use crate::stream_isolation::StreamIsolation;
use crate::types::{SearchRequest, SearchResult};
use async_trait::async_trait;
use noetic_common::Result;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{info, instrument, warn};

pub struct ScrapingSearchProvider {
    endpoint: String,
    proxy_url: Option<String>,
    isolation: Option<StreamIsolation>,
    timeout: Duration,
}

impl ScrapingSearchProvider {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, proxy_url: Option<String>, rotate_every: u32, timeout: Duration) -> Self {
        let isolation = proxy_url.as_ref().map(|_| StreamIsolation::new(rotate_every));
        Self { endpoint: endpoint.into(), proxy_url, isolation, timeout }
    }

    fn build_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout);
        if let (Some(proxy_url), Some(isolation)) = (&self.proxy_url, &self.isolation) {
            let (user, pass) = isolation.credentials();
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| noetic_common::Error::ProviderUnavailable(format!("invalid proxy url: {e}")))?
                .basic_auth(&user, &pass);
            builder = builder.proxy(proxy);
        }
        builder.build().map_err(|e| noetic_common::Error::ProviderUnavailable(format!("client build failed: {e}")))
    }

    #[instrument(skip(self), fields(query_len = request.query.len()))]
    async fn run_query(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        let client = self.build_client()?;
        let url = format!("{}?q={}", self.endpoint, urlencoding::encode(&request.query));

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| noetic_common::Error::ProviderUnavailable(format!("scraping search request failed: {e}")))?;

        let body = response
            .text()
            .await
            .map_err(|e| noetic_common::Error::ProviderUnavailable(format!("scraping search body read failed: {e}")))?;

        Ok(parse_results(&body, request.max_results))
    }
}

fn parse_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    let document = Html::parse_document(html);
    let result_selector = Selector::parse(".result").unwrap();
    let title_selector = Selector::parse(".result__title a, .result__a").unwrap();
    let snippet_selector = Selector::parse(".result__snippet").unwrap();

    let mut results = Vec::new();
    for node in document.select(&result_selector) {
        let Some(title_el) = node.select(&title_selector).next() else { continue };
        let title = title_el.text().collect::<String>().trim().to_string();
        let url = title_el.value().attr("href").unwrap_or_default().to_string();
        let snippet = node.select(&snippet_selector).next().map(|el| el.text().collect::<String>().trim().to_string()).unwrap_or_default();
        if title.is_empty() || url.is_empty() {
            continue;
        }
        results.push(SearchResult { title, url, snippet, extra_snippets: Vec::new(), raw_content: None, score: 0.0, published_date: None });
        if results.len() >= max_results {
            break;
        }
    }
    results
}

#[async_trait]
impl SearchProvider for ScrapingSearchProvider {
    fn name(&self) -> &'static str {
        "scraping"
    }

    #[instrument(skip(self, request), fields(query_len = request.query.len()))]
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        let results = self.run_query(request).await?;

        if results.is_empty() {
            if let Some(isolation) = &self.isolation {
                warn!("live search returned zero results, rotating stream and retrying once");
                isolation.rotate();
                tokio::time::sleep(Duration::from_millis(500)).await;
                let retried = self.run_query(request).await?;
                info!(count = retried.len(), "retry after stream rotation complete");
                return Ok(retried);
            }
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SAMPLE_HTML: &str = r#"
        <html><body>
        <div class="result">
            <a class="result__a" href="https://example.com/a">Example A</a>
            <div class="result__snippet">First snippet</div>
        </div>
        <div class="result">
            <a class="result__a" href="https://example.com/b">Example B</a>
            <div class="result__snippet">Second snippet</div>
        </div>
        </body></html>
    "#;

    #[tokio::test]
    async fn parses_title_url_and_snippet_from_result_blocks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "rust async"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_HTML))
            .mount(&server)
            .await;

        let provider = ScrapingSearchProvider::new(server.uri(), None, 20, Duration::from_secs(5));
        let request = SearchRequest::new("rust async");
        let results = provider.search(&request).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Example A");
        assert_eq!(results[0].url, "https://example.com/a");
        assert_eq!(results[0].snippet, "First snippet");
    }

    #[tokio::test]
    async fn respects_max_results_cap() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_HTML)).mount(&server).await;

        let provider = ScrapingSearchProvider::new(server.uri(), None, 20, Duration::from_secs(5));
        let mut request = SearchRequest::new("q");
        request.max_results = 1;
        let results = provider.search(&request).await.unwrap();

        assert_eq!(results.len(), 1);
    }
}
