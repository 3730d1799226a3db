//! `StaticFetcher`: single HTTP GET, redirect-following, HTML or PDF
//! branching, proxy-aware.

use crate::extractor::ContentExtractor;
use crate::fetcher::Fetcher;
use crate::types::{FetchRequest, FetchResult};
use async_trait::async_trait;
use noetic_common::types::ProxyKind;
use noetic_common::{Error, Result};
use std::time::Instant;
use tracing::{instrument, warn};

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
const DESKTOP_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const MOBILE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

#[derive(Debug, Clone, Default)]
pub struct ProxyConfig {
    pub kind: ProxyKind,
    pub url: Option<String>,
}

pub struct StaticFetcher {
    proxy: ProxyConfig,
}

impl StaticFetcher {
    #[must_use]
    pub fn new(proxy: ProxyConfig) -> Self {
        Self { proxy }
    }

    fn build_client(&self, request: &FetchRequest) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .timeout(request.timeout)
            .danger_accept_invalid_certs(request.skip_tls_verify)
            .user_agent(if request.mobile { MOBILE_UA } else { DESKTOP_UA });

        if self.proxy.kind != ProxyKind::None {
            if let Some(url) = &self.proxy.url {
                let proxy = reqwest::Proxy::all(url).map_err(|e| Error::InvalidInput(format!("invalid proxy url: {e}")))?;
                builder = builder.proxy(proxy);
            }
        }

        builder.build().map_err(|e| Error::FetchFailure(format!("client build failed: {e}")))
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    fn name(&self) -> &'static str {
        "static"
    }

    fn supports(&self, _request: &FetchRequest) -> bool {
        true
    }

    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResult> {
        let started = Instant::now();
        let client = self.build_client(request)?;

        let mut builder = client.get(&request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if !request.cookies.is_empty() {
            let cookie_header = request.cookies.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("; ");
            builder = builder.header(reqwest::header::COOKIE, cookie_header);
        }

        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "static fetch transport failure");
                return Ok(FetchResult::transport_failure("static", started.elapsed()));
            }
        };

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response.headers().get(reqwest::header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or("").to_string();

        let body = match response.bytes().await {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "static fetch body read failure");
                return Ok(FetchResult::transport_failure("static", started.elapsed()));
            }
        };
        let body = if body.len() > MAX_BODY_BYTES { &body[..MAX_BODY_BYTES] } else { &body[..] };

        if content_type.contains("application/pdf") {
            let text = pdf_extract::extract_text_from_mem(body).unwrap_or_default();
            let mut result = FetchResult {
                final_url,
                title: String::new(),
                content: text.clone(),
                raw_html: String::new(),
                links: Vec::new(),
                images: Vec::new(),
                word_count: text.split_whitespace().count(),
                status,
                fetcher_used: "static".to_string(),
                elapsed: started.elapsed(),
                screenshot_base64: None,
                provider_meta: Default::default(),
            };
            result.provider_meta.insert("contentType".to_string(), "application/pdf".to_string());
            return Ok(result);
        }

        let html = String::from_utf8_lossy(body).to_string();
        let page = ContentExtractor::extract(&html, &final_url, request.output_format, request.include_links, request.include_images);

        Ok(FetchResult {
            final_url,
            title: page.title,
            content: page.content,
            raw_html: html,
            links: page.links,
            images: page.images,
            word_count: page.word_count,
            status,
            fetcher_used: "static".to_string(),
            elapsed: started.elapsed(),
            screenshot_base64: None,
            provider_meta: Default::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetches_html_and_extracts_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><head><title>T</title></head><body><main><p>hi</p></main></body></html>"))
            .mount(&server)
            .await;

        let fetcher = StaticFetcher::new(ProxyConfig::default());
        let mut request = FetchRequest::new(format!("{}/page", server.uri()));
        request.output_format = noetic_common::types::OutputFormat::Text;
        let result = fetcher.fetch(&request).await.unwrap();

        assert_eq!(result.status, 200);
        assert_eq!(result.title, "T");
        assert!(result.content.contains("hi"));
    }

    #[tokio::test]
    async fn transport_failure_returns_zero_status_not_error() {
        let fetcher = StaticFetcher::new(ProxyConfig::default());
        let mut request = FetchRequest::new("http://127.0.0.1:1");
        request.timeout = std::time::Duration::from_millis(200);
        let result = fetcher.fetch(&request).await.unwrap();
        assert_eq!(result.status, 0);
    }
}
