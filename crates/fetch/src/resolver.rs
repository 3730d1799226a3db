//! `FetcherResolver`: capability + rule + memory + chain selection with
//! SPA auto-detection and per-domain learning.

use crate::fetcher::{looks_like_spa_shell, Fetcher};
use crate::types::{FetchRequest, FetchResult};
use dashmap::DashMap;
use noetic_common::types::FetchMode;
use noetic_common::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// An ordered `(glob, fetcher)` pair. Globs support `*` (not `/`), `**`
/// (any), and literal `.`; matching is case-insensitive on the whole URL.
#[derive(Debug, Clone)]
pub struct DomainRule {
    pub glob: String,
    pub fetcher: String,
}

pub struct FetcherResolver {
    fetchers: HashMap<String, Arc<dyn Fetcher>>,
    domain_rules: Vec<DomainRule>,
    fallback_chain: Vec<String>,
    domain_memory: DashMap<String, String>,
}

impl FetcherResolver {
    #[must_use]
    pub fn new(fetchers: Vec<Arc<dyn Fetcher>>, domain_rules: Vec<DomainRule>, fallback_chain: Vec<String>) -> Self {
        let fetchers = fetchers.into_iter().map(|f| (f.name().to_string(), f)).collect();
        Self { fetchers, domain_rules, fallback_chain, domain_memory: DashMap::new() }
    }

    #[instrument(skip(self, request), fields(url = %request.url, mode = mode.as_str()))]
    pub async fn resolve(&self, request: &FetchRequest, mode: &FetchMode) -> Result<FetchResult> {
        if let FetchMode::Named(name) = mode {
            let fetcher = self
                .fetchers
                .get(name)
                .ok_or_else(|| Error::InvalidInput(format!("unknown fetcher: {name}")))?;
            return fetcher.fetch(request).await;
        }

        if let Some(fetcher_name) = self.match_domain_rule(&request.url) {
            if let Some(fetcher) = self.fetchers.get(&fetcher_name) {
                debug!(fetcher = %fetcher_name, "resolved via domain rule");
                return fetcher.fetch(request).await;
            }
        }

        let host = host_of(&request.url);
        if let Some(host) = &host {
            if let Some(remembered) = self.domain_memory.get(host).map(|v| v.clone()) {
                if let Some(fetcher) = self.fetchers.get(&remembered) {
                    if let Ok(result) = fetcher.fetch(request).await {
                        if !looks_like_spa_shell(result.content.len(), &result.raw_html) {
                            debug!(fetcher = %remembered, "resolved via domain memory");
                            return Ok(result);
                        }
                    }
                }
            }
        }

        self.run_fallback_chain(request, host.as_deref()).await
    }

    fn match_domain_rule(&self, url: &str) -> Option<String> {
        let lower = url.to_lowercase();
        self.domain_rules.iter().find(|rule| glob_match(&rule.glob.to_lowercase(), &lower)).map(|rule| rule.fetcher.clone())
    }

    async fn run_fallback_chain(&self, request: &FetchRequest, host: Option<&str>) -> Result<FetchResult> {
        let chain_len = self.fallback_chain.len();
        for (idx, name) in self.fallback_chain.iter().enumerate() {
            let Some(fetcher) = self.fetchers.get(name) else { continue };
            if !fetcher.supports(request) {
                continue;
            }

            let result = match fetcher.fetch(request).await {
                Ok(r) => r,
                Err(e) => {
                    warn!(fetcher = %name, error = %e, "fetcher failed, continuing chain");
                    continue;
                }
            };

            let is_last = idx + 1 == chain_len;
            if is_last || !looks_like_spa_shell(result.content.len(), &result.raw_html) {
                return Ok(result);
            }

            if let Some(host) = host {
                if let Some(next) = self.fallback_chain.get(idx + 1) {
                    debug!(host, next, "recording domain memory after SPA rejection");
                    self.domain_memory.insert(host.to_string(), next.clone());
                }
            }
        }

        Err(Error::FetchFailure(format!("fetch chain exhausted for {}", request.url)))
    }
}

fn host_of(url: &str) -> Option<String> {
    Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_string))
}

/// Minimal glob matcher: `*` matches any run of non-`/` characters, `**`
/// matches anything, `.` is literal.
fn glob_match(glob: &str, text: &str) -> bool {
    let pattern = regex::escape(glob).replace(r"\*\*", ".*").replace(r"\*", "[^/]*");
    regex::Regex::new(&format!("^{pattern}$")).map(|re| re.is_match(text)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_matches_literal_dots_and_single_star() {
        assert!(glob_match("*.example.com/*", "https://sub.example.com/path"));
        assert!(!glob_match("*.example.com/*", "https://sub.exampleXcom/path"));
    }

    #[test]
    fn glob_double_star_matches_any_depth() {
        assert!(glob_match("**example.com**", "https://a.b.example.com/x/y/z"));
    }

    struct StubFetcher {
        name: &'static str,
        content: String,
        raw_html: String,
    }

    #[async_trait::async_trait]
    impl Fetcher for StubFetcher {
        fn name(&self) -> &'static str {
            self.name
        }
        fn supports(&self, _request: &FetchRequest) -> bool {
            true
        }
        async fn fetch(&self, _request: &FetchRequest) -> Result<FetchResult> {
            Ok(FetchResult {
                content: self.content.clone(),
                raw_html: self.raw_html.clone(),
                fetcher_used: self.name.to_string(),
                status: 200,
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn spa_shell_falls_through_to_next_fetcher_in_chain() {
        let shell: Arc<dyn Fetcher> = Arc::new(StubFetcher {
            name: "static",
            content: "tiny".to_string(),
            raw_html: "<div id=\"root\"></div>".to_string(),
        });
        let full: Arc<dyn Fetcher> = Arc::new(StubFetcher {
            name: "dynamic",
            content: "a".repeat(200),
            raw_html: "<html>real content here in full</html>".to_string(),
        });
        let resolver = FetcherResolver::new(vec![shell, full], Vec::new(), vec!["static".to_string(), "dynamic".to_string()]);

        let request = FetchRequest::new("https://example.com/spa");
        let result = resolver.resolve(&request, &FetchMode::Auto).await.unwrap();

        assert_eq!(result.fetcher_used, "dynamic");
        assert_eq!(resolver.domain_memory.get("example.com").map(|v| v.clone()), Some("dynamic".to_string()));
    }

    #[tokio::test]
    async fn last_fetcher_in_chain_is_accepted_regardless_of_heuristic() {
        let only: Arc<dyn Fetcher> = Arc::new(StubFetcher { name: "static", content: "x".to_string(), raw_html: "<div id=\"root\"></div>".to_string() });
        let resolver = FetcherResolver::new(vec![only], Vec::new(), vec!["static".to_string()]);

        let request = FetchRequest::new("https://example.com/spa");
        let result = resolver.resolve(&request, &FetchMode::Auto).await.unwrap();

        assert_eq!(result.fetcher_used, "static");
    }

    #[tokio::test]
    async fn explicit_named_mode_bypasses_the_chain() {
        let a: Arc<dyn Fetcher> = Arc::new(StubFetcher { name: "static", content: "ignored".to_string(), raw_html: String::new() });
        let b: Arc<dyn Fetcher> = Arc::new(StubFetcher { name: "dynamic", content: "chosen".to_string(), raw_html: String::new() });
        let resolver = FetcherResolver::new(vec![a, b], Vec::new(), vec!["static".to_string(), "dynamic".to_string()]);

        let request = FetchRequest::new("https://example.com");
        let result = resolver.resolve(&request, &FetchMode::Named("dynamic".to_string())).await.unwrap();

        assert_eq!(result.content, "chosen");
    }
}
