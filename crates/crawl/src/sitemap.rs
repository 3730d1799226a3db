//! `SitemapParser`: robots.txt-driven and well-known-path sitemap
//! discovery, with bounded index recursion and a path filter.

use noetic_common::{Error, Result};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

const MAX_INDEX_DEPTH: u32 = 3;

pub struct SitemapParser {
    client: reqwest::Client,
}

impl SitemapParser {
    #[must_use]
    pub fn new() -> Self {
        Self { client: reqwest::Client::builder().timeout(std::time::Duration::from_secs(10)).build().unwrap_or_default() }
    }

    #[instrument(skip(self), fields(domain, max_urls))]
    pub async fn discover(&self, domain: &str, max_urls: usize, path_filter: Option<&str>) -> Result<Vec<String>> {
        let filter = path_filter.map(Regex::new).transpose().map_err(|e| Error::InvalidInput(format!("invalid pathFilter: {e}")))?;

        let sitemap_urls = self.sitemaps_from_robots(domain).await;
        let sitemap_urls = if sitemap_urls.is_empty() { self.well_known_sitemaps(domain) } else { sitemap_urls };

        let mut seen = HashSet::new();
        let mut urls = Vec::new();
        for sitemap_url in sitemap_urls {
            self.collect(&sitemap_url, 0, &filter, &mut seen, &mut urls, max_urls).await;
            if urls.len() >= max_urls {
                break;
            }
        }
        urls.truncate(max_urls);
        Ok(urls)
    }

    async fn sitemaps_from_robots(&self, domain: &str) -> Vec<String> {
        let robots_url = format!("https://{domain}/robots.txt");
        let Ok(response) = self.client.get(&robots_url).send().await else { return Vec::new() };
        let Ok(body) = response.text().await else { return Vec::new() };
        body.lines()
            .filter_map(|line| line.trim().strip_prefix("Sitemap:").or_else(|| line.trim().strip_prefix("sitemap:")))
            .map(|s| s.trim().to_string())
            .collect()
    }

    fn well_known_sitemaps(&self, domain: &str) -> Vec<String> {
        vec![format!("https://{domain}/sitemap.xml"), format!("https://{domain}/sitemap_index.xml")]
    }

    fn collect<'a>(
        &'a self,
        sitemap_url: &'a str,
        depth: u32,
        filter: &'a Option<Regex>,
        seen: &'a mut HashSet<String>,
        urls: &'a mut Vec<String>,
        max_urls: usize,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            if depth > MAX_INDEX_DEPTH || urls.len() >= max_urls || !seen.insert(sitemap_url.to_string()) {
                return;
            }

            let Ok(response) = self.client.get(sitemap_url).send().await else {
                warn!(sitemap_url, "sitemap fetch failed");
                return;
            };
            let Ok(body) = response.text().await else { return };

            let (child_sitemaps, page_urls) = parse_sitemap_xml(&body);

            for url in page_urls {
                if filter.as_ref().map_or(true, |re| re.is_match(&url)) {
                    urls.push(url);
                    if urls.len() >= max_urls {
                        return;
                    }
                }
            }

            for child in child_sitemaps {
                self.collect(&child, depth + 1, filter, seen, urls, max_urls).await;
                if urls.len() >= max_urls {
                    return;
                }
            }
        })
    }
}

impl Default for SitemapParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns `(child sitemap locs from a sitemapindex, page locs from a urlset)`.
fn parse_sitemap_xml(xml: &str) -> (Vec<String>, Vec<String>) {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text = true;

    let mut child_sitemaps = Vec::new();
    let mut page_urls = Vec::new();
    let mut in_sitemap_tag = false;
    let mut in_url_tag = false;
    let mut in_loc = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"sitemap" => in_sitemap_tag = true,
                b"url" => in_url_tag = true,
                b"loc" => in_loc = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"sitemap" => in_sitemap_tag = false,
                b"url" => in_url_tag = false,
                b"loc" => in_loc = false,
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_loc {
                    let text = e.unescape().unwrap_or_default().to_string();
                    if in_sitemap_tag {
                        child_sitemaps.push(text);
                    } else if in_url_tag {
                        page_urls.push(text);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                debug!(error = %e, "sitemap xml parse error");
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    (child_sitemaps, page_urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_urlset_locs() {
        let xml = r#"<?xml version="1.0"?><urlset><url><loc>https://a.com/1</loc></url><url><loc>https://a.com/2</loc></url></urlset>"#;
        let (children, urls) = parse_sitemap_xml(xml);
        assert!(children.is_empty());
        assert_eq!(urls, vec!["https://a.com/1", "https://a.com/2"]);
    }

    #[test]
    fn parses_sitemapindex_locs_as_children() {
        let xml = r#"<?xml version="1.0"?><sitemapindex><sitemap><loc>https://a.com/sitemap1.xml</loc></sitemap></sitemapindex>"#;
        let (children, urls) = parse_sitemap_xml(xml);
        assert_eq!(children, vec!["https://a.com/sitemap1.xml"]);
        assert!(urls.is_empty());
    }
}
