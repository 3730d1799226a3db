//! `DynamicFetcher`: headless-browser rendering via a pooled Chromium
//! instance, falling back to the static path when no browser binary is
//! available.

use crate::browser_pool::BrowserPool;
use crate::extractor::ContentExtractor;
use crate::fetcher::Fetcher;
use crate::static_fetcher::StaticFetcher;
use crate::types::{FetchRequest, FetchResult};
use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::cdp::browser_protocol::page::ScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use noetic_common::types::PageAction;
use noetic_common::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{instrument, warn};

const STEALTH_SCRIPT: &str = "Object.defineProperty(navigator, 'webdriver', { get: () => undefined });";

pub struct DynamicFetcher {
    pool: Arc<BrowserPool>,
    fallback: StaticFetcher,
    available: bool,
}

impl DynamicFetcher {
    #[must_use]
    pub fn new(pool: Arc<BrowserPool>, fallback: StaticFetcher, chromium_path: Option<&str>) -> Self {
        Self { pool, fallback, available: detect_browser_binary(chromium_path).is_some() }
    }
}

fn detect_browser_binary(explicit: Option<&str>) -> Option<String> {
    if let Some(path) = explicit {
        if Path::new(path).exists() {
            return Some(path.to_string());
        }
    }
    const WELL_KNOWN: &[&str] = &[
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
    ];
    for candidate in WELL_KNOWN {
        if Path::new(candidate).exists() {
            return Some((*candidate).to_string());
        }
    }
    which_chromium()
}

fn which_chromium() -> Option<String> {
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(output) = std::process::Command::new("which").arg(name).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    return Some(path);
                }
            }
        }
    }
    None
}

#[async_trait]
impl Fetcher for DynamicFetcher {
    fn name(&self) -> &'static str {
        "dynamic"
    }

    fn supports(&self, _request: &FetchRequest) -> bool {
        true
    }

    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResult> {
        if !self.available {
            warn!("no chromium binary detected, falling back to static fetch");
            return self.fallback.fetch(request).await;
        }

        let started = Instant::now();
        let pooled = self.pool.acquire(request.timeout).await?;
        let mut healthy = true;

        let outcome = self.render(&pooled.browser, request, started).await;
        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "dynamic render failed, falling back to static fetch");
                healthy = false;
                self.pool.release(pooled, healthy).await;
                return self.fallback.fetch(request).await;
            }
        };

        self.pool.release(pooled, healthy).await;
        Ok(result)
    }
}

impl DynamicFetcher {
    async fn render(&self, browser: &chromiumoxide::Browser, request: &FetchRequest, started: Instant) -> Result<FetchResult> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| noetic_common::Error::ProviderUnavailable(format!("new page: {e}")))?;

        if request.mobile {
            let _ = page
                .set_viewport(chromiumoxide::page::Viewport { width: 390, height: 844, device_scale_factor: Some(2.0), ..Default::default() })
                .await;
        }
        if !request.headers.is_empty() {
            let _ = page.set_extra_headers(request.headers.clone()).await;
        }
        let _ = page.evaluate_on_new_document(STEALTH_SCRIPT).await;

        page.goto(&request.url).await.map_err(|e| noetic_common::Error::FetchFailure(format!("navigate failed: {e}")))?;

        // `wait_for_network_idle` selects the navigation-wait condition upstream
        // in chromiumoxide's page config; both paths settle on the same
        // navigation future here.
        let _ = tokio::time::timeout(request.timeout, page.wait_for_navigation()).await;

        if let Some(selector) = &request.wait_for_selector {
            let _ = tokio::time::timeout(request.timeout, page.find_element(selector)).await;
        }

        for action in &request.actions {
            if let Err(e) = apply_action(&page, action).await {
                warn!(error = %e, action = action.kind(), "page action failed");
            }
        }

        let screenshot_base64 = if request.screenshot {
            page.screenshot(ScreenshotParams::builder().format(ScreenshotFormat::Png).build())
                .await
                .ok()
                .map(|bytes| base64::engine::general_purpose::STANDARD.encode(bytes))
        } else {
            None
        };

        let html = page
            .content()
            .await
            .map_err(|e| noetic_common::Error::FetchFailure(format!("content read failed: {e}")))?;
        let final_url = page.url().await.ok().flatten().unwrap_or_else(|| request.url.clone());
        let _ = page.close().await;

        let extracted = ContentExtractor::extract(&html, &final_url, request.output_format, request.include_links, request.include_images);

        Ok(FetchResult {
            final_url,
            title: extracted.title,
            content: extracted.content,
            raw_html: html,
            links: extracted.links,
            images: extracted.images,
            word_count: extracted.word_count,
            status: 200,
            fetcher_used: "dynamic".to_string(),
            elapsed: started.elapsed(),
            screenshot_base64,
            provider_meta: Default::default(),
        })
    }
}

async fn apply_action(page: &chromiumoxide::Page, action: &PageAction) -> Result<()> {
    match action {
        PageAction::Click { selector } => {
            let element = page.find_element(selector).await.map_err(|e| noetic_common::Error::FetchFailure(e.to_string()))?;
            element.click().await.map_err(|e| noetic_common::Error::FetchFailure(e.to_string()))?;
        }
        PageAction::Type { selector, value } => {
            let element = page.find_element(selector).await.map_err(|e| noetic_common::Error::FetchFailure(e.to_string()))?;
            element.type_str(value).await.map_err(|e| noetic_common::Error::FetchFailure(e.to_string()))?;
        }
        PageAction::Scroll { pixels } => {
            let script = format!("window.scrollBy(0, {pixels});");
            page.evaluate(script).await.map_err(|e| noetic_common::Error::FetchFailure(e.to_string()))?;
        }
        PageAction::Wait { ms } => {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }
        PageAction::WaitForSelector { selector } => {
            page.find_element(selector).await.map_err(|e| noetic_common::Error::FetchFailure(e.to_string()))?;
        }
    }
    Ok(())
}
