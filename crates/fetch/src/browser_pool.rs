//! `BrowserPool`: a bounded, reusable pool of headless-Chromium instances.

use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use noetic_common::{Error, Result};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tracing::{info, instrument, warn};

pub struct PooledBrowser {
    pub browser: Browser,
    healthy: bool,
}

pub struct BrowserPool {
    capacity: usize,
    chromium_path: Option<String>,
    proxy_url: Option<String>,
    idle: Mutex<VecDeque<PooledBrowser>>,
    permits: Arc<Semaphore>,
}

impl BrowserPool {
    #[must_use]
    pub fn new(capacity: usize, chromium_path: Option<String>, proxy_url: Option<String>) -> Self {
        Self {
            capacity,
            chromium_path,
            proxy_url,
            idle: Mutex::new(VecDeque::new()),
            permits: Arc::new(Semaphore::new(capacity)),
        }
    }

    fn build_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder().args(vec![
            "--disable-blink-features=AutomationControlled",
            "--disable-infobars",
            "--no-sandbox",
        ]);
        if let Some(path) = &self.chromium_path {
            builder = builder.chrome_executable(path);
        }
        if let Some(proxy) = &self.proxy_url {
            builder = builder.args(vec![format!("--proxy-server={proxy}")]);
        }
        builder.build().map_err(|e| Error::ProviderUnavailable(format!("browser config: {e}")))
    }

    /// Returns a healthy browser from the idle pool, or launches a new one
    /// within capacity, or waits up to `timeout` for a release.
    #[instrument(skip(self))]
    pub async fn acquire(&self, timeout: Duration) -> Result<PooledBrowser> {
        {
            let mut idle = self.idle.lock().await;
            while let Some(candidate) = idle.pop_front() {
                if candidate.healthy {
                    return Ok(candidate);
                }
            }
        }

        let permit = tokio::time::timeout(timeout, self.permits.clone().acquire_owned())
            .await
            .map_err(|_| Error::ProviderUnavailable("browser pool acquire timed out".to_string()))?
            .map_err(|_| Error::ProviderUnavailable("browser pool closed".to_string()))?;
        permit.forget();

        let config = self.build_config()?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::ProviderUnavailable(format!("chromium launch failed: {e}")))?;
        tokio::spawn(async move { while handler.next().await.is_some() {} });

        Ok(PooledBrowser { browser, healthy: true })
    }

    /// Returns a browser to the idle pool, or closes it if the pool is
    /// at capacity or the browser is unhealthy.
    #[instrument(skip(self, pooled))]
    pub async fn release(&self, mut pooled: PooledBrowser, healthy: bool) {
        pooled.healthy = healthy;
        if !healthy {
            if let Err(e) = pooled.browser.close().await {
                warn!(error = %e, "failed closing unhealthy browser");
            }
            self.permits.add_permits(1);
            return;
        }

        let mut idle = self.idle.lock().await;
        if idle.len() >= self.capacity {
            drop(idle);
            let _ = pooled.browser.close().await;
            self.permits.add_permits(1);
        } else {
            idle.push_back(pooled);
        }
    }

    #[instrument(skip(self))]
    pub async fn close(&self) {
        let mut idle = self.idle.lock().await;
        while let Some(mut pooled) = idle.pop_front() {
            let _ = pooled.browser.close().await;
        }
        info!("browser pool closed");
    }
}
