//! Headless Chrome fetcher for pages that only render their result list with JavaScript.

use crate::config::Config;
use crate::danawa::client::{HttpFetcher, SearchFetcher};
use crate::error::{CrawlError, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Drives one headless browser for the whole run.
///
/// The browser process is owned by this value and shut down when it is
/// dropped, including on error paths. Thumbnails are still downloaded with
/// plain HTTP.
pub struct BrowserFetcher {
    // Field order matters: the tab must go before the browser.
    tab: Arc<Tab>,
    _browser: Browser,
    http: HttpFetcher,
    config: Config,
}

impl BrowserFetcher {
    /// Launches the browser and opens the tab reused for every page.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let http = HttpFetcher::new(config).await?;

        let (browser, tab) = tokio::task::spawn_blocking(|| -> anyhow::Result<(Browser, Arc<Tab>)> {
            let browser = Browser::new(LaunchOptions { headless: true, ..Default::default() })?;
            let tab = browser.new_tab()?;
            Ok((browser, tab))
        })
        .await??;

        info!("Headless browser started");

        Ok(Self { tab, _browser: browser, http, config: config.clone() })
    }
}

#[async_trait]
impl SearchFetcher for BrowserFetcher {
    async fn fetch_page(&self, query: &str, page: u32) -> Result<String> {
        let url = self.config.search_url(query, page);
        let wait = Duration::from_millis(self.config.render_wait_ms);
        let tab = Arc::clone(&self.tab);

        info!("Rendering '{}' page {}", query, page);
        debug!("NAVIGATE {}", url);

        tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
            tab.navigate_to(&url)?;
            tab.wait_until_navigated()?;
            // Result list is filled in by scripts after load
            std::thread::sleep(wait);
            tab.get_content()
        })
        .await
        .map_err(|e| CrawlError::Browser(e.to_string()))?
        .map_err(|e| CrawlError::Browser(format!("page {}: {}", page, e)))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.http.fetch_bytes(url).await
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }
}
