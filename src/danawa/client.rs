//! HTTP fetcher for search pages and thumbnails, using wreq for TLS fingerprint emulation.

use crate::config::Config;
use crate::error::{CrawlError, Result};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Fetches raw search pages and image bytes - enables mocking for tests.
#[async_trait]
pub trait SearchFetcher: Send + Sync {
    /// Returns the markup of one results page.
    async fn fetch_page(&self, query: &str, page: u32) -> Result<String>;

    /// Downloads a binary resource (thumbnails).
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;

    /// Base URL that relative links on fetched pages resolve against.
    fn base_url(&self) -> &str;
}

/// Stateless HTTP fetcher with browser impersonation.
pub struct HttpFetcher {
    client: Client,
    config: Config,
}

impl HttpFetcher {
    /// Creates a new fetcher with the given configuration.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        use anyhow::Context;

        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        // Configure proxy if specified
        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { client, config: config.clone() })
    }

    /// Performs a GET request and returns the raw response.
    async fn get(&self, url: &str, accept: &str) -> Result<wreq::Response> {
        self.delay().await;

        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", accept)
            .header("Accept-Language", "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7")
            .header("Accept-Encoding", "gzip, deflate, br")
            .header("Referer", format!("{}/", self.base_url()))
            .header("Cache-Control", "no-cache")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .map_err(|e| CrawlError::transport(url, e))?;

        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            warn!("GET {} returned {}", url, status);
            return Err(CrawlError::Status { url: url.to_string(), status: status.as_u16() });
        }

        Ok(response)
    }

    /// Adds a random delay between requests.
    async fn delay(&self) {
        if self.config.delay_ms == 0 {
            return;
        }

        let jitter = if self.config.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.config.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.config.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }
}

#[async_trait]
impl SearchFetcher for HttpFetcher {
    async fn fetch_page(&self, query: &str, page: u32) -> Result<String> {
        let url = self.config.search_url(query, page);

        info!("Fetching '{}' page {}", query, page);
        let response = self
            .get(&url, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .await?;

        response.text().await.map_err(|e| CrawlError::transport(url, e))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.get(url, "image/avif,image/webp,image/apng,image/*,*/*;q=0.8").await?;

        let bytes = response.bytes().await.map_err(|e| CrawlError::transport(url, e))?;
        Ok(bytes.to_vec())
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }
}
