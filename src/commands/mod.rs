//! CLI command implementations.

pub mod pages;
pub mod search;

use crate::config::{Config, FetcherKind};
use crate::danawa::{HttpFetcher, SearchFetcher};
use anyhow::Result;

pub use pages::PagesCommand;
pub use search::SearchCommand;

/// Creates the fetcher selected in the configuration.
pub async fn build_fetcher(config: &Config) -> Result<Box<dyn SearchFetcher>> {
    match config.fetcher {
        FetcherKind::Http => Ok(Box::new(HttpFetcher::new(config).await?)),
        #[cfg(feature = "browser")]
        FetcherKind::Browser => Ok(Box::new(crate::danawa::BrowserFetcher::new(config).await?)),
        #[cfg(not(feature = "browser"))]
        FetcherKind::Browser => {
            anyhow::bail!("Browser fetching is not available. Rebuild with `--features browser`.")
        }
    }
}
