//! Page-count probe command.

use crate::commands::build_fetcher;
use crate::config::Config;
use crate::crawl::Crawler;
use crate::danawa::SearchFetcher;
use anyhow::{Context, Result};

/// Reports how many result pages a query has without crawling them.
pub struct PagesCommand {
    config: Config,
}

impl PagesCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn execute(&self, query: &str) -> Result<String> {
        let fetcher = build_fetcher(&self.config).await.context("Failed to create fetcher")?;

        self.execute_with_fetcher(fetcher.as_ref(), query).await
    }

    pub async fn execute_with_fetcher<F: SearchFetcher + ?Sized>(
        &self,
        fetcher: &F,
        query: &str,
    ) -> Result<String> {
        let (last, first) = Crawler::new(fetcher).probe(query).await?;

        Ok(format!(
            "'{}': {} pages ({} products on page 1)",
            query,
            last,
            first.count()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::tests::{make_page, MockFetcher};

    #[tokio::test]
    async fn test_pages_command() {
        let fetcher = MockFetcher::new(vec![(1, make_page(&["A 1", "A 2"], Some(7)))]);
        let cmd = PagesCommand::new(Config::default());

        let output = cmd.execute_with_fetcher(&fetcher, "노트북").await.unwrap();
        assert_eq!(output, "'노트북': 7 pages (2 products on page 1)");
        assert_eq!(fetcher.calls(), vec![1]);
    }

    #[tokio::test]
    async fn test_pages_command_probe_failure() {
        let fetcher = MockFetcher::new(vec![(1, "<html></html>".to_string())]);
        let cmd = PagesCommand::new(Config::default());

        let err = cmd.execute_with_fetcher(&fetcher, "q").await.unwrap_err();
        assert!(err.to_string().contains("Could not determine"));
    }
}
