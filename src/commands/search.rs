//! Search command implementation.

use crate::commands::build_fetcher;
use crate::config::{Config, OutputFormat};
use crate::crawl::{CrawlSummary, Crawler, PageEvent, PageRange, PageSelection};
use crate::danawa::SearchFetcher;
use crate::export::{default_file_name, Formatter, WorkbookExporter};
use anyhow::{Context, Result};
use chrono::Local;
use std::path::PathBuf;
use tracing::{debug, info};

/// Crawls a page range for a query and exports the records.
pub struct SearchCommand {
    config: Config,
}

impl SearchCommand {
    /// Creates a new search command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Executes the search and returns formatted output or a save notice.
    pub async fn execute(&self, query: &str) -> Result<String> {
        let fetcher = build_fetcher(&self.config).await.context("Failed to create fetcher")?;

        self.execute_with_fetcher(fetcher.as_ref(), query).await
    }

    /// Executes the search with a provided fetcher (for testing).
    pub async fn execute_with_fetcher<F: SearchFetcher + ?Sized>(
        &self,
        fetcher: &F,
        query: &str,
    ) -> Result<String> {
        info!("Searching for: {}", query);

        let selection = self.selection()?;
        debug!("Page selection: {:?}", selection);

        let summary = Crawler::new(fetcher).run(query, selection, report_progress).await?;

        self.export(fetcher, query, &summary).await
    }

    /// Explicit range when an end page is configured, otherwise a probe.
    fn selection(&self) -> Result<PageSelection> {
        let start = self.config.start_page;
        Ok(match self.config.end_page {
            Some(end) => PageSelection::Range(PageRange::new(start, end)?),
            None => PageSelection::Probe { start, max_pages: self.config.max_pages },
        })
    }

    async fn export<F: SearchFetcher + ?Sized>(
        &self,
        fetcher: &F,
        query: &str,
        summary: &CrawlSummary,
    ) -> Result<String> {
        let format = self.config.format;

        if format.is_binary() {
            let bytes = WorkbookExporter::new(fetcher, self.config.embed_images)
                .export(&summary.records)
                .await?;
            let path = self.output_path(query, format);
            return save(&path, &bytes, summary.count());
        }

        let text = Formatter::new(format).format_records(&summary.records)?;

        match &self.config.output {
            Some(path) => save(path, text.as_bytes(), summary.count()),
            None => Ok(text),
        }
    }

    fn output_path(&self, query: &str, format: OutputFormat) -> PathBuf {
        self.config.output.clone().unwrap_or_else(|| {
            PathBuf::from(default_file_name(query, format, Local::now().date_naive()))
        })
    }
}

fn save(path: &PathBuf, bytes: &[u8], count: usize) -> Result<String> {
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;

    info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(format!("Saved {} records to {}", count, path.display()))
}

/// Prints one progress line per page to stderr.
fn report_progress(event: &PageEvent) {
    match event {
        PageEvent::Fetched { page, position, total, records } => {
            eprintln!("[{}/{}] page {}: {} records", position, total, page, records);
        }
        PageEvent::Skipped { page, position, total, reason } => {
            eprintln!("[{}/{}] page {}: skipped ({})", position, total, page, reason);
        }
    }
}
