//! Page-by-page crawl driver: fetch, extract, accumulate.
//!
//! Pages are processed strictly in increasing order, one request at a time.
//! Progress is reported through a plain callback so the driver stays
//! independent of whatever displays it.

use crate::danawa::{Extractor, PageResult, Record, SearchFetcher};
use crate::error::{CrawlError, Result};
use tracing::{debug, info, warn};

/// Inclusive, 1-based page range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    start: u32,
    end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if start == 0 || start > end {
            return Err(CrawlError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of pages in the range; never zero.
    pub fn page_count(&self) -> u32 {
        self.end - self.start + 1
    }

    pub fn pages(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

/// Which pages a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelection {
    /// An explicit range.
    Range(PageRange),
    /// Read the page count from page 1, then crawl from `start` to the last
    /// page, at most `max_pages` pages.
    Probe { start: u32, max_pages: u32 },
}

/// Progress notification, one per page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// The page was fetched and `records` records were extracted.
    Fetched { page: u32, position: u32, total: u32, records: usize },
    /// The page was skipped after a page-local failure.
    Skipped { page: u32, position: u32, total: u32, reason: String },
}

/// Outcome of a full run.
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    /// All records, in page order
    pub records: Vec<Record>,
    /// Pages fetched and extracted
    pub pages_fetched: Vec<u32>,
    /// Pages skipped after a transport or block failure
    pub pages_skipped: Vec<u32>,
}

impl CrawlSummary {
    pub fn count(&self) -> usize {
        self.records.len()
    }
}

/// Runs the fetch/extract loop against one fetcher.
pub struct Crawler<'a, F: SearchFetcher + ?Sized> {
    fetcher: &'a F,
    extractor: Extractor,
}

impl<'a, F: SearchFetcher + ?Sized> Crawler<'a, F> {
    pub fn new(fetcher: &'a F) -> Self {
        Self { fetcher, extractor: Extractor::new(fetcher.base_url()) }
    }

    /// Fetches and extracts a single page.
    pub async fn page(&self, query: &str, page: u32) -> Result<PageResult> {
        let html = self.fetcher.fetch_page(query, page).await?;
        self.extractor.extract_page(&html, page)
    }

    /// Determines how many result pages the query has.
    ///
    /// Returns page 1's extraction along with the count so callers do not
    /// have to fetch it twice. A page with results but no pagination block
    /// counts as a single page.
    pub async fn probe(&self, query: &str) -> Result<(u32, PageResult)> {
        let first = match self.page(query, 1).await {
            Ok(first) => first,
            Err(e) if e.is_page_local() => {
                warn!("Page count probe failed: {}", e);
                return Err(CrawlError::ProbeFailed { query: query.to_string() });
            }
            Err(e) => return Err(e),
        };

        let last = match first.last_page {
            Some(last) => last,
            None if !first.is_empty() => 1,
            None => return Err(CrawlError::ProbeFailed { query: query.to_string() }),
        };

        debug!("Probe found {} pages for '{}'", last, query);
        Ok((last, first))
    }

    /// Crawls the selected pages and returns every record in page order.
    ///
    /// Transport failures and block pages skip the page; only a failed probe
    /// aborts the run.
    pub async fn run(
        &self,
        query: &str,
        selection: PageSelection,
        mut on_page: impl FnMut(&PageEvent),
    ) -> Result<CrawlSummary> {
        let mut summary = CrawlSummary::default();

        let (range, mut prefetched) = match selection {
            PageSelection::Range(range) => (range, None),
            PageSelection::Probe { start, max_pages } => {
                let (last, first) = self.probe(query).await?;
                let end = last.min(start.saturating_add(max_pages.max(1) - 1));
                if end < last {
                    info!("Limiting crawl to pages {}..={} of {}", start, end, last);
                }
                (PageRange::new(start, end)?, Some(first))
            }
        };

        let total = range.page_count();
        info!("Crawling '{}' pages {}..={}", query, range.start(), range.end());

        for (position, page) in (1..).zip(range.pages()) {
            let result = match prefetched.take() {
                Some(first) if first.page == page => Ok(first),
                _ => self.page(query, page).await,
            };

            match result {
                Ok(result) => {
                    info!("Page {}: {} records", page, result.count());
                    on_page(&PageEvent::Fetched { page, position, total, records: result.count() });
                    summary.pages_fetched.push(page);
                    summary.records.extend(result.records);
                }
                Err(e) if e.is_page_local() => {
                    warn!("Skipping page {}: {}", page, e);
                    on_page(&PageEvent::Skipped { page, position, total, reason: e.to_string() });
                    summary.pages_skipped.push(page);
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "Crawl finished: {} records from {} pages ({} skipped)",
            summary.count(),
            summary.pages_fetched.len(),
            summary.pages_skipped.len()
        );

        Ok(summary)
    }
}
