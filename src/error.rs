//! Error taxonomy for the crawl pipeline.
//!
//! Only [`CrawlError::ProbeFailed`] and [`CrawlError::InvalidRange`] stop a
//! run. Everything else is scoped to a single page or a single image and is
//! recovered from by the caller.

use thiserror::Error;

pub type Result<T, E = CrawlError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum CrawlError {
    /// The request never produced a response (connect, timeout, body read).
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The server answered with a non-success status.
    #[error("Request to {url} failed with status: {status}")]
    Status { url: String, status: u16 },

    /// The response is an access-denied or captcha page instead of results.
    #[error("Blocked by the search site on page {page}: {reason}")]
    Blocked { page: u32, reason: String },

    /// The pagination block could not be read from the first page.
    #[error("Could not determine the number of result pages for '{query}'")]
    ProbeFailed { query: String },

    #[error("Invalid page range {start}..={end}: pages start at 1 and start must not exceed end")]
    InvalidRange { start: u32, end: u32 },

    /// Browser navigation or rendering failed.
    #[error("Browser error: {0}")]
    Browser(String),

    /// A thumbnail could not be decoded or re-encoded.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl CrawlError {
    pub(crate) fn transport(
        url: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        CrawlError::Transport { url: url.into(), source: source.into() }
    }

    /// Returns true when the error only affects the current page.
    pub fn is_page_local(&self) -> bool {
        matches!(
            self,
            CrawlError::Transport { .. }
                | CrawlError::Status { .. }
                | CrawlError::Blocked { .. }
                | CrawlError::Browser(_)
        )
    }
}
