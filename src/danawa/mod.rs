//! Danawa search: fetching, selectors, extraction, and the record model.

pub mod client;
pub mod models;
pub mod parser;
pub mod selectors;

#[cfg(feature = "browser")]
pub mod browser;

#[cfg(feature = "browser")]
pub use browser::BrowserFetcher;
pub use client::{HttpFetcher, SearchFetcher};
pub use models::{split_vendor, Field, PageResult, Record, MISSING};
pub use parser::Extractor;
