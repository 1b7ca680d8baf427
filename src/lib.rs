//! danawa-crawler - Danawa product search scraper
//!
//! Fetches search result pages, extracts one [`Record`] per product and
//! exports the records as text, CSV or an `.xlsx` workbook.

pub mod commands;
pub mod config;
pub mod crawl;
pub mod danawa;
pub mod error;
pub mod export;

pub use config::Config;
pub use danawa::models::{Field, PageResult, Record, MISSING};
pub use error::CrawlError;
