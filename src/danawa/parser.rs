//! HTML extraction for Danawa search result pages.

use crate::danawa::models::{split_vendor, Field, PageResult, Record};
use crate::danawa::selectors::{errors, pagination, search};
use crate::error::{CrawlError, Result};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, trace};

/// Where a field's value comes from once its selector matched.
#[derive(Debug, Clone, Copy)]
enum Source {
    /// Collapsed text content of the element.
    Text,
    /// First non-empty attribute among the names, as an absolute URL.
    UrlAttr(&'static [&'static str]),
}

/// One entry of the extraction table.
struct FieldRule {
    field: Field,
    selector: &'static Selector,
    source: Source,
}

/// Selector-to-field table. Vendor and name are derived from the title
/// afterwards and have no rule of their own.
static RULES: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    vec![
        FieldRule { field: Field::Title, selector: &search::TITLE, source: Source::Text },
        FieldRule { field: Field::Price, selector: &search::PRICE, source: Source::Text },
        FieldRule {
            field: Field::Image,
            selector: &search::IMAGE,
            source: Source::UrlAttr(search::IMAGE_ATTRS),
        },
        FieldRule { field: Field::SpecInfo, selector: &search::SPEC_INFO, source: Source::Text },
        FieldRule {
            field: Field::Link,
            selector: &search::LINK,
            source: Source::UrlAttr(search::LINK_ATTRS),
        },
        FieldRule {
            field: Field::Registered,
            selector: &search::REGISTERED,
            source: Source::Text,
        },
        FieldRule { field: Field::Rating, selector: &search::RATING, source: Source::Text },
        FieldRule {
            field: Field::ReviewCount,
            selector: &search::REVIEW_COUNT,
            source: Source::Text,
        },
    ]
});

/// Turns one results page into records.
pub struct Extractor {
    base_url: String,
}

impl Extractor {
    /// Creates an extractor. Relative links are resolved against `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into().trim_end_matches('/').to_string() }
    }

    /// Extracts every product container on the page, in page order.
    ///
    /// A page without containers yields an empty result. A missing field is
    /// never an error; only block/captcha pages are.
    pub fn extract_page(&self, html: &str, page: u32) -> Result<PageResult> {
        let document = Html::parse_document(html);

        self.check_for_errors(&document, page)?;

        let mut result = PageResult::new(page);
        result.last_page = self.read_last_page(&document);

        for container in document.select(&search::RESULT) {
            let record = self.extract_record(container);
            trace!("Extracted record: {}", record.title);
            result.records.push(record);
        }

        debug!(
            "Extracted {} records from page {} (last page: {:?})",
            result.records.len(),
            page,
            result.last_page
        );

        Ok(result)
    }

    /// Reads the highest page number from the pagination block.
    ///
    /// Uses the last-page shortcut when present. Without it only the visible
    /// block of numbered links is known, so the value is a lower bound.
    pub fn last_page(&self, html: &str) -> Option<u32> {
        let document = Html::parse_document(html);
        self.read_last_page(&document)
    }

    /// Applies the rule table to one product container.
    fn extract_record(&self, container: ElementRef) -> Record {
        let mut record = Record::missing();

        for rule in RULES.iter() {
            let Some(element) = container.select(rule.selector).next() else {
                continue;
            };

            let value = match rule.source {
                Source::Text => Some(collapse_whitespace(&element.text().collect::<String>())),
                Source::UrlAttr(names) => names
                    .iter()
                    .filter_map(|name| element.value().attr(name))
                    .map(str::trim)
                    .find(|v| !v.is_empty())
                    .map(|v| self.absolute_url(v)),
            };

            if let Some(value) = value {
                record.set(rule.field, value);
            }
        }

        let (vendor, name) = split_vendor(&record.title);
        record.set(Field::Vendor, vendor);
        record.set(Field::Name, name);

        record
    }

    fn read_last_page(&self, document: &Html) -> Option<u32> {
        let from_labels = document
            .select(&pagination::PAGE_NUMBER)
            .filter_map(|e| e.text().collect::<String>().trim().parse::<u32>().ok());

        let from_attrs = document
            .select(&pagination::LAST_PAGE)
            .filter_map(|e| e.value().attr("data-page"))
            .filter_map(|v| v.trim().parse::<u32>().ok());

        from_labels.chain(from_attrs).filter(|n| *n > 0).max()
    }

    /// Rejects captcha and access-denied pages.
    fn check_for_errors(&self, document: &Html, page: u32) -> Result<()> {
        if document.select(&errors::CAPTCHA).next().is_some() {
            return Err(CrawlError::Blocked {
                page,
                reason: "captcha page returned instead of results".to_string(),
            });
        }

        if document.select(&errors::ACCESS_DENIED).next().is_some() {
            return Err(CrawlError::Blocked {
                page,
                reason: "access denied".to_string(),
            });
        }

        Ok(())
    }

    /// Resolves protocol-relative and root-relative URLs.
    fn absolute_url(&self, href: &str) -> String {
        if href.starts_with("//") {
            format!("https:{}", href)
        } else if href.starts_with('/') {
            format!("{}{}", self.base_url, href)
        } else {
            href.to_string()
        }
    }
}

/// Collapses whitespace runs (including newlines and tabs) to single spaces.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
