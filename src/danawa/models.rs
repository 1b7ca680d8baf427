//! Data model for extracted search results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder stored in every field whose source element was not found.
pub const MISSING: &str = "정보 없음";

/// The columns of a [`Record`], in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Vendor,
    Name,
    Price,
    Image,
    SpecInfo,
    Link,
    Registered,
    Rating,
    ReviewCount,
}

impl Field {
    /// All fields in export order.
    pub const ALL: [Field; 10] = [
        Field::Title,
        Field::Vendor,
        Field::Name,
        Field::Price,
        Field::Image,
        Field::SpecInfo,
        Field::Link,
        Field::Registered,
        Field::Rating,
        Field::ReviewCount,
    ];

    /// Machine key, matching the serialized record field names.
    pub fn key(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Vendor => "vendor",
            Field::Name => "name",
            Field::Price => "price",
            Field::Image => "image",
            Field::SpecInfo => "spec_info",
            Field::Link => "link",
            Field::Registered => "registered",
            Field::Rating => "rating",
            Field::ReviewCount => "review_count",
        }
    }

    /// Column header used in CSV and workbook exports.
    pub fn header(&self) -> &'static str {
        match self {
            Field::Title => "상품",
            Field::Vendor => "제조사",
            Field::Name => "상품명",
            Field::Price => "가격",
            Field::Image => "이미지",
            Field::SpecInfo => "부가정보",
            Field::Link => "링크",
            Field::Registered => "등록월",
            Field::Rating => "평점",
            Field::ReviewCount => "리뷰 수",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One product's extracted fields. Every field is either a parsed value or
/// [`MISSING`]; there is no unset state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Full product title as shown on the results page
    pub title: String,
    /// First word of the title, taken as the maker
    pub vendor: String,
    /// Title without the vendor prefix
    pub name: String,
    /// Lowest listed price, as displayed (e.g. "1,000,000원")
    pub price: String,
    /// Absolute thumbnail URL
    pub image: String,
    /// Spec summary line
    pub spec_info: String,
    /// Absolute detail page URL
    pub link: String,
    /// Registration month (e.g. "2024.03.")
    pub registered: String,
    /// Average rating text
    pub rating: String,
    /// Number of reviews text
    pub review_count: String,
}

impl Record {
    /// Creates a record with every field set to the sentinel.
    pub fn missing() -> Self {
        Self {
            title: MISSING.to_string(),
            vendor: MISSING.to_string(),
            name: MISSING.to_string(),
            price: MISSING.to_string(),
            image: MISSING.to_string(),
            spec_info: MISSING.to_string(),
            link: MISSING.to_string(),
            registered: MISSING.to_string(),
            rating: MISSING.to_string(),
            review_count: MISSING.to_string(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Vendor => &self.vendor,
            Field::Name => &self.name,
            Field::Price => &self.price,
            Field::Image => &self.image,
            Field::SpecInfo => &self.spec_info,
            Field::Link => &self.link,
            Field::Registered => &self.registered,
            Field::Rating => &self.rating,
            Field::ReviewCount => &self.review_count,
        }
    }

    /// Sets a field. Blank values are stored as [`MISSING`].
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        let value = if value.trim().is_empty() { MISSING.to_string() } else { value };

        let slot = match field {
            Field::Title => &mut self.title,
            Field::Vendor => &mut self.vendor,
            Field::Name => &mut self.name,
            Field::Price => &mut self.price,
            Field::Image => &mut self.image,
            Field::SpecInfo => &mut self.spec_info,
            Field::Link => &mut self.link,
            Field::Registered => &mut self.registered,
            Field::Rating => &mut self.rating,
            Field::ReviewCount => &mut self.review_count,
        };
        *slot = value;
    }

    pub fn is_missing(&self, field: Field) -> bool {
        self.get(field) == MISSING
    }

    /// Field values in export order.
    pub fn values(&self) -> Vec<&str> {
        Field::ALL.iter().map(|f| self.get(*f)).collect()
    }

    /// Builds a record from values in export order. Short rows are padded
    /// with the sentinel.
    pub fn from_values<S: AsRef<str>>(values: &[S]) -> Self {
        let mut record = Record::missing();
        for (field, value) in Field::ALL.iter().zip(values) {
            record.set(*field, value.as_ref());
        }
        record
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::missing()
    }
}

/// Records extracted from one results page.
#[derive(Debug, Clone)]
pub struct PageResult {
    /// Page index (1-based)
    pub page: u32,
    /// Records in page order
    pub records: Vec<Record>,
    /// Highest page number advertised by the pagination block
    pub last_page: Option<u32>,
}

impl PageResult {
    pub fn new(page: u32) -> Self {
        Self { page, records: Vec::new(), last_page: None }
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Splits "vendor + product name" on the first whitespace run.
///
/// This is a heuristic: product titles are not guaranteed to lead with the
/// maker, and single-word titles have no vendor at all (the vendor is then
/// [`MISSING`] and the whole title is the name).
pub fn split_vendor(title: &str) -> (String, String) {
    let title = title.trim();
    if title.is_empty() || title == MISSING {
        return (MISSING.to_string(), MISSING.to_string());
    }

    match title.split_once(char::is_whitespace) {
        Some((vendor, rest)) if !rest.trim().is_empty() => {
            (vendor.to_string(), rest.trim_start().to_string())
        }
        _ => (MISSING.to_string(), title.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_record_has_every_field_set() {
        let record = Record::missing();
        for field in Field::ALL {
            assert!(record.is_missing(field), "{} should be missing", field);
        }
    }

    #[test]
    fn test_set_blank_stores_sentinel() {
        let mut record = Record::missing();
        record.set(Field::Price, "1,000원");
        assert_eq!(record.price, "1,000원");

        record.set(Field::Price, "   ");
        assert_eq!(record.price, MISSING);
    }

    #[test]
    fn test_field_keys_match_serialized_names() {
        let json = serde_json::to_value(Record::missing()).unwrap();
        for field in Field::ALL {
            assert!(json.get(field.key()).is_some(), "{} not serialized", field);
        }
        assert_eq!(Field::SpecInfo.to_string(), "spec_info");
    }

    #[test]
    fn test_values_follow_field_order() {
        let mut record = Record::missing();
        record.set(Field::Title, "ABC 노트북");
        record.set(Field::ReviewCount, "12");

        let values = record.values();
        assert_eq!(values.len(), Field::ALL.len());
        assert_eq!(values[0], "ABC 노트북");
        assert_eq!(values[9], "12");
    }

    #[test]
    fn test_from_values_pads_short_rows() {
        let record = Record::from_values(&["ABC 노트북", "ABC"]);
        assert_eq!(record.title, "ABC 노트북");
        assert_eq!(record.vendor, "ABC");
        assert!(record.is_missing(Field::Price));
        assert!(record.is_missing(Field::ReviewCount));
    }

    #[test]
    fn test_split_vendor() {
        assert_eq!(
            split_vendor("ABC 노트북 15형"),
            ("ABC".to_string(), "노트북 15형".to_string())
        );
        assert_eq!(split_vendor("  LG  그램 "), ("LG".to_string(), "그램".to_string()));
    }

    #[test]
    fn test_split_vendor_single_word() {
        assert_eq!(split_vendor("맥북"), (MISSING.to_string(), "맥북".to_string()));
    }

    #[test]
    fn test_split_vendor_empty() {
        assert_eq!(split_vendor(""), (MISSING.to_string(), MISSING.to_string()));
        assert_eq!(split_vendor(MISSING), (MISSING.to_string(), MISSING.to_string()));
    }

    #[test]
    fn test_record_serde() {
        let mut record = Record::missing();
        record.set(Field::Title, "ABC 노트북");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"title\":\"ABC 노트북\""));
        assert!(json.contains("review_count"));

        let parsed: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_page_result() {
        let mut result = PageResult::new(3);
        assert!(result.is_empty());
        result.records.push(Record::missing());
        assert_eq!(result.count(), 1);
        assert_eq!(result.page, 3);
    }
}
