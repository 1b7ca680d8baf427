//! Integration tests for the HTML extractor using fixture files.

use danawa_crawler::config::OutputFormat;
use danawa_crawler::danawa::{Extractor, Field};
use danawa_crawler::export::{parse_csv, Formatter};
use danawa_crawler::MISSING;

const SEARCH_FIXTURE: &str = include_str!("fixtures/search_result.html");
const BASE: &str = "https://search.danawa.com";

#[test]
fn test_extract_search_results() {
    let extractor = Extractor::new(BASE);
    let result = extractor.extract_page(SEARCH_FIXTURE, 1).unwrap();

    // One record per product container, including the sparse third one
    assert_eq!(result.count(), 3);
    assert_eq!(result.page, 1);
    assert_eq!(result.last_page, Some(4));

    let record = &result.records[0];
    assert_eq!(record.title, "ABC 노트북 15형");
    assert_eq!(record.vendor, "ABC");
    assert_eq!(record.name, "노트북 15형");
    assert_eq!(record.price, "1,000,000원");
    assert_eq!(
        record.image,
        "https://img.danawa.com/prod_img/500000/001/001/img/1001_1.jpg?shrink=130:130"
    );
    assert_eq!(record.link, "https://prod.danawa.com/info/?pcode=1001&keyword=노트북");
    assert_eq!(
        record.spec_info,
        "운영체제(OS): 미포함(프리도스) / 화면: 39.62cm(15.6인치) / 램: 16GB"
    );
    assert_eq!(record.registered, "2024.03.");
    assert_eq!(record.rating, "4.8");
    assert_eq!(record.review_count, "1,234");
}

#[test]
fn test_relative_urls_and_missing_rating() {
    let extractor = Extractor::new(BASE);
    let result = extractor.extract_page(SEARCH_FIXTURE, 1).unwrap();

    let record = &result.records[1];
    assert_eq!(record.vendor, "LG전자");
    assert_eq!(record.name, "그램 16 16Z90S");
    assert_eq!(record.link, "https://search.danawa.com/info/?pcode=1002");
    assert_eq!(record.image, "https://img.danawa.com/prod_img/500000/002/002/img/1002_1.jpg");
    assert_eq!(record.rating, MISSING);
    assert_eq!(record.review_count, "87");
}

#[test]
fn test_sparse_container_uses_sentinel() {
    let extractor = Extractor::new(BASE);
    let result = extractor.extract_page(SEARCH_FIXTURE, 1).unwrap();

    let record = &result.records[2];
    assert_eq!(record.title, "무선마우스");
    assert_eq!(record.vendor, MISSING);
    assert_eq!(record.name, "무선마우스");

    for field in [Field::Price, Field::Image, Field::SpecInfo, Field::Registered, Field::Rating] {
        assert!(record.is_missing(field), "{} should be missing", field);
    }
    // Every field is either a value or the sentinel
    for record in &result.records {
        assert!(record.values().iter().all(|v| !v.trim().is_empty()));
    }
}

#[test]
fn test_extract_is_idempotent() {
    let extractor = Extractor::new(BASE);
    let first = extractor.extract_page(SEARCH_FIXTURE, 1).unwrap();
    let second = extractor.extract_page(SEARCH_FIXTURE, 1).unwrap();

    assert_eq!(first.records, second.records);
}

#[test]
fn test_extract_empty_results() {
    let extractor = Extractor::new(BASE);
    let html = r#"
        <html>
        <body>
            <div class="no_result">검색결과가 없습니다.</div>
        </body>
        </html>
    "#;

    let result = extractor.extract_page(html, 1).unwrap();
    assert!(result.is_empty());
    assert_eq!(result.last_page, None);
}

#[test]
fn test_csv_export_integration() {
    let extractor = Extractor::new(BASE);
    let result = extractor.extract_page(SEARCH_FIXTURE, 1).unwrap();

    let csv = Formatter::new(OutputFormat::Csv).format_records(&result.records).unwrap();
    assert!(csv.starts_with("상품,제조사,상품명,가격,이미지,부가정보,링크,등록월,평점,리뷰 수"));

    let parsed = parse_csv(&csv).unwrap();
    assert_eq!(parsed, result.records);
}
