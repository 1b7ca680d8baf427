//! Output formatting for records (table, JSON, markdown, CSV) and workbook export.

pub mod images;
pub mod xlsx;

use crate::config::OutputFormat;
use crate::danawa::{Field, Record};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use unicode_width::UnicodeWidthStr;

pub use images::{Thumbnail, ThumbnailLoader};
pub use xlsx::WorkbookExporter;

/// Formats records as text.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats all records. Fails for binary formats.
    pub fn format_records(&self, records: &[Record]) -> Result<String> {
        if records.is_empty() {
            return Ok(match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => self.csv_records(records)?,
                OutputFormat::Xlsx => anyhow::bail!("xlsx is a binary format, use WorkbookExporter"),
                _ => "No products found.".to_string(),
            });
        }

        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(records).context("Failed to serialize records")
            }
            OutputFormat::Table => Ok(self.table_records(records)),
            OutputFormat::Markdown => Ok(self.markdown_records(records)),
            OutputFormat::Csv => self.csv_records(records),
            OutputFormat::Xlsx => anyhow::bail!("xlsx is a binary format, use WorkbookExporter"),
        }
    }

    // Table formatting

    fn table_records(&self, records: &[Record]) -> String {
        let index_width = 4;
        let price_width = 14;
        let rating_width = 10;
        let reviews_width = 10;
        let title_width = 40;

        let mut lines = Vec::new();

        lines.push(format!(
            "{}  {}  {}  {}  {}",
            pad_right("#", index_width),
            pad_right(Field::Price.header(), price_width),
            pad_right(Field::Rating.header(), rating_width),
            pad_right(Field::ReviewCount.header(), reviews_width),
            Field::Title.header()
        ));
        lines.push(format!(
            "{:-<index_width$}  {:-<price_width$}  {:-<rating_width$}  {:-<reviews_width$}  {:-<title_width$}",
            "", "", "", "", ""
        ));

        for (i, record) in records.iter().enumerate() {
            lines.push(format!(
                "{}  {}  {}  {}  {}",
                pad_right(&(i + 1).to_string(), index_width),
                pad_left(&record.price, price_width),
                pad_left(&record.rating, rating_width),
                pad_left(&record.review_count, reviews_width),
                truncate(&record.title, title_width)
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} products", records.len()));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_records(&self, records: &[Record]) -> String {
        let mut lines = Vec::new();

        lines.push("| 제조사 | 상품명 | 가격 | 평점 | 리뷰 수 | 등록월 |".to_string());
        lines.push("|--------|--------|------|------|---------|--------|".to_string());

        for record in records {
            let name = if record.is_missing(Field::Link) {
                markdown_escape(&record.name)
            } else {
                format!("[{}]({})", markdown_escape(&record.name), record.link)
            };

            lines.push(format!(
                "| {} | {} | {} | {} | {} | {} |",
                markdown_escape(&record.vendor),
                name,
                markdown_escape(&record.price),
                markdown_escape(&record.rating),
                markdown_escape(&record.review_count),
                markdown_escape(&record.registered)
            ));
        }

        lines.push(String::new());
        lines.push(format!("*{} products found*", records.len()));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_records(&self, records: &[Record]) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(Field::ALL.iter().map(|f| f.header()))?;

        for record in records {
            writer.write_record(record.values())?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))?;
        String::from_utf8(bytes).context("CSV output is not UTF-8")
    }
}

/// Reads CSV produced by [`Formatter`] back into records.
pub fn parse_csv(text: &str) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(text.as_bytes());

    reader
        .records()
        .map(|row| {
            let row = row.context("Malformed CSV row")?;
            Ok(Record::from_values(&row.iter().collect::<Vec<_>>()))
        })
        .collect()
}

/// Export file name: `온라인_시장조사_<query>_<date>.<ext>`.
pub fn default_file_name(query: &str, format: OutputFormat, date: NaiveDate) -> String {
    format!(
        "온라인_시장조사_{}_{}.{}",
        clean_file_name(query.trim()),
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Replaces characters that are not allowed in file names.
pub fn clean_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

/// Truncates to `max` characters, never splitting a character.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Pads to `width` terminal columns; Hangul counts as two.
fn pad_right(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

fn pad_left(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", " ".repeat(fill), text)
}

fn markdown_escape(text: &str) -> String {
    text.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::danawa::MISSING;

    fn make_record() -> Record {
        let mut record = Record::missing();
        record.set(Field::Title, "ABC 노트북 15형");
        record.set(Field::Vendor, "ABC");
        record.set(Field::Name, "노트북 15형");
        record.set(Field::Price, "1,000,000원");
        record.set(Field::Image, "https://img.danawa.com/prod/1.jpg");
        record.set(Field::SpecInfo, "15.6인치 / 16GB, \"SSD\" 512GB");
        record.set(Field::Link, "https://prod.danawa.com/info/?pcode=1");
        record.set(Field::Registered, "2024.03.");
        record.set(Field::Rating, "4.8");
        record.set(Field::ReviewCount, "1,234");
        record
    }

    fn make_long_title_record() -> Record {
        let mut record = make_record();
        record.set(
            Field::Title,
            "삼성전자 갤럭시북4 프로 NT960XGK-KC51S 인텔 코어 울트라5 16GB 512GB 윈도우11 홈",
        );
        record
    }

    // JSON format tests

    #[test]
    fn test_json_records() {
        let formatter = Formatter::new(OutputFormat::Json);
        let output = formatter.format_records(&[make_record(), Record::missing()]).unwrap();

        assert!(output.starts_with('['));
        assert!(output.ends_with(']'));
        assert!(output.contains("\"vendor\": \"ABC\""));
        assert!(output.contains(MISSING));
    }

    #[test]
    fn test_json_empty() {
        let formatter = Formatter::new(OutputFormat::Json);
        assert_eq!(formatter.format_records(&[]).unwrap(), "[]");
    }

    // Table format tests

    #[test]
    fn test_table_records() {
        let formatter = Formatter::new(OutputFormat::Table);
        let output = formatter.format_records(&[make_record(), Record::missing()]).unwrap();

        assert!(output.contains("가격"));
        assert!(output.contains("리뷰 수"));
        assert!(output.contains("----"));
        assert!(output.contains("1,000,000원"));
        assert!(output.contains("ABC 노트북 15형"));
        assert!(output.contains(MISSING));
        assert!(output.contains("Total: 2 products"));
    }

    #[test]
    fn test_table_columns_align_with_hangul() {
        let formatter = Formatter::new(OutputFormat::Table);
        let output = formatter.format_records(&[make_record(), Record::missing()]).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        // Display width before the title column is the same on every row
        let prefix = |line: &str, title: &str| line.strip_suffix(title).unwrap().width();
        let header = prefix(lines[0], Field::Title.header());
        assert_eq!(prefix(lines[2], "ABC 노트북 15형"), header);
        assert_eq!(prefix(lines[3], MISSING), header);
    }

    #[test]
    fn test_table_truncates_on_char_boundary() {
        let formatter = Formatter::new(OutputFormat::Table);
        let output = formatter.format_records(&[make_long_title_record()]).unwrap();

        assert!(output.contains("삼성전자 갤럭시북4"));
        assert!(output.contains("..."));
    }

    #[test]
    fn test_table_empty() {
        let formatter = Formatter::new(OutputFormat::Table);
        assert_eq!(formatter.format_records(&[]).unwrap(), "No products found.");
    }

    // Markdown format tests

    #[test]
    fn test_markdown_records() {
        let formatter = Formatter::new(OutputFormat::Markdown);
        let output = formatter.format_records(&[make_record()]).unwrap();

        assert!(output.contains("| 제조사 | 상품명 | 가격 |"));
        assert!(output.contains("[노트북 15형](https://prod.danawa.com/info/?pcode=1)"));
        assert!(output.contains("| 1,000,000원 |"));
        assert!(output.contains("*1 products found*"));
    }

    #[test]
    fn test_markdown_escapes_pipes_and_skips_missing_link() {
        let formatter = Formatter::new(OutputFormat::Markdown);
        let mut record = Record::missing();
        record.set(Field::Name, "A|B");
        let output = formatter.format_records(&[record]).unwrap();

        assert!(output.contains("A\\|B"));
        assert!(!output.contains("]("));
    }

    // CSV format tests

    #[test]
    fn test_csv_header() {
        let formatter = Formatter::new(OutputFormat::Csv);
        let output = formatter.format_records(&[]).unwrap();
        assert_eq!(
            output.trim_end(),
            "상품,제조사,상품명,가격,이미지,부가정보,링크,등록월,평점,리뷰 수"
        );
    }

    #[test]
    fn test_csv_quotes_special_chars() {
        let formatter = Formatter::new(OutputFormat::Csv);
        let output = formatter.format_records(&[make_record()]).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("\"1,000,000원\""));
        assert!(lines[1].contains("\"15.6인치 / 16GB, \"\"SSD\"\" 512GB\""));
    }

    #[test]
    fn test_csv_roundtrip() {
        let formatter = Formatter::new(OutputFormat::Csv);
        let mut multiline = make_record();
        multiline.set(Field::SpecInfo, "line one\nline two");
        let records = vec![make_record(), Record::missing(), multiline];

        let output = formatter.format_records(&records).unwrap();
        let parsed = parse_csv(&output).unwrap();

        assert_eq!(parsed.len(), records.len());
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_parse_csv_empty() {
        let parsed = parse_csv("상품,제조사\n").unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_xlsx_is_not_text() {
        let formatter = Formatter::new(OutputFormat::Xlsx);
        assert!(formatter.format_records(&[make_record()]).is_err());
    }

    // File names

    #[test]
    fn test_default_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(
            default_file_name("노트북", OutputFormat::Xlsx, date),
            "온라인_시장조사_노트북_2024-03-05.xlsx"
        );
        assert_eq!(
            default_file_name("a/b:c?", OutputFormat::Csv, date),
            "온라인_시장조사_a_b_c__2024-03-05.csv"
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("가나다라마바사", 5), "가나...");
    }
}
