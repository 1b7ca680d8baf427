//! Spreadsheet export with one embedded thumbnail per row.

use crate::danawa::{Field, Record, SearchFetcher};
use crate::export::images::{Thumbnail, ThumbnailLoader};
use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Image, Workbook, XlsxError};
use tracing::{info, warn};

const SHEET_NAME: &str = "검색결과";

/// Row height in points that fits a 100px thumbnail.
const IMAGE_ROW_HEIGHT: f64 = 75.0;
/// Column width in characters that fits a 100px thumbnail.
const IMAGE_COLUMN_WIDTH: f64 = 14.0;

/// Builds `.xlsx` workbooks from records.
pub struct WorkbookExporter<'a, F: SearchFetcher + ?Sized> {
    fetcher: &'a F,
    embed_images: bool,
}

impl<'a, F: SearchFetcher + ?Sized> WorkbookExporter<'a, F> {
    /// `fetcher` is used for thumbnail downloads when `embed_images` is set.
    pub fn new(fetcher: &'a F, embed_images: bool) -> Self {
        Self { fetcher, embed_images }
    }

    /// Downloads thumbnails (if enabled) and returns the workbook bytes.
    pub async fn export(&self, records: &[Record]) -> Result<Vec<u8>> {
        let thumbnails = if self.embed_images {
            let loader = ThumbnailLoader::new(self.fetcher)
                .context("Failed to build placeholder image")?;
            let thumbnails = loader.load_all(records).await;
            let failed = thumbnails.iter().filter(|t| t.placeholder).count();
            info!("Loaded {} thumbnails ({} placeholders)", thumbnails.len(), failed);
            Some(thumbnails)
        } else {
            None
        };

        build_workbook(records, thumbnails.as_deref()).context("Failed to build workbook")
    }
}

/// Writes the header row and one row per record.
///
/// With thumbnails, the image column holds the embedded picture instead of
/// the URL. A thumbnail that the writer rejects leaves the URL in the cell.
pub fn build_workbook(
    records: &[Record],
    thumbnails: Option<&[Thumbnail]>,
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, field) in (0u16..).zip(Field::ALL) {
        worksheet.write_string_with_format(0, col, field.header(), &header_format)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    let image_col = image_column();
    if thumbnails.is_some() {
        worksheet.set_column_width(image_col, IMAGE_COLUMN_WIDTH)?;
    }

    for (row, (index, record)) in (1u32..).zip(records.iter().enumerate()) {
        let thumbnail = thumbnails.and_then(|t| t.get(index));

        for (col, field) in (0u16..).zip(Field::ALL) {
            if field == Field::Image && thumbnail.is_some() {
                continue;
            }
            worksheet.write_string(row, col, record.get(field))?;
        }

        if let Some(thumbnail) = thumbnail {
            worksheet.set_row_height(row, IMAGE_ROW_HEIGHT)?;
            match Image::new_from_buffer(&thumbnail.png) {
                Ok(image) => {
                    worksheet.insert_image_fit_to_cell(row, image_col, &image, true)?;
                }
                Err(e) => {
                    warn!("Could not embed image on row {}: {}", row, e);
                    worksheet.write_string(row, image_col, record.get(Field::Image))?;
                }
            }
        }
    }

    workbook.save_to_buffer()
}

fn image_column() -> u16 {
    Field::ALL.iter().position(|f| *f == Field::Image).unwrap_or(0) as u16
}
