//! Thumbnail download for workbook export, with a blank placeholder on failure.

use crate::danawa::{Field, Record, SearchFetcher};
use crate::error::Result;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use tracing::{debug, warn};

/// Edge length in pixels of the cell a thumbnail is fitted into.
pub const THUMBNAIL_SIZE: u32 = 100;

/// PNG bytes for one row's image cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub png: Vec<u8>,
    /// True when the download failed or the record had no image.
    pub placeholder: bool,
}

/// Generates the white square used when a thumbnail is unavailable.
pub fn placeholder_png() -> Result<Vec<u8>> {
    let blank = RgbImage::from_pixel(THUMBNAIL_SIZE, THUMBNAIL_SIZE, Rgb([255, 255, 255]));
    encode_png(&DynamicImage::ImageRgb8(blank))
}

/// Decodes any supported image and re-encodes it as PNG.
pub fn to_png(bytes: &[u8]) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(bytes)?;
    encode_png(&decoded)
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Downloads record thumbnails one at a time.
pub struct ThumbnailLoader<'a, F: SearchFetcher + ?Sized> {
    fetcher: &'a F,
    placeholder: Vec<u8>,
}

impl<'a, F: SearchFetcher + ?Sized> ThumbnailLoader<'a, F> {
    pub fn new(fetcher: &'a F) -> Result<Self> {
        Ok(Self { fetcher, placeholder: placeholder_png()? })
    }

    /// Returns the record's thumbnail, or the placeholder if it has no image
    /// URL or the download/decode fails. Never fails the row.
    pub async fn load(&self, record: &Record) -> Thumbnail {
        if record.is_missing(Field::Image) {
            return self.placeholder();
        }

        let url = &record.image;
        let png = match self.fetcher.fetch_bytes(url).await {
            Ok(bytes) => to_png(&bytes),
            Err(e) => Err(e),
        };

        match png {
            Ok(png) => {
                debug!("Loaded thumbnail {} ({} bytes)", url, png.len());
                Thumbnail { png, placeholder: false }
            }
            Err(e) => {
                warn!("Image download failed for {}: {}", url, e);
                self.placeholder()
            }
        }
    }

    /// Loads thumbnails for every record, in order.
    pub async fn load_all(&self, records: &[Record]) -> Vec<Thumbnail> {
        let mut thumbnails = Vec::with_capacity(records.len());
        for record in records {
            thumbnails.push(self.load(record).await);
        }
        thumbnails
    }

    fn placeholder(&self) -> Thumbnail {
        Thumbnail { png: self.placeholder.clone(), placeholder: true }
    }
}
