//! PDF output for full-page raster sheets.
//!
//! Objects are emitted with `pdf-writer` as pages arrive:
//!
//! ```text
//! 1  Catalog
//! 2  Pages     (written on finish, once every kid is known)
//! 3  Info      (Producer, optional CreationDate)
//! per page: image XObject (RGB, FlateDecode), content stream, Page
//! ```
//!
//! Each raster is stretched over the whole A4 page.

use chrono::{DateTime, Datelike, Timelike, Utc};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::RgbImage;
use pdf_writer::{Content, Date, Filter, Finish, Name, Pdf, Rect, Ref, TextStr};
use std::io::Write;

use crate::error::SheetError;
use crate::paper::PaperConfig;

const PRODUCER: &str = concat!("labelsheet ", env!("CARGO_PKG_VERSION"));
const IMAGE_NAME: Name<'static> = Name(b"Im0");

/// Incremental PDF document, one page per raster.
///
/// Only the compressed image data is kept between pages.
pub struct PdfBuilder {
    pdf: Pdf,
    catalog_id: Ref,
    page_tree_id: Ref,
    info_id: Ref,
    next_ref_id: i32,
    kids: Vec<Ref>,
    width_pt: f32,
    height_pt: f32,
    creation_date: Option<DateTime<Utc>>,
}

impl PdfBuilder {
    pub fn new(paper: &PaperConfig, creation_date: Option<DateTime<Utc>>) -> Self {
        Self {
            pdf: Pdf::new(),
            catalog_id: Ref::new(1),
            page_tree_id: Ref::new(2),
            info_id: Ref::new(3),
            next_ref_id: 4,
            kids: Vec::new(),
            width_pt: paper.width_pt() as f32,
            height_pt: paper.height_pt() as f32,
            creation_date,
        }
    }

    fn alloc_ref(&mut self) -> Ref {
        let id = Ref::new(self.next_ref_id);
        self.next_ref_id += 1;
        id
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append a page showing `raster`.
    pub fn add_page(&mut self, raster: &RgbImage) -> Result<(), SheetError> {
        let image_id = self.alloc_ref();
        let content_id = self.alloc_ref();
        let page_id = self.alloc_ref();
        let (width_pt, height_pt) = (self.width_pt, self.height_pt);

        let data = deflate(raster.as_raw())?;
        let mut image = self.pdf.image_xobject(image_id, &data);
        image.filter(Filter::FlateDecode);
        image.width(raster.width() as i32);
        image.height(raster.height() as i32);
        image.color_space().device_rgb();
        image.bits_per_component(8);
        image.finish();

        let mut content = Content::new();
        content.save_state();
        content.transform([width_pt, 0.0, 0.0, height_pt, 0.0, 0.0]);
        content.x_object(IMAGE_NAME);
        content.restore_state();
        self.pdf.stream(content_id, &content.finish());

        let mut page = self.pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, width_pt, height_pt));
        page.parent(self.page_tree_id);
        page.contents(content_id);
        page.resources().x_objects().pair(IMAGE_NAME, image_id);
        page.finish();

        self.kids.push(page_id);
        Ok(())
    }

    /// Write the page tree, catalog and info dictionary.
    pub fn finish(mut self) -> Result<Vec<u8>, SheetError> {
        if self.kids.is_empty() {
            return Err(SheetError::Serialization("No pages to export".to_string()));
        }

        self.pdf.catalog(self.catalog_id).pages(self.page_tree_id);
        let count = self.kids.len() as i32;
        self.pdf
            .pages(self.page_tree_id)
            .kids(self.kids.iter().copied())
            .count(count);

        let mut info = self.pdf.document_info(self.info_id);
        info.producer(TextStr(PRODUCER));
        if let Some(date) = &self.creation_date {
            info.creation_date(pdf_date(date));
        }
        info.finish();

        Ok(self.pdf.finish())
    }
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, SheetError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn pdf_date(date: &DateTime<Utc>) -> Date {
    Date::new(date.year() as u16)
        .month(date.month() as u8)
        .day(date.day() as u8)
        .hour(date.hour() as u8)
        .minute(date.minute() as u8)
        .second(date.second() as u8)
        .utc_offset_hour(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use image::Rgb;
    use pretty_assertions::assert_eq;

    fn count(haystack: &[u8], needle: &str) -> usize {
        haystack
            .windows(needle.len())
            .filter(|w| *w == needle.as_bytes())
            .count()
    }

    fn build(pages: &[RgbImage], date: Option<DateTime<Utc>>) -> Result<Vec<u8>, SheetError> {
        let mut pdf = PdfBuilder::new(&PaperConfig::A4, date);
        for page in pages {
            pdf.add_page(page)?;
        }
        pdf.finish()
    }

    #[test]
    fn test_structure() {
        let pages = vec![RgbImage::from_pixel(4, 6, Rgb([255, 255, 255])); 2];
        let bytes = build(&pages, None).unwrap();

        assert!(bytes.starts_with(b"%PDF-"));
        assert!(bytes.ends_with(b"%%EOF") || bytes.ends_with(b"%%EOF\n"));
        let page_objects = count(&bytes, "/Type /Page") - count(&bytes, "/Type /Pages");
        assert_eq!(page_objects, 2);
        assert_eq!(count(&bytes, "/Subtype /Image"), 2);
        assert_eq!(count(&bytes, "/FlateDecode"), 2);
        assert_eq!(count(&bytes, "/Im0 Do"), 2);
        assert_eq!(count(&bytes, "/Count 2"), 1);
        assert_eq!(count(&bytes, "/MediaBox"), 2);
        assert_eq!(count(&bytes, "595.28 841.89]"), 2);
        assert_eq!(count(&bytes, "/CreationDate"), 0);
    }

    #[test]
    fn test_is_deterministic() {
        let pages = vec![RgbImage::from_pixel(3, 3, Rgb([10, 20, 30]))];
        assert_eq!(build(&pages, None).unwrap(), build(&pages, None).unwrap());
    }

    #[test]
    fn test_image_stream_holds_raster() {
        use flate2::read::ZlibDecoder;
        use std::io::Read;

        let raster = RgbImage::from_fn(3, 2, |x, y| Rgb([x as u8 * 50, y as u8 * 90, 7]));
        let bytes = build(std::slice::from_ref(&raster), None).unwrap();

        let image_at = bytes
            .windows(b"/Subtype /Image".len())
            .position(|w| w == b"/Subtype /Image")
            .unwrap();
        let tail = &bytes[image_at..];
        let start = tail.windows(7).position(|w| w == b"stream\n").unwrap() + 7;
        let mut decoded = Vec::new();
        ZlibDecoder::new(&tail[start..]).read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, raster.into_raw());
    }

    #[test]
    fn test_creation_date() {
        let date = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        let bytes = build(&[RgbImage::new(1, 1)], Some(date)).unwrap();
        assert_eq!(count(&bytes, "/CreationDate"), 1);
        assert_eq!(count(&bytes, "D:20240305140709"), 1);
    }

    #[test]
    fn test_empty_is_error() {
        let pdf = PdfBuilder::new(&PaperConfig::A4, None);
        assert_eq!(pdf.page_count(), 0);
        assert!(matches!(pdf.finish(), Err(SheetError::Serialization(_))));
    }
}
