//! # Page Serializer
//!
//! Wraps finished page rasters into the requested container.
//!
//! | Format | 1 page | N pages |
//! |--------|--------|---------|
//! | `pdf` | `{base}.pdf` | `{base}.pdf`, one A4 page each |
//! | `png` | `{base}.png` | `{base}.zip` with `page-1.png` ... |
//! | `svg` | `{base}.svg` | `{base}.zip` with `page-1.svg` ... |
//!
//! [`PageSink`] takes pages one at a time and encodes each as it arrives,
//! so a caller that composites lazily never holds more than one raw raster.

pub mod archive;
pub mod pdf;
pub mod svg;

use chrono::{DateTime, Utc};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use tracing::debug;

use crate::error::SheetError;
use crate::paper::PaperConfig;
use crate::settings::ExportFormat;
use archive::PageArchive;
use pdf::PdfBuilder;

const ZIP_MIME: &str = "application/zip";

/// A finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime: &'static str,
    /// Number of sheets in the file
    pub pages: usize,
}

/// Knobs that do not change the page content.
#[derive(Debug, Clone, Default)]
pub struct SerializeOptions {
    pub paper: PaperConfig,
    /// Written to the PDF info dictionary when set.
    pub creation_date: Option<DateTime<Utc>>,
}

enum Output {
    Pdf(PdfBuilder),
    /// PNG or SVG. The first page waits until a second one turns the
    /// export into a ZIP.
    Files {
        wrap_svg: bool,
        first: Option<Vec<u8>>,
        archive: Option<PageArchive>,
    },
}

/// Streaming serializer: push pages in order, then finish.
pub struct PageSink {
    format: ExportFormat,
    paper: PaperConfig,
    pages: usize,
    output: Output,
}

impl PageSink {
    pub fn new(format: ExportFormat, options: &SerializeOptions) -> Self {
        let output = match format {
            ExportFormat::Pdf => Output::Pdf(PdfBuilder::new(&options.paper, options.creation_date)),
            ExportFormat::Png | ExportFormat::Svg => Output::Files {
                wrap_svg: format == ExportFormat::Svg,
                first: None,
                archive: None,
            },
        };
        Self {
            format,
            paper: options.paper,
            pages: 0,
            output,
        }
    }

    /// Pages pushed so far.
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Encode the next page. The raster can be dropped afterwards.
    pub fn push(&mut self, page: &RgbImage) -> Result<(), SheetError> {
        let extension = self.format.extension();
        match &mut self.output {
            Output::Pdf(pdf) => pdf.add_page(page)?,
            Output::Files {
                wrap_svg,
                first,
                archive,
            } => {
                let png = encode_png(page)?;
                let bytes = if *wrap_svg {
                    svg::wrap_png(&png, &self.paper).into_bytes()
                } else {
                    png
                };

                if let Some(archive) = archive.as_mut() {
                    archive.add(&bytes)?;
                } else if let Some(previous) = first.take() {
                    let mut bundle = PageArchive::new(extension);
                    bundle.add(&previous)?;
                    bundle.add(&bytes)?;
                    *archive = Some(bundle);
                } else {
                    *first = Some(bytes);
                }
            }
        }

        self.pages += 1;
        debug!(page = self.pages, format = %self.format, "page serialized");
        Ok(())
    }

    pub fn finish(self, base_name: &str) -> Result<ExportFile, SheetError> {
        if self.pages == 0 {
            return Err(SheetError::Serialization("No pages to export".to_string()));
        }

        let single = |bytes: Vec<u8>| ExportFile {
            bytes,
            filename: format!("{}.{}", base_name, self.format.extension()),
            mime: self.format.mime(),
            pages: self.pages,
        };

        match self.output {
            Output::Pdf(pdf) => Ok(single(pdf.finish()?)),
            Output::Files {
                archive: Some(archive),
                ..
            } => Ok(ExportFile {
                bytes: archive.finish()?,
                filename: format!("{}.zip", base_name),
                mime: ZIP_MIME,
                pages: self.pages,
            }),
            Output::Files {
                first: Some(bytes), ..
            } => Ok(single(bytes)),
            Output::Files { .. } => Err(SheetError::Serialization("No pages to export".to_string())),
        }
    }
}

/// Serialize with default options.
pub fn serialize(
    pages: &[RgbImage],
    format: ExportFormat,
    base_name: &str,
) -> Result<ExportFile, SheetError> {
    serialize_with(pages, format, base_name, &SerializeOptions::default())
}

pub fn serialize_with(
    pages: &[RgbImage],
    format: ExportFormat,
    base_name: &str,
    options: &SerializeOptions,
) -> Result<ExportFile, SheetError> {
    let mut sink = PageSink::new(format, options);
    for page in pages {
        sink.push(page)?;
    }
    sink.finish(base_name)
}

/// Encode an RGB raster as PNG.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, SheetError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(bytes)
}
