//! # Label Box Compositor
//!
//! Draws one label cell onto a page canvas.
//!
//! ```text
//! ┌──────────────────────────────┐ ← border (#CCCCCC, inside the cell)
//! │           padding            │
//! │        BRAND (bold)          │ ← brand band: font px + padding
//! │          ┌───────┐           │
//! │          │ code  │           │ ← code box, centred in what is left
//! │          └───────┘           │
//! │          content             │ ← data band: font px + padding
//! │           padding            │
//! └──────────────────────────────┘
//! ```
//!
//! Nothing here fails: a missing code image becomes a light grey
//! placeholder and text that does not fit is squeezed.

use image::{Rgb, RgbImage};

use crate::cache::CodeSizes;
use crate::label::{Label, Symbology};
use crate::layout::{Cell, PageGeometry};
use crate::paper::PaperConfig;
use crate::render::canvas::{draw_image, fill_rect, stroke_rect};
use crate::render::text::{draw_text_centered, TextStyle};
use crate::render::CodeSize;
use crate::settings::PrintSettings;

pub const BORDER_COLOR: Rgb<u8> = Rgb([0xCC, 0xCC, 0xCC]);
pub const PLACEHOLDER_COLOR: Rgb<u8> = Rgb([0xF0, 0xF0, 0xF0]);
pub const BRAND_COLOR: Rgb<u8> = Rgb([0x33, 0x33, 0x33]);
pub const DATA_COLOR: Rgb<u8> = Rgb([0x55, 0x55, 0x55]);

/// Padding floor in device pixels.
const MIN_PADDING: f64 = 8.0;
const PADDING_RATIO: f64 = 0.04;

/// Barcode width relative to the available height.
const BARCODE_ASPECT: f64 = 2.2;
/// Barcode height relative to its width.
const BARCODE_HEIGHT_RATIO: f64 = 0.45;

/// Font sizes used when the settings carry zero.
const DEFAULT_BRAND_FONT: u32 = 12;
const DEFAULT_DATA_FONT: u32 = 10;
/// Largest font size honored, in points. A cell can never show more.
pub const MAX_FONT_SIZE: u32 = 144;

/// Cell decoration for one pass, already in device pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct CellStyle {
    pub show_border: bool,
    pub border_width: f64,
    pub show_brand: bool,
    /// Sheet-wide brand name, used when a label has no override.
    pub brand_name: String,
    pub brand_font_px: f64,
    pub show_data: bool,
    pub data_font_px: f64,
}

impl CellStyle {
    pub fn from_settings(settings: &PrintSettings, paper: &PaperConfig) -> Self {
        let scale = paper.font_scale();
        let font_px = |size: u32, fallback: u32| {
            let size = if size == 0 { fallback } else { size.min(MAX_FONT_SIZE) };
            (size as f64 * scale).round()
        };
        Self {
            show_border: settings.show_border,
            border_width: scale.max(1.0),
            show_brand: settings.show_brand_name,
            brand_name: settings.brand_name.clone(),
            brand_font_px: font_px(settings.brand_font_size, DEFAULT_BRAND_FONT),
            show_data: settings.show_data_text,
            data_font_px: font_px(settings.data_font_size, DEFAULT_DATA_FONT),
        }
    }

    /// Brand text for a label: its own override, else the sheet-wide name.
    pub fn brand_for<'a>(&'a self, label: &'a Label) -> Option<&'a str> {
        if !self.show_brand {
            return None;
        }
        label
            .brand_text
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| Some(self.brand_name.as_str()).filter(|s| !s.trim().is_empty()))
    }

    fn data_for<'a>(&self, label: &'a Label) -> Option<&'a str> {
        (self.show_data && !label.content.is_empty()).then_some(label.content.as_str())
    }
}

/// Axis-aligned rectangle in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CellRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of a placed cell.
    pub fn of_cell(cell: &Cell, geometry: &PageGeometry) -> Self {
        Self::new(cell.x, cell.y, geometry.cell.label_width, geometry.cell.label_height)
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

/// Where everything inside one cell goes.
#[derive(Debug, Clone, PartialEq)]
pub struct CellMetrics<'a> {
    pub padding: f64,
    pub brand: Option<&'a str>,
    pub brand_band: f64,
    pub data: Option<&'a str>,
    pub data_band: f64,
    pub available_width: f64,
    pub available_height: f64,
    pub code: CellRect,
}

/// Padding for a cell of the given size.
pub fn padding_for(width: f64, height: f64) -> f64 {
    (width.min(height) * PADDING_RATIO).max(MIN_PADDING)
}

/// Code box size inside the available area.
pub fn code_extent(symbology: Symbology, available_width: f64, available_height: f64) -> (f64, f64) {
    if symbology.is_linear() {
        let w = available_width.min(available_height * BARCODE_ASPECT);
        (w, w * BARCODE_HEIGHT_RATIO)
    } else {
        let side = available_width.min(available_height);
        (side, side)
    }
}

/// Lay out one label inside `rect`.
pub fn cell_metrics<'a>(label: &'a Label, rect: CellRect, style: &'a CellStyle) -> CellMetrics<'a> {
    let padding = padding_for(rect.width, rect.height);

    let brand = style.brand_for(label);
    let brand_band = if brand.is_some() { style.brand_font_px + padding } else { 0.0 };
    let data = style.data_for(label);
    let data_band = if data.is_some() { style.data_font_px + padding } else { 0.0 };

    let available_width = rect.width - padding * 2.0;
    let available_height = rect.height - padding * 2.0 - brand_band - data_band;

    let (code_w, code_h) = code_extent(label.symbology, available_width, available_height);
    let top = rect.y + padding + brand_band;
    let code = CellRect::new(
        rect.x + (rect.width - code_w) / 2.0,
        top + (available_height - code_h) / 2.0,
        code_w,
        code_h,
    );

    CellMetrics {
        padding,
        brand,
        brand_band,
        data,
        data_band,
        available_width,
        available_height,
        code,
    }
}

/// Render sizes that match the code boxes of this grid.
///
/// Assumes the sheet-wide brand band; labels whose own brand changes the
/// band get their image resampled when drawn.
pub fn nominal_code_sizes(geometry: &PageGeometry, style: &CellStyle) -> CodeSizes {
    let rect = CellRect::new(0.0, 0.0, geometry.cell.label_width, geometry.cell.label_height);
    let size_for = |symbology: Symbology| {
        // A stand-in label with non-empty content so the data band is counted.
        let probe = Label::new(symbology, " ");
        let m = cell_metrics(&probe, rect, style);
        CodeSize::new(
            m.code.width.round().max(1.0) as u32,
            m.code.height.round().max(1.0) as u32,
        )
    };
    CodeSizes {
        square: size_for(Symbology::Qr),
        linear: size_for(Symbology::Barcode),
    }
}

/// Draw one label cell. `code` is `None` when the render failed.
pub fn draw_cell(
    canvas: &mut RgbImage,
    label: &Label,
    rect: CellRect,
    style: &CellStyle,
    code: Option<&RgbImage>,
) {
    if style.show_border {
        stroke_rect(
            canvas,
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            style.border_width,
            BORDER_COLOR,
        );
    }

    let m = cell_metrics(label, rect, style);

    if let Some(brand) = m.brand {
        draw_text_centered(
            canvas,
            brand,
            rect.center_x(),
            rect.y + m.padding + m.brand_band / 2.0,
            m.available_width,
            TextStyle {
                px_height: style.brand_font_px,
                bold: true,
                color: BRAND_COLOR,
            },
        );
    }

    if m.code.width > 0.0 && m.code.height > 0.0 {
        match code {
            Some(image) => draw_image(canvas, image, m.code.x, m.code.y, m.code.width, m.code.height),
            None => fill_rect(
                canvas,
                m.code.x,
                m.code.y,
                m.code.width,
                m.code.height,
                PLACEHOLDER_COLOR,
            ),
        }
    }

    if let Some(data) = m.data {
        draw_text_centered(
            canvas,
            data,
            rect.center_x(),
            rect.y + rect.height - m.padding - m.data_band / 2.0,
            m.available_width,
            TextStyle {
                px_height: style.data_font_px,
                bold: false,
                color: DATA_COLOR,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::canvas::WHITE;
    use pretty_assertions::assert_eq;

    fn plain_style() -> CellStyle {
        CellStyle {
            show_border: false,
            border_width: 1.0,
            show_brand: false,
            brand_name: String::new(),
            brand_font_px: 50.0,
            show_data: false,
            data_font_px: 42.0,
        }
    }

    #[test]
    fn test_style_scales_fonts() {
        let style = CellStyle::from_settings(&PrintSettings::default(), &PaperConfig::A4);
        assert_eq!(style.brand_font_px, 50.0);
        assert_eq!(style.data_font_px, 42.0);
        assert!((style.border_width - 300.0 / 72.0).abs() < 1e-9);
    }

    #[test]
    fn test_style_caps_font_size() {
        let settings = PrintSettings {
            brand_font_size: 60_000,
            data_font_size: u32::MAX,
            ..PrintSettings::default()
        };
        let style = CellStyle::from_settings(&settings, &PaperConfig::A4);
        assert_eq!(style.brand_font_px, 600.0);
        assert_eq!(style.data_font_px, 600.0);
    }

    #[test]
    fn test_huge_brand_font_stays_in_cell() {
        let settings = PrintSettings {
            show_brand_name: true,
            brand_name: "ACME".into(),
            brand_font_size: 60_000,
            ..PrintSettings::default()
        };
        let style = CellStyle::from_settings(&settings, &PaperConfig::A4);
        let (width, height) = PaperConfig::A4.canvas_size();
        let mut canvas = RgbImage::from_pixel(width, height, WHITE);
        draw_cell(
            &mut canvas,
            &Label::qr("x"),
            CellRect::new(0.0, 0.0, 472.0, 354.0),
            &style,
            None,
        );
        // Everything is squeezed into the cell width.
        let stray = (0..height).any(|y| *canvas.get_pixel(600, y) != WHITE);
        assert!(!stray);
    }

    #[test]
    fn test_padding_floor() {
        assert_eq!(padding_for(100.0, 100.0), 8.0);
        assert_eq!(padding_for(1000.0, 500.0), 20.0);
    }

    #[test]
    fn test_brand_precedence() {
        let style = CellStyle {
            show_brand: true,
            brand_name: "Global".into(),
            ..plain_style()
        };
        assert_eq!(style.brand_for(&Label::qr("x")), Some("Global"));
        assert_eq!(style.brand_for(&Label::qr("x").brand("Own")), Some("Own"));
        assert_eq!(style.brand_for(&Label::qr("x").brand("  ")), Some("Global"));

        let hidden = CellStyle {
            show_brand: false,
            ..style
        };
        assert_eq!(hidden.brand_for(&Label::qr("x").brand("Own")), None);
    }

    #[test]
    fn test_square_code_box() {
        let style = plain_style();
        let label = Label::qr("x");
        let m = cell_metrics(&label, CellRect::new(0.0, 0.0, 472.0, 354.0), &style);
        // padding = max(8, 354 * 0.04) = 14.16
        assert!((m.padding - 14.16).abs() < 1e-9);
        let side = 354.0 - 2.0 * 14.16;
        assert!((m.code.width - side).abs() < 1e-9);
        assert!((m.code.height - side).abs() < 1e-9);
        assert!((m.code.x - (472.0 - side) / 2.0).abs() < 1e-9);
        assert!((m.code.y - 14.16).abs() < 1e-9);
    }

    #[test]
    fn test_bands_shrink_code() {
        let style = CellStyle {
            show_brand: true,
            brand_name: "Tech".into(),
            show_data: true,
            ..plain_style()
        };
        let label = Label::qr("ID-1");
        let m = cell_metrics(&label, CellRect::new(0.0, 0.0, 472.0, 354.0), &style);
        let pad = m.padding;
        assert!((m.brand_band - (50.0 + pad)).abs() < 1e-9);
        assert!((m.data_band - (42.0 + pad)).abs() < 1e-9);
        let expected = 354.0 - 2.0 * pad - m.brand_band - m.data_band;
        assert!((m.available_height - expected).abs() < 1e-9);
        assert!((m.code.width - expected).abs() < 1e-9);
        assert!((m.code.y - (pad + m.brand_band)).abs() < 1e-9);
    }

    #[test]
    fn test_barcode_box() {
        let label = Label::barcode("SKU");
        let style = plain_style();
        let m = cell_metrics(&label, CellRect::new(0.0, 0.0, 472.0, 354.0), &style);
        let avail_w = 472.0 - 2.0 * m.padding;
        assert!((m.code.width - avail_w).abs() < 1e-9);
        assert!((m.code.height - avail_w * 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_placeholder_for_missing_code() {
        let mut canvas = RgbImage::from_pixel(200, 200, WHITE);
        let label = Label::qr("x");
        let rect = CellRect::new(0.0, 0.0, 200.0, 200.0);
        draw_cell(&mut canvas, &label, rect, &plain_style(), None);
        assert_eq!(*canvas.get_pixel(100, 100), PLACEHOLDER_COLOR);
        assert_eq!(*canvas.get_pixel(2, 2), WHITE);
    }

    #[test]
    fn test_code_image_is_drawn_into_box() {
        let mut canvas = RgbImage::from_pixel(200, 200, WHITE);
        let code = RgbImage::from_pixel(50, 50, Rgb([0, 0, 0]));
        let rect = CellRect::new(0.0, 0.0, 200.0, 200.0);
        draw_cell(&mut canvas, &Label::qr("x"), rect, &plain_style(), Some(&code));
        // Box is 8..192 on both axes.
        assert_eq!(*canvas.get_pixel(8, 8), Rgb([0, 0, 0]));
        assert_eq!(*canvas.get_pixel(191, 191), Rgb([0, 0, 0]));
        assert_eq!(*canvas.get_pixel(4, 100), WHITE);
    }

    #[test]
    fn test_border_inside_cell() {
        let mut canvas = RgbImage::from_pixel(120, 120, WHITE);
        let style = CellStyle {
            show_border: true,
            border_width: 2.0,
            ..plain_style()
        };
        draw_cell(&mut canvas, &Label::qr("x"), CellRect::new(10.0, 10.0, 100.0, 100.0), &style, None);
        assert_eq!(*canvas.get_pixel(10, 10), BORDER_COLOR);
        assert_eq!(*canvas.get_pixel(109, 109), BORDER_COLOR);
        assert_eq!(*canvas.get_pixel(9, 9), WHITE);
        assert_eq!(*canvas.get_pixel(110, 110), WHITE);
    }

    #[test]
    fn test_degenerate_cell_does_not_panic() {
        let mut canvas = RgbImage::from_pixel(20, 20, WHITE);
        let style = CellStyle {
            show_brand: true,
            brand_name: "Far too large".into(),
            show_data: true,
            ..plain_style()
        };
        draw_cell(&mut canvas, &Label::barcode("x"), CellRect::new(0.0, 0.0, 10.0, 10.0), &style, None);
        draw_cell(&mut canvas, &Label::qr("x"), CellRect::new(-50.0, -50.0, 30.0, 30.0), &style, None);
    }

    #[test]
    fn test_nominal_sizes_match_metrics() {
        let settings = PrintSettings {
            brand_name: "Tech".into(),
            ..Default::default()
        };
        let paper = PaperConfig::A4;
        let geometry = PageGeometry::for_paper(&paper, &settings.page_layout()).unwrap();
        let style = CellStyle::from_settings(&settings, &paper);
        let sizes = nominal_code_sizes(&geometry, &style);

        let rect = CellRect::new(0.0, 0.0, geometry.cell.label_width, geometry.cell.label_height);
        let qr_label = Label::qr("x");
        let m = cell_metrics(&qr_label, rect, &style);
        assert_eq!(sizes.square.width, m.code.width.round() as u32);
        assert_eq!(sizes.square.width, sizes.square.height);
        assert!(sizes.linear.width > sizes.linear.height);
    }
}
