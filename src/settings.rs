//! # Print Settings
//!
//! The settings document supplied by the caller alongside the label list.
//! Every field has a default so partial documents deserialize; the defaults
//! reproduce a 4 × 3 cm label grid with 0.3 cm spacing on A4.
//!
//! ```
//! use labelsheet::settings::PrintSettings;
//!
//! let settings: PrintSettings =
//!     serde_json::from_str(r##"{"labelWidthCm": 5, "codeColor": "#ff0000"}"##).unwrap();
//! assert_eq!(settings.label_height_cm, 3.0);
//! assert_eq!(settings.code_rgb(), image::Rgb([255, 0, 0]));
//! ```

use clap::ValueEnum;
use image::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A4 width in centimetres, used by the grid sizing mode.
const A4_WIDTH_CM: f64 = 21.0;
/// A4 height in centimetres, used by the grid sizing mode.
const A4_HEIGHT_CM: f64 = 29.7;

/// Default label spacing in centimetres.
pub const DEFAULT_SPACING_CM: f64 = 0.3;

/// Default module color.
pub const DEFAULT_CODE_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Output container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    Png,
    Svg,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Png => "image/png",
            ExportFormat::Svg => "image/svg+xml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Where the ink color of a code comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    /// Flat `codeColor`
    #[default]
    #[serde(alias = "solid")]
    Color,
    /// `qrPatternImage` stretched over the symbol
    #[serde(alias = "pattern")]
    Image,
}

/// Logo anchor inside a QR symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogoPosition {
    TopLeft,
    #[serde(alias = "top")]
    TopCenter,
    TopRight,
    #[serde(alias = "left")]
    CenterLeft,
    #[default]
    #[serde(alias = "center-center", alias = "middle")]
    Center,
    #[serde(alias = "right")]
    CenterRight,
    BottomLeft,
    #[serde(alias = "bottom")]
    BottomCenter,
    BottomRight,
}

/// Position of an anchor along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    Middle,
    End,
}

impl LogoPosition {
    pub const ALL: [LogoPosition; 9] = [
        LogoPosition::TopLeft,
        LogoPosition::TopCenter,
        LogoPosition::TopRight,
        LogoPosition::CenterLeft,
        LogoPosition::Center,
        LogoPosition::CenterRight,
        LogoPosition::BottomLeft,
        LogoPosition::BottomCenter,
        LogoPosition::BottomRight,
    ];

    /// Horizontal and vertical edge of the anchor.
    pub fn edges(&self) -> (Edge, Edge) {
        use Edge::*;
        match self {
            LogoPosition::TopLeft => (Start, Start),
            LogoPosition::TopCenter => (Middle, Start),
            LogoPosition::TopRight => (End, Start),
            LogoPosition::CenterLeft => (Start, Middle),
            LogoPosition::Center => (Middle, Middle),
            LogoPosition::CenterRight => (End, Middle),
            LogoPosition::BottomLeft => (Start, End),
            LogoPosition::BottomCenter => (Middle, End),
            LogoPosition::BottomRight => (End, End),
        }
    }
}

/// Label cell geometry in centimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayoutSettings {
    pub label_width_cm: f64,
    pub label_height_cm: f64,
    pub spacing_x_cm: f64,
    pub spacing_y_cm: f64,
    /// Overrides the auto-fit column count, still capped by the page width.
    pub forced_columns_per_row: Option<u32>,
}

impl Default for PageLayoutSettings {
    fn default() -> Self {
        Self {
            label_width_cm: 4.0,
            label_height_cm: 3.0,
            spacing_x_cm: DEFAULT_SPACING_CM,
            spacing_y_cm: DEFAULT_SPACING_CM,
            forced_columns_per_row: None,
        }
    }
}

impl PageLayoutSettings {
    /// Derive the label size from a requested grid on A4.
    ///
    /// The spacing runs around every label including the page edges, so
    /// `columns` labels need `columns + 1` gaps.
    pub fn from_grid(columns: u32, rows: u32, spacing_cm: f64) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        let spacing = spacing_cm.max(0.0);
        Self {
            label_width_cm: (A4_WIDTH_CM - spacing * (columns as f64 + 1.0)) / columns as f64,
            label_height_cm: (A4_HEIGHT_CM - spacing * (rows as f64 + 1.0)) / rows as f64,
            spacing_x_cm: spacing,
            spacing_y_cm: spacing,
            forced_columns_per_row: Some(columns),
        }
    }
}

/// The full settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintSettings {
    pub label_width_cm: f64,
    pub label_height_cm: f64,
    pub spacing_x_cm: f64,
    pub spacing_y_cm: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns_per_row: Option<u32>,

    pub show_border: bool,
    pub brand_name: String,
    pub show_brand_name: bool,
    pub brand_font_size: u32,
    pub show_data_text: bool,
    pub data_font_size: u32,

    /// `#RRGGBB`; anything unparseable renders black.
    pub code_color: String,
    pub qr_fill_mode: FillMode,
    /// Data URI, URL or path of the pattern image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_pattern_image: Option<String>,

    /// Data URI, URL or path of the logo image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_image: Option<String>,
    pub show_logo: bool,
    pub logo_position: LogoPosition,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            label_width_cm: 4.0,
            label_height_cm: 3.0,
            spacing_x_cm: DEFAULT_SPACING_CM,
            spacing_y_cm: DEFAULT_SPACING_CM,
            columns_per_row: None,
            show_border: true,
            brand_name: String::new(),
            show_brand_name: true,
            brand_font_size: 12,
            show_data_text: false,
            data_font_size: 10,
            code_color: "#000000".to_string(),
            qr_fill_mode: FillMode::Color,
            qr_pattern_image: None,
            logo_image: None,
            show_logo: false,
            logo_position: LogoPosition::Center,
        }
    }
}

impl PrintSettings {
    /// Cell geometry part of the settings.
    pub fn page_layout(&self) -> PageLayoutSettings {
        PageLayoutSettings {
            label_width_cm: self.label_width_cm,
            label_height_cm: self.label_height_cm,
            spacing_x_cm: self.spacing_x_cm,
            spacing_y_cm: self.spacing_y_cm,
            forced_columns_per_row: self.columns_per_row.filter(|&c| c > 0),
        }
    }

    /// Replace the cell geometry.
    pub fn with_layout(mut self, layout: PageLayoutSettings) -> Self {
        self.label_width_cm = layout.label_width_cm;
        self.label_height_cm = layout.label_height_cm;
        self.spacing_x_cm = layout.spacing_x_cm;
        self.spacing_y_cm = layout.spacing_y_cm;
        self.columns_per_row = layout.forced_columns_per_row;
        self
    }

    /// Module color, normalized.
    pub fn code_rgb(&self) -> Rgb<u8> {
        parse_hex_color(&self.code_color).unwrap_or(DEFAULT_CODE_COLOR)
    }

    /// Logo reference, only when the overlay is switched on.
    pub fn active_logo(&self) -> Option<&str> {
        if !self.show_logo {
            return None;
        }
        self.logo_image.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Pattern reference, only in image fill mode.
    pub fn active_pattern(&self) -> Option<&str> {
        if self.qr_fill_mode != FillMode::Image {
            return None;
        }
        self.qr_pattern_image
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }
}

/// Parse `#RRGGBB` or `RRGGBB`.
pub fn parse_hex_color(value: &str) -> Option<Rgb<u8>> {
    let raw = value.trim();
    let hex = raw.strip_prefix('#').unwrap_or(raw);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}
