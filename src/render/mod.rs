//! # Code Renderer
//!
//! Produces one raster image per `(symbology, content, size, style)`.
//!
//! ## Pipeline
//!
//! ```text
//! content ──encode──▶ SymbolMatrix ──rasterize──▶ black/white GrayImage
//!                                                       │
//!                                          ink_mask (luma < 180)
//!                                                       │
//!                          Fill::Solid / Fill::Pattern ─┴─▶ RgbImage on white
//!                                                       │
//!                                      logo overlay (QR only, optional)
//! ```
//!
//! ## Modules
//!
//! - [`symbol`]: encoders and module matrices
//! - [`fill`]: mask-and-fill coloring
//! - [`logo`]: QR logo overlay
//! - [`canvas`]: raster primitives shared with the compositor
//! - [`text`]: bitmap text

pub mod canvas;
pub mod fill;
pub mod logo;
pub mod symbol;
pub mod text;

pub use fill::Fill;
pub use logo::LogoOverlay;

use image::RgbImage;

use crate::assets::ResolvedAssets;
use crate::error::SheetError;
use crate::label::Symbology;
use crate::settings::PrintSettings;

/// Pixel box a code is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodeSize {
    pub width: u32,
    pub height: u32,
}

impl CodeSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn square(side: u32) -> Self {
        Self::new(side, side)
    }
}

/// Appearance shared by every code in one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeStyle {
    pub fill: Fill,
    /// Applied to QR symbols only.
    pub logo: Option<LogoOverlay>,
}

impl CodeStyle {
    /// Combine settings with the decoded assets.
    ///
    /// Image fill without a decoded pattern falls back to the solid color;
    /// a logo that failed to load is simply absent.
    pub fn from_settings(settings: &PrintSettings, assets: &ResolvedAssets) -> Self {
        let fill = match (settings.active_pattern(), &assets.pattern) {
            (Some(_), Some(pattern)) => Fill::Pattern(pattern.clone()),
            _ => Fill::Solid(settings.code_rgb()),
        };
        let logo = match (settings.active_logo(), &assets.logo) {
            (Some(_), Some(image)) => Some(LogoOverlay {
                image: image.clone(),
                position: settings.logo_position,
            }),
            _ => None,
        };
        Self { fill, logo }
    }
}

/// Renders a single code image.
///
/// Implementations must be shareable across the render fan-out.
pub trait CodeRenderer: Sync {
    fn render(
        &self,
        symbology: Symbology,
        content: &str,
        size: CodeSize,
        style: &CodeStyle,
    ) -> Result<RgbImage, SheetError>;
}

/// The default renderer: encode, rasterize, mask-and-fill, overlay.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolRenderer;

impl CodeRenderer for SymbolRenderer {
    fn render(
        &self,
        symbology: Symbology,
        content: &str,
        size: CodeSize,
        style: &CodeStyle,
    ) -> Result<RgbImage, SheetError> {
        let matrix = symbol::encode(symbology, content)?;
        let raw = matrix.rasterize(size);
        let mask = fill::ink_mask(&raw);
        let mut image = fill::apply_fill(&mask, &style.fill);

        if symbology == Symbology::Qr {
            if let Some(overlay) = &style.logo {
                logo::apply_logo(&mut image, overlay);
            }
        }
        Ok(image)
    }
}
