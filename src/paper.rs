//! # Paper Configuration
//!
//! Physical constants of the output sheet.
//!
//! ## Supported Sheets
//!
//! | Sheet | Size | Resolution | Canvas |
//! |-------|------|------------|--------|
//! | A4 portrait | 210 × 297 mm | 300 DPI | 2480 × 3508 px |
//!
//! ## Calculations
//!
//! ```text
//! px = cm / 2.54 * dpi
//!
//! For A4 at 300 DPI:
//!   width  = 21.0 / 2.54 * 300 ≈ 2480.3 px
//!   height = 29.7 / 2.54 * 300 ≈ 3507.9 px
//! ```
//!
//! Font sizes are authored against a 72 DPI reference and scaled by
//! `dpi / 72` when drawn.

/// Reference resolution for user-entered font sizes.
pub const FONT_REFERENCE_DPI: f64 = 72.0;

/// Centimetres per inch.
pub const CM_PER_INCH: f64 = 2.54;

/// Physical page plus render resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaperConfig {
    /// Sheet name
    pub name: &'static str,
    /// Page width in millimetres
    pub width_mm: f64,
    /// Page height in millimetres
    pub height_mm: f64,
    /// Raster resolution in dots per inch
    pub dpi: f64,
}

impl PaperConfig {
    /// A4 portrait rendered at 300 DPI.
    pub const A4: PaperConfig = PaperConfig {
        name: "A4",
        width_mm: 210.0,
        height_mm: 297.0,
        dpi: 300.0,
    };

    /// Convert centimetres to device pixels.
    pub fn cm_to_px(&self, cm: f64) -> f64 {
        cm / CM_PER_INCH * self.dpi
    }

    /// Exact page width in device pixels.
    pub fn width_px(&self) -> f64 {
        self.cm_to_px(self.width_mm / 10.0)
    }

    /// Exact page height in device pixels.
    pub fn height_px(&self) -> f64 {
        self.cm_to_px(self.height_mm / 10.0)
    }

    /// Integer canvas size for page rasters.
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.width_px().round() as u32, self.height_px().round() as u32)
    }

    /// Factor applied to user font sizes.
    pub fn font_scale(&self) -> f64 {
        self.dpi / FONT_REFERENCE_DPI
    }

    /// Page width in PDF points (1/72 inch).
    pub fn width_pt(&self) -> f64 {
        self.width_mm / 25.4 * 72.0
    }

    /// Page height in PDF points (1/72 inch).
    pub fn height_pt(&self) -> f64 {
        self.height_mm / 25.4 * 72.0
    }
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self::A4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_canvas() {
        assert_eq!(PaperConfig::A4.canvas_size(), (2480, 3508));
    }

    #[test]
    fn test_font_scale() {
        let scale = PaperConfig::A4.font_scale();
        assert!((scale - 300.0 / 72.0).abs() < 1e-12);
    }

    #[test]
    fn test_cm_to_px() {
        assert!((PaperConfig::A4.cm_to_px(2.54) - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_points() {
        assert!((PaperConfig::A4.width_pt() - 595.2756).abs() < 1e-3);
        assert!((PaperConfig::A4.height_pt() - 841.8898).abs() < 1e-3);
    }
}
