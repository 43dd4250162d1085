//! Bitmap text for brand and data bands.
//!
//! Glyphs come from the Spleen font family. The smallest face at least as
//! tall as the requested pixel height is picked and scaled with bilinear
//! coverage, which keeps 300 DPI output smooth. Bold is a one-pixel
//! horizontal smear of the source glyph.

use image::{Rgb, RgbImage};
use std::ops::Range;
use spleen_font::{PSF2Font, FONT_12X24, FONT_6X12, FONT_8X16};

use super::canvas::blend_pixel;

/// A Spleen face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    S6x12,
    S8x16,
    S12x24,
}

impl Face {
    fn for_height(px_height: f64) -> Self {
        if px_height <= 12.0 {
            Face::S6x12
        } else if px_height <= 16.0 {
            Face::S8x16
        } else {
            Face::S12x24
        }
    }

    fn cell(&self) -> (usize, usize) {
        match self {
            Face::S6x12 => (6, 12),
            Face::S8x16 => (8, 16),
            Face::S12x24 => (12, 24),
        }
    }

    fn data(&self) -> &'static [u8] {
        match self {
            Face::S6x12 => FONT_6X12,
            Face::S8x16 => FONT_8X16,
            Face::S12x24 => FONT_12X24,
        }
    }
}

/// How a run of text is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub px_height: f64,
    pub bold: bool,
    pub color: Rgb<u8>,
}

/// One line of text rasterized at source resolution.
struct GlyphStrip {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl GlyphStrip {
    fn build(text: &str, face: Face, bold: bool) -> Self {
        let (cw, ch) = face.cell();
        let chars: Vec<char> = text.chars().collect();
        let width = chars.len() * cw;
        let mut bits = vec![false; width * ch];

        let mut font = PSF2Font::new(face.data()).ok();
        for (i, c) in chars.iter().enumerate() {
            let origin = i * cw;
            let mut utf8 = [0u8; 4];
            let glyph = font
                .as_mut()
                .and_then(|f| f.glyph_for_utf8(c.encode_utf8(&mut utf8).as_bytes()));
            match glyph {
                Some(glyph) => {
                    for (row_y, row) in glyph.enumerate() {
                        for (col_x, on) in row.enumerate() {
                            if on && row_y < ch && col_x < cw {
                                bits[row_y * width + origin + col_x] = true;
                            }
                        }
                    }
                }
                None if !c.is_whitespace() => draw_box(&mut bits, width, origin, cw, ch),
                None => {}
            }
        }

        if bold {
            for y in 0..ch {
                for x in (1..width).rev() {
                    if bits[y * width + x - 1] {
                        bits[y * width + x] = true;
                    }
                }
            }
        }

        Self {
            width,
            height: ch,
            bits,
        }
    }

    fn at(&self, x: i64, y: i64) -> f32 {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return 0.0;
        }
        if self.bits[y as usize * self.width + x as usize] { 1.0 } else { 0.0 }
    }

    /// Bilinear coverage at a fractional source position.
    fn sample(&self, u: f64, v: f64) -> f32 {
        let x0 = u.floor();
        let y0 = v.floor();
        let fx = (u - x0) as f32;
        let fy = (v - y0) as f32;
        let (x0, y0) = (x0 as i64, y0 as i64);
        let top = self.at(x0, y0) * (1.0 - fx) + self.at(x0 + 1, y0) * fx;
        let bottom = self.at(x0, y0 + 1) * (1.0 - fx) + self.at(x0 + 1, y0 + 1) * fx;
        top * (1.0 - fy) + bottom * fy
    }
}

/// Outline box for characters the font lacks.
fn draw_box(bits: &mut [bool], stride: usize, origin: usize, cw: usize, ch: usize) {
    let (x0, x1) = (origin + 1, origin + cw - 2);
    let (y0, y1) = (2, ch - 3);
    for x in x0..=x1 {
        bits[y0 * stride + x] = true;
        bits[y1 * stride + x] = true;
    }
    for y in y0..=y1 {
        bits[y * stride + x0] = true;
        bits[y * stride + x1] = true;
    }
}

/// Natural width of `text` at `px_height`, before any squeezing.
pub fn measure(text: &str, px_height: f64) -> f64 {
    let face = Face::for_height(px_height);
    let (cw, ch) = face.cell();
    text.chars().count() as f64 * cw as f64 * px_height / ch as f64
}

/// Offsets in `0..len` whose pixel `start + offset` lands in `0..limit`.
fn visible_span(start: i64, len: i64, limit: u32) -> Range<i64> {
    let from = start.saturating_neg().clamp(0, len.max(0));
    let to = (limit as i64).saturating_sub(start).clamp(from, len.max(from));
    from..to
}

/// Draw one line centred on `(center_x, center_y)`.
///
/// Text wider than `max_width` is squeezed horizontally to fit.
pub fn draw_text_centered(
    canvas: &mut RgbImage,
    text: &str,
    center_x: f64,
    center_y: f64,
    max_width: f64,
    style: TextStyle,
) {
    if text.is_empty() || !(style.px_height > 0.0) || !(max_width > 0.0) {
        return;
    }

    let face = Face::for_height(style.px_height);
    let strip = GlyphStrip::build(text, face, style.bold);
    if strip.width == 0 {
        return;
    }

    let scale_y = style.px_height / strip.height as f64;
    let natural = strip.width as f64 * scale_y;
    let scale_x = scale_y * (max_width / natural).min(1.0);

    let out_w = (strip.width as f64 * scale_x).round() as i64;
    let out_h = style.px_height.round() as i64;
    let left = (center_x - out_w as f64 / 2.0).round() as i64;
    let top = (center_y - out_h as f64 / 2.0).round() as i64;

    let rows = visible_span(top, out_h, canvas.height());
    let cols = visible_span(left, out_w, canvas.width());
    for dy in rows {
        let v = (dy as f64 + 0.5) / scale_y - 0.5;
        for dx in cols.clone() {
            let u = (dx as f64 + 0.5) / scale_x - 0.5;
            let coverage = strip.sample(u, v);
            if coverage > 0.0 {
                blend_pixel(canvas, left + dx, top + dy, style.color, coverage);
            }
        }
    }
}
