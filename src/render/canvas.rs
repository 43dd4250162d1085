//! Raster drawing primitives over `RgbImage`.
//!
//! Coordinates are `f64` device pixels; edges are rounded to the nearest
//! pixel and everything is clipped to the canvas, so callers never need to
//! bounds-check.

use image::{imageops, imageops::FilterType, Rgb, RgbImage, RgbaImage};

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Integer pixel bounds, half-open, already clipped to a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    /// Round a floating rectangle and clip it to `width × height`.
    pub fn clip(x: f64, y: f64, w: f64, h: f64, width: u32, height: u32) -> Option<Self> {
        if !(w > 0.0) || !(h > 0.0) {
            return None;
        }
        let clamp = |v: f64, max: u32| v.round().clamp(0.0, max as f64) as u32;
        let rect = PixelRect {
            x0: clamp(x, width),
            y0: clamp(y, height),
            x1: clamp(x + w, width),
            y1: clamp(y + h, height),
        };
        (rect.x0 < rect.x1 && rect.y0 < rect.y1).then_some(rect)
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }
}

/// Fill a rectangle with a solid color.
pub fn fill_rect(canvas: &mut RgbImage, x: f64, y: f64, w: f64, h: f64, color: Rgb<u8>) {
    let Some(rect) = PixelRect::clip(x, y, w, h, canvas.width(), canvas.height()) else {
        return;
    };
    for py in rect.y0..rect.y1 {
        for px in rect.x0..rect.x1 {
            canvas.put_pixel(px, py, color);
        }
    }
}

/// Stroke a rectangle outline of `thickness` pixels, inside the bounds.
pub fn stroke_rect(
    canvas: &mut RgbImage,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    thickness: f64,
    color: Rgb<u8>,
) {
    let t = thickness.max(1.0).min(w / 2.0).min(h / 2.0);
    fill_rect(canvas, x, y, w, t, color);
    fill_rect(canvas, x, y + h - t, w, t, color);
    fill_rect(canvas, x, y + t, t, h - 2.0 * t, color);
    fill_rect(canvas, x + w - t, y + t, t, h - 2.0 * t, color);
}

/// Mix `color` into one pixel with `coverage` in `0.0..=1.0`.
pub fn blend_pixel(canvas: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let coverage = coverage.clamp(0.0, 1.0);
    if coverage <= 0.0 {
        return;
    }
    let dst = canvas.get_pixel_mut(x as u32, y as u32);
    for c in 0..3 {
        dst[c] = mix(dst[c], color[c], coverage);
    }
}

/// Alpha-composite an RGBA image with its top-left corner at `(x, y)`.
pub fn draw_rgba(canvas: &mut RgbImage, src: &RgbaImage, x: i64, y: i64) {
    for (sx, sy, px) in src.enumerate_pixels() {
        let alpha = px[3] as f32 / 255.0;
        blend_pixel(
            canvas,
            x + sx as i64,
            y + sy as i64,
            Rgb([px[0], px[1], px[2]]),
            alpha,
        );
    }
}

/// Copy `src` into the rectangle, resampling when the sizes differ.
///
/// Nearest-neighbour keeps code modules crisp.
pub fn draw_image(canvas: &mut RgbImage, src: &RgbImage, x: f64, y: f64, w: f64, h: f64) {
    let target_w = w.round() as i64;
    let target_h = h.round() as i64;
    if target_w <= 0 || target_h <= 0 || src.width() == 0 || src.height() == 0 {
        return;
    }
    let (target_w, target_h) = (target_w as u32, target_h as u32);

    let resized;
    let src = if src.width() == target_w && src.height() == target_h {
        src
    } else {
        resized = imageops::resize(src, target_w, target_h, FilterType::Nearest);
        &resized
    };

    let ox = x.round() as i64;
    let oy = y.round() as i64;
    for (sx, sy, px) in src.enumerate_pixels() {
        let dx = ox + sx as i64;
        let dy = oy + sy as i64;
        if dx >= 0 && dy >= 0 && dx < canvas.width() as i64 && dy < canvas.height() as i64 {
            canvas.put_pixel(dx as u32, dy as u32, *px);
        }
    }
}

#[inline]
fn mix(under: u8, over: u8, alpha: f32) -> u8 {
    (under as f32 * (1.0 - alpha) + over as f32 * alpha).round() as u8
}

/// Composite an RGBA pixel over white.
#[inline]
pub fn flatten_on_white(px: image::Rgba<u8>) -> Rgb<u8> {
    let alpha = px[3] as f32 / 255.0;
    Rgb([mix(255, px[0], alpha), mix(255, px[1], alpha), mix(255, px[2], alpha)])
}
