//! Mask-and-fill coloring.
//!
//! The raw symbol is pure black on white. A binary mask is built by
//! luminance-thresholding every pixel; the fill (flat color or a stretched
//! pattern image) is kept only where the mask says "ink" and the result is
//! flattened onto white. Module positions are never touched.

use image::{imageops, imageops::FilterType, GrayImage, Luma, Rgb, RgbImage, RgbaImage};
use std::sync::Arc;

use super::canvas::{flatten_on_white, WHITE};

/// Pixels darker than this are ink.
pub const INK_THRESHOLD: f32 = 180.0;

const MASK_INK: Luma<u8> = Luma([255]);
const MASK_CLEAR: Luma<u8> = Luma([0]);

/// Ink source for a symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Solid(Rgb<u8>),
    /// Stretched over the whole symbol before masking.
    Pattern(Arc<RgbaImage>),
}

impl Default for Fill {
    fn default() -> Self {
        Fill::Solid(Rgb([0, 0, 0]))
    }
}

/// ITU-R BT.601 luma.
#[inline]
pub fn luminance(px: Rgb<u8>) -> f32 {
    0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32
}

/// Binary opacity mask: 255 = ink, 0 = transparent.
pub fn ink_mask(raw: &GrayImage) -> GrayImage {
    GrayImage::from_fn(raw.width(), raw.height(), |x, y| {
        let v = raw.get_pixel(x, y)[0];
        if luminance(Rgb([v, v, v])) < INK_THRESHOLD {
            MASK_INK
        } else {
            MASK_CLEAR
        }
    })
}

/// Paint `fill` through `mask` onto a white background.
pub fn apply_fill(mask: &GrayImage, fill: &Fill) -> RgbImage {
    let (w, h) = mask.dimensions();
    match fill {
        Fill::Solid(color) => RgbImage::from_fn(w, h, |x, y| {
            if mask.get_pixel(x, y)[0] > 0 { *color } else { WHITE }
        }),
        Fill::Pattern(pattern) => {
            let stretched = imageops::resize(pattern.as_ref(), w, h, FilterType::Triangle);
            RgbImage::from_fn(w, h, |x, y| {
                if mask.get_pixel(x, y)[0] > 0 {
                    flatten_on_white(*stretched.get_pixel(x, y))
                } else {
                    WHITE
                }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checker() -> GrayImage {
        GrayImage::from_fn(4, 4, |x, y| if (x + y) % 2 == 0 { Luma([0]) } else { Luma([255]) })
    }

    #[test]
    fn test_threshold() {
        let raw = GrayImage::from_fn(3, 1, |x, _| Luma([[0u8, 179, 180][x as usize]]));
        let mask = ink_mask(&raw);
        assert_eq!(mask.get_pixel(0, 0)[0], 255);
        assert_eq!(mask.get_pixel(1, 0)[0], 255);
        assert_eq!(mask.get_pixel(2, 0)[0], 0);
    }

    #[test]
    fn test_solid_fill() {
        let mask = ink_mask(&checker());
        let red = Rgb([255, 0, 0]);
        let img = apply_fill(&mask, &Fill::Solid(red));
        assert_eq!(*img.get_pixel(0, 0), red);
        assert_eq!(*img.get_pixel(1, 0), WHITE);
    }

    #[test]
    fn test_pattern_fill_only_on_ink() {
        let mask = ink_mask(&checker());
        let pattern = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255]));
        let img = apply_fill(&mask, &Fill::Pattern(Arc::new(pattern)));
        assert_eq!(*img.get_pixel(0, 0), Rgb([0, 0, 255]));
        assert_eq!(*img.get_pixel(0, 1), WHITE);
    }

    #[test]
    fn test_transparent_pattern_flattens_to_white() {
        let mask = ink_mask(&checker());
        let pattern = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
        let img = apply_fill(&mask, &Fill::Pattern(Arc::new(pattern)));
        assert!(img.pixels().all(|p| *p == WHITE));
    }
}
