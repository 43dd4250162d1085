//! Logo overlay for QR symbols.
//!
//! ```text
//! ┌───────────────────────┐
//! │ pad                   │   logo side  = 25% of symbol side
//! │   ┌─────┐             │   pad        = 4% of symbol side
//! │   │logo │             │   backing    = logo side + 8%, white
//! │   └─────┘             │
//! │                       │
//! └───────────────────────┘
//! ```
//!
//! Level-H error correction tolerates the covered modules.

use image::{imageops, imageops::FilterType, RgbImage, RgbaImage};
use std::sync::Arc;

use super::canvas::{draw_rgba, fill_rect, WHITE};
use crate::settings::{Edge, LogoPosition};

pub const LOGO_RATIO: f64 = 0.25;
pub const EDGE_PADDING_RATIO: f64 = 0.04;
pub const BACKING_OVERSIZE: f64 = 0.08;

/// A decoded logo and where to put it.
#[derive(Debug, Clone, PartialEq)]
pub struct LogoOverlay {
    pub image: Arc<RgbaImage>,
    pub position: LogoPosition,
}

/// Square box occupied by the logo inside a symbol of side `side`.
pub fn logo_box(side: f64, position: LogoPosition) -> (f64, f64, f64) {
    let logo = side * LOGO_RATIO;
    let pad = side * EDGE_PADDING_RATIO;
    let place = |edge: Edge| match edge {
        Edge::Start => pad,
        Edge::Middle => (side - logo) / 2.0,
        Edge::End => side - logo - pad,
    };
    let (h, v) = position.edges();
    (place(h), place(v), logo)
}

/// Composite the logo onto a rendered QR symbol.
pub fn apply_logo(symbol: &mut RgbImage, overlay: &LogoOverlay) {
    let side = symbol.width().min(symbol.height()) as f64;
    let (x, y, size) = logo_box(side, overlay.position);
    let logo_px = size.round() as u32;
    if logo_px == 0 || overlay.image.width() == 0 || overlay.image.height() == 0 {
        return;
    }

    let backing = size * (1.0 + BACKING_OVERSIZE);
    let inset = (backing - size) / 2.0;
    fill_rect(symbol, x - inset, y - inset, backing, backing, WHITE);

    let scaled = imageops::resize(overlay.image.as_ref(), logo_px, logo_px, FilterType::Triangle);
    draw_rgba(symbol, &scaled, x.round() as i64, y.round() as i64);
}
