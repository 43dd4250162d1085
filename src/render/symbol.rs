//! Symbol encoding: content → module matrix → black-on-white raster.
//!
//! - QR via the `qrcode` crate, error-correction level H
//! - CODE128 via `barcoders`, code sets A/B/C picked per run of content
//! - Data Matrix (ECC 200) via `datamatrix`
//!
//! The matrix is the only thing the encoders produce. Scaling and coloring
//! happen afterwards, so the module geometry is identical for every style.

use barcoders::sym::code128::Code128;
use datamatrix::{DataMatrix, SymbolList};
use image::{GrayImage, Luma};
use qrcode::{EcLevel, QrCode};

use super::CodeSize;
use crate::error::SheetError;
use crate::label::Symbology;

pub const INK: Luma<u8> = Luma([0]);
pub const PAPER: Luma<u8> = Luma([255]);

/// Dark/light modules of an encoded symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMatrix {
    pub width: usize,
    pub height: usize,
    modules: Vec<bool>,
    /// One-dimensional symbols stretch to fill their box.
    linear: bool,
}

impl SymbolMatrix {
    fn new(width: usize, height: usize, linear: bool) -> Self {
        Self {
            width,
            height,
            modules: vec![false; width * height],
            linear,
        }
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.modules[y * self.width + x]
    }

    fn set(&mut self, x: usize, y: usize) {
        if x < self.width && y < self.height {
            self.modules[y * self.width + x] = true;
        }
    }

    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|&&m| m).count()
    }

    /// Rasterize black-on-white into a `size` box.
    ///
    /// Linear symbols stretch horizontally and fill the full height. Matrix
    /// symbols keep square modules and are centred in the box.
    pub fn rasterize(&self, size: CodeSize) -> GrayImage {
        let (w, h) = (size.width.max(1), size.height.max(1));
        let mut img = GrayImage::from_pixel(w, h, PAPER);
        if self.width == 0 || self.height == 0 {
            return img;
        }

        if self.linear {
            for px in 0..w {
                let mx = px as usize * self.width / w as usize;
                if self.is_dark(mx, 0) {
                    for py in 0..h {
                        img.put_pixel(px, py, INK);
                    }
                }
            }
            return img;
        }

        // Largest box with the symbol's aspect ratio that fits.
        let scale = (w as f64 / self.width as f64).min(h as f64 / self.height as f64);
        let draw_w = ((self.width as f64 * scale).round() as u32).clamp(1, w);
        let draw_h = ((self.height as f64 * scale).round() as u32).clamp(1, h);
        let off_x = (w - draw_w) / 2;
        let off_y = (h - draw_h) / 2;

        for py in 0..draw_h {
            let my = py as usize * self.height / draw_h as usize;
            for px in 0..draw_w {
                let mx = px as usize * self.width / draw_w as usize;
                if self.is_dark(mx, my) {
                    img.put_pixel(off_x + px, off_y + py, INK);
                }
            }
        }
        img
    }
}

/// Encode `content` with the given symbology.
pub fn encode(symbology: Symbology, content: &str) -> Result<SymbolMatrix, SheetError> {
    if content.is_empty() {
        return Err(SheetError::encoding(symbology, content, "empty content"));
    }
    match symbology {
        Symbology::Qr => encode_qr(content),
        Symbology::Barcode => encode_code128(content),
        Symbology::DataMatrix => encode_data_matrix(content),
    }
}

fn encode_qr(content: &str) -> Result<SymbolMatrix, SheetError> {
    let code = QrCode::with_error_correction_level(content.as_bytes(), EcLevel::H)
        .map_err(|e| SheetError::encoding(Symbology::Qr, content, e.to_string()))?;

    let size = code.width();
    let mut matrix = SymbolMatrix::new(size, size, false);
    for y in 0..size {
        for x in 0..size {
            if code[(x, y)] == qrcode::Color::Dark {
                matrix.set(x, y);
            }
        }
    }
    Ok(matrix)
}

/// CODE128 code set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeSet {
    A,
    B,
    C,
}

impl CodeSet {
    /// `barcoders` start/switch marker.
    fn marker(self) -> char {
        match self {
            CodeSet::A => '\u{00C0}',
            CodeSet::B => '\u{0181}',
            CodeSet::C => '\u{0106}',
        }
    }
}

/// Shortest digit run that pays for a switch to set C.
const MIN_DIGIT_RUN: usize = 4;

/// Content annotated with code-set markers.
///
/// Digit runs go to set C as pairs, control characters to set A and
/// everything else to set B. Characters both A and B can carry stay in the
/// current set.
fn code128_data(content: &str) -> Result<String, SheetError> {
    if let Some(bad) = content.chars().find(|c| !c.is_ascii() || *c == '\u{7f}') {
        return Err(SheetError::encoding(
            Symbology::Barcode,
            content,
            format!("character {:?} cannot be encoded in CODE128", bad),
        ));
    }

    let bytes = content.as_bytes();
    let mut data = String::with_capacity(content.len() + 4);
    let mut current: Option<CodeSet> = None;

    let mut i = 0;
    while i < bytes.len() {
        let run = bytes[i..].iter().take_while(|b| b.is_ascii_digit()).count();
        let all_digits = i == 0 && run == bytes.len();
        if run >= MIN_DIGIT_RUN || (all_digits && run >= 2) {
            let even = run - run % 2;
            switch_set(&mut data, &mut current, CodeSet::C);
            data.push_str(&content[i..i + even]);
            i += even;
            continue;
        }

        let b = bytes[i];
        let set = if b < 0x20 {
            CodeSet::A
        } else if b >= 0x60 {
            CodeSet::B
        } else if current == Some(CodeSet::A) {
            CodeSet::A
        } else {
            CodeSet::B
        };
        switch_set(&mut data, &mut current, set);
        data.push(b as char);
        i += 1;
    }
    Ok(data)
}

fn switch_set(data: &mut String, current: &mut Option<CodeSet>, set: CodeSet) {
    if *current != Some(set) {
        data.push(set.marker());
        *current = Some(set);
    }
}

fn encode_code128(content: &str) -> Result<SymbolMatrix, SheetError> {
    let data = code128_data(content)?;
    let barcode = Code128::new(&data)
        .map_err(|e| SheetError::encoding(Symbology::Barcode, content, format!("{:?}", e)))?;

    let bars = barcode.encode();
    let mut matrix = SymbolMatrix::new(bars.len(), 1, true);
    for (x, &bar) in bars.iter().enumerate() {
        if bar == 1 {
            matrix.set(x, 0);
        }
    }
    Ok(matrix)
}

fn encode_data_matrix(content: &str) -> Result<SymbolMatrix, SheetError> {
    let code = DataMatrix::encode(content.as_bytes(), SymbolList::default()).map_err(|e| {
        SheetError::encoding(Symbology::DataMatrix, content, format!("{:?}", e))
    })?;

    let bitmap = code.bitmap();
    let mut matrix = SymbolMatrix::new(bitmap.width(), bitmap.height(), false);
    for (x, y) in bitmap.pixels() {
        matrix.set(x, y);
    }
    Ok(matrix)
}
