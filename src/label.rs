//! # Labels
//!
//! A [`Label`] is one physical code to print. Label lists arrive from an
//! external builder (manual form, AI prompt, file import) as JSON; the
//! original front-end field names (`qrData`, `type`, `brandName`) are
//! accepted as aliases.

use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Code type / encoding scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbology {
    /// QR code, error-correction level High
    #[default]
    Qr,
    /// CODE128 linear barcode
    Barcode,
    /// Data Matrix (ECC 200)
    #[serde(alias = "data-matrix")]
    DataMatrix,
}

impl Symbology {
    pub fn as_str(&self) -> &'static str {
        match self {
            Symbology::Qr => "qr",
            Symbology::Barcode => "barcode",
            Symbology::DataMatrix => "datamatrix",
        }
    }

    /// Linear symbols are drawn in a wide box instead of a square.
    pub fn is_linear(&self) -> bool {
        matches!(self, Symbology::Barcode)
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symbology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "qr" | "qrcode" => Ok(Symbology::Qr),
            "barcode" | "code128" => Ok(Symbology::Barcode),
            "datamatrix" | "data-matrix" => Ok(Symbology::DataMatrix),
            other => Err(format!("unknown symbology '{}'", other)),
        }
    }
}

/// One label on the sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    /// Exact text embedded in the code.
    #[serde(alias = "qrData")]
    pub content: String,

    #[serde(default, alias = "type")]
    pub symbology: Symbology,

    /// Per-label brand text, shown instead of the sheet-wide brand name.
    #[serde(default, alias = "brandName", skip_serializing_if = "Option::is_none")]
    pub brand_text: Option<String>,

    /// Preview image attached by a thumbnail refresh.
    #[serde(skip)]
    pub thumbnail: Option<Arc<RgbImage>>,
}

impl Label {
    pub fn new(symbology: Symbology, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            symbology,
            brand_text: None,
            thumbnail: None,
        }
    }

    pub fn qr(content: impl Into<String>) -> Self {
        Self::new(Symbology::Qr, content)
    }

    pub fn barcode(content: impl Into<String>) -> Self {
        Self::new(Symbology::Barcode, content)
    }

    pub fn data_matrix(content: impl Into<String>) -> Self {
        Self::new(Symbology::DataMatrix, content)
    }

    /// Set the per-label brand text.
    pub fn brand(mut self, text: impl Into<String>) -> Self {
        self.brand_text = Some(text.into());
        self
    }

    /// Cache key shared by every label that renders to the same image.
    pub fn key(&self) -> (Symbology, &str) {
        (self.symbology, self.content.as_str())
    }
}
