//! # Error Types
//!
//! This module defines error types used throughout the labelsheet library.
//!
//! Only [`SheetError::Layout`], [`SheetError::Serialization`] and
//! [`SheetError::InvalidRequest`] ever abort an export. Encoding and asset
//! failures are recorded against the affected label or overlay and the
//! export carries on.

use thiserror::Error;

use crate::label::Symbology;

/// Main error type for labelsheet operations
#[derive(Debug, Error)]
pub enum SheetError {
    /// Content cannot be represented by the chosen symbology
    #[error("Cannot encode {content:?} as {symbology}: {reason}")]
    Encoding {
        symbology: Symbology,
        content: String,
        reason: String,
    },

    /// Logo or pattern image could not be fetched or decoded
    #[error("Asset error: {0}")]
    AssetLoad(String),

    /// Label cell does not fit on the page
    #[error("Layout error: {0}")]
    Layout(String),

    /// Output container could not be assembled
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Request rejected before any work started
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SheetError {
    pub(crate) fn encoding(
        symbology: Symbology,
        content: &str,
        reason: impl Into<String>,
    ) -> Self {
        SheetError::Encoding {
            symbology,
            content: content.to_string(),
            reason: reason.into(),
        }
    }

    /// True for failures that must abort the whole export.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SheetError::Encoding { .. } | SheetError::AssetLoad(_))
    }
}

impl From<zip::result::ZipError> for SheetError {
    fn from(e: zip::result::ZipError) -> Self {
        SheetError::Serialization(format!("ZIP archive: {}", e))
    }
}

impl From<image::ImageError> for SheetError {
    fn from(e: image::ImageError) -> Self {
        SheetError::Serialization(format!("PNG encoding: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(!SheetError::encoding(Symbology::DataMatrix, "x", "too long").is_fatal());
        assert!(!SheetError::AssetLoad("bad logo".into()).is_fatal());
        assert!(SheetError::Layout("too big".into()).is_fatal());
        assert!(SheetError::Serialization("zip".into()).is_fatal());
    }

    #[test]
    fn test_encoding_message() {
        let err = SheetError::encoding(Symbology::Barcode, "é", "unsupported character");
        assert_eq!(
            err.to_string(),
            "Cannot encode \"é\" as barcode: unsupported character"
        );
    }
}
