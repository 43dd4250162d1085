//! Asset resolution: turns logo and pattern references into bitmaps.
//!
//! A reference is one of:
//!
//! - a data URI (`data:image/png;base64,...`), as produced by browser file inputs
//! - an `http://` or `https://` URL, downloaded with the shared HTTP client
//! - a local file path
//!
//! Failures never abort an export. They are logged and the overlay is
//! dropped (logo) or replaced by the solid code color (pattern).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, RgbaImage};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::SheetError;
use crate::settings::PrintSettings;

/// Decoded overlay images for one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedAssets {
    pub logo: Option<Arc<RgbaImage>>,
    pub pattern: Option<Arc<RgbaImage>>,
}

/// Build the HTTP client used for remote assets.
pub fn http_client() -> Result<reqwest::Client, SheetError> {
    reqwest::Client::builder()
        .user_agent(concat!("labelsheet/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| SheetError::AssetLoad(format!("HTTP client error: {}", e)))
}

/// Resolve the logo and pattern referenced by the settings.
///
/// Only active references are loaded (logo switched on, image fill mode).
pub async fn resolve(settings: &PrintSettings, client: &reqwest::Client) -> ResolvedAssets {
    let logo = match settings.active_logo() {
        Some(reference) => load_or_warn("logo", reference, client).await,
        None => None,
    };
    let pattern = match settings.active_pattern() {
        Some(reference) => load_or_warn("pattern", reference, client).await,
        None => None,
    };
    ResolvedAssets { logo, pattern }
}

/// Resolve without network access: data URIs and local files only.
pub fn resolve_local(settings: &PrintSettings) -> ResolvedAssets {
    let load = |kind: &str, reference: &str| match load_local(reference) {
        Ok(image) => Some(Arc::new(image.to_rgba8())),
        Err(e) => {
            warn!(kind, error = %e, "overlay image unavailable, continuing without it");
            None
        }
    };
    ResolvedAssets {
        logo: settings.active_logo().and_then(|r| load("logo", r)),
        pattern: settings.active_pattern().and_then(|r| load("pattern", r)),
    }
}

async fn load_or_warn(
    kind: &str,
    reference: &str,
    client: &reqwest::Client,
) -> Option<Arc<RgbaImage>> {
    match load_image(reference, client).await {
        Ok(image) => {
            debug!(kind, width = image.width(), height = image.height(), "overlay image loaded");
            Some(Arc::new(image.to_rgba8()))
        }
        Err(e) => {
            warn!(kind, error = %e, "overlay image unavailable, continuing without it");
            None
        }
    }
}

/// Load and decode an image from any supported reference.
pub async fn load_image(
    reference: &str,
    client: &reqwest::Client,
) -> Result<DynamicImage, SheetError> {
    let reference = reference.trim();
    if reference.starts_with("http://") || reference.starts_with("https://") {
        let bytes = download(reference, client).await?;
        return decode(&bytes);
    }
    if reference.starts_with("data:") {
        return decode(&decode_data_uri(reference)?);
    }
    let bytes = tokio::fs::read(reference)
        .await
        .map_err(|e| SheetError::AssetLoad(format!("Failed to read {}: {}", reference, e)))?;
    decode(&bytes)
}

fn load_local(reference: &str) -> Result<DynamicImage, SheetError> {
    let reference = reference.trim();
    if reference.starts_with("data:") {
        return decode(&decode_data_uri(reference)?);
    }
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return Err(SheetError::AssetLoad(format!(
            "remote image {} needs the async resolver",
            reference
        )));
    }
    let bytes = std::fs::read(reference)
        .map_err(|e| SheetError::AssetLoad(format!("Failed to read {}: {}", reference, e)))?;
    decode(&bytes)
}

async fn download(url: &str, client: &reqwest::Client) -> Result<Vec<u8>, SheetError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| SheetError::AssetLoad(format!("Failed to download {}: {}", url, e)))?;
    if !response.status().is_success() {
        return Err(SheetError::AssetLoad(format!(
            "Failed to download {}: HTTP {}",
            url,
            response.status()
        )));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| SheetError::AssetLoad(format!("Failed to read image data: {}", e)))?;
    Ok(bytes.to_vec())
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, SheetError> {
    image::load_from_memory(bytes)
        .map_err(|e| SheetError::AssetLoad(format!("Failed to decode image: {}", e)))
}

/// Extract the payload of a base64 data URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, SheetError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| SheetError::AssetLoad("not a data URI".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| SheetError::AssetLoad("data URI has no payload".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(SheetError::AssetLoad(format!(
            "unsupported data URI encoding '{}'",
            header
        )));
    }
    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(cleaned)
        .map_err(|e| SheetError::AssetLoad(format!("invalid base64 in data URI: {}", e)))
}

/// Encode PNG bytes as a data URI.
pub fn png_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::FillMode;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn png_bytes(color: Rgba<u8>) -> Vec<u8> {
        let img = RgbaImage::from_pixel(3, 2, color);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_data_uri_round_trip() {
        let png = png_bytes(Rgba([1, 2, 3, 255]));
        let uri = png_data_uri(&png);
        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(decode_data_uri(&uri).unwrap(), png);
    }

    #[test]
    fn test_bad_data_uris() {
        assert!(decode_data_uri("image/png;base64,AAAA").is_err());
        assert!(decode_data_uri("data:image/png;base64").is_err());
        assert!(decode_data_uri("data:text/plain,hello").is_err());
        assert!(decode_data_uri("data:image/png;base64,!!!").is_err());
    }

    #[test]
    fn test_resolve_local_decodes_active_assets() {
        let uri = png_data_uri(&png_bytes(Rgba([9, 9, 9, 255])));
        let settings = PrintSettings {
            show_logo: true,
            logo_image: Some(uri.clone()),
            qr_fill_mode: FillMode::Image,
            qr_pattern_image: Some(uri),
            ..Default::default()
        };
        let assets = resolve_local(&settings);
        let logo = assets.logo.expect("logo decoded");
        assert_eq!(logo.dimensions(), (3, 2));
        assert!(assets.pattern.is_some());
    }

    #[test]
    fn test_resolve_local_degrades_on_failure() {
        let settings = PrintSettings {
            show_logo: true,
            logo_image: Some("data:image/png;base64,bm90IGFuIGltYWdl".into()),
            qr_fill_mode: FillMode::Image,
            qr_pattern_image: Some("/nonexistent/pattern.png".into()),
            ..Default::default()
        };
        assert_eq!(resolve_local(&settings), ResolvedAssets::default());
    }

    #[tokio::test]
    async fn test_resolve_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, png_bytes(Rgba([0, 0, 0, 255]))).unwrap();

        let settings = PrintSettings {
            show_logo: true,
            logo_image: Some(path.to_string_lossy().into_owned()),
            ..Default::default()
        };
        let client = http_client().unwrap();
        let assets = resolve(&settings, &client).await;
        assert!(assets.logo.is_some());
        assert!(assets.pattern.is_none());
    }
}
