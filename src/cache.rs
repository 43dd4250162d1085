//! # Image Cache
//!
//! One rendered image per distinct `(symbology, content)` pair, built
//! before any page is drawn. Renders fan out on the rayon pool and are
//! joined before [`ImageCache::build`] returns; after that the cache is
//! read-only and shared by every page of the pass.
//!
//! A key whose render failed maps to `None`, which the compositor draws
//! as a placeholder.

use image::RgbImage;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::label::{Label, Symbology};
use crate::render::{CodeRenderer, CodeSize, CodeStyle};

/// Render sizes for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeSizes {
    /// QR and Data Matrix
    pub square: CodeSize,
    /// Linear barcodes
    pub linear: CodeSize,
}

impl CodeSizes {
    /// Thumbnail sizes for the label list preview.
    pub const THUMBNAIL: CodeSizes = CodeSizes {
        square: CodeSize {
            width: 120,
            height: 120,
        },
        linear: CodeSize {
            width: 120,
            height: 40,
        },
    };

    pub fn for_symbology(&self, symbology: Symbology) -> CodeSize {
        if symbology.is_linear() {
            self.linear
        } else {
            self.square
        }
    }
}

/// Rendered codes for one pass, keyed by symbology then content.
#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    entries: HashMap<Symbology, HashMap<String, Option<Arc<RgbImage>>>>,
}

impl ImageCache {
    /// Render every distinct key of `labels` exactly once.
    pub fn build<R: CodeRenderer + ?Sized>(
        labels: &[Label],
        sizes: CodeSizes,
        style: &CodeStyle,
        renderer: &R,
    ) -> Self {
        let mut seen = HashSet::new();
        let keys: Vec<(Symbology, &str)> = labels
            .iter()
            .map(Label::key)
            .filter(|key| seen.insert(*key))
            .collect();

        debug!(labels = labels.len(), distinct = keys.len(), "rendering codes");

        let rendered: Vec<(Symbology, &str, Option<Arc<RgbImage>>)> = keys
            .par_iter()
            .map(|&(symbology, content)| {
                let size = sizes.for_symbology(symbology);
                match renderer.render(symbology, content, size, style) {
                    Ok(image) => (symbology, content, Some(Arc::new(image))),
                    Err(e) => {
                        warn!(%symbology, content, error = %e, "code render failed, using placeholder");
                        (symbology, content, None)
                    }
                }
            })
            .collect();

        let mut entries: HashMap<Symbology, HashMap<String, Option<Arc<RgbImage>>>> =
            HashMap::new();
        for (symbology, content, image) in rendered {
            entries
                .entry(symbology)
                .or_default()
                .insert(content.to_string(), image);
        }
        Self { entries }
    }

    /// Image for a label; `None` when the render failed or the key is unknown.
    pub fn get(&self, label: &Label) -> Option<&Arc<RgbImage>> {
        self.lookup(label.symbology, &label.content)
    }

    pub fn lookup(&self, symbology: Symbology, content: &str) -> Option<&Arc<RgbImage>> {
        self.entries
            .get(&symbology)
            .and_then(|by_content| by_content.get(content))
            .and_then(Option::as_ref)
    }

    /// Whether a key was part of the pass, rendered or not.
    pub fn contains(&self, symbology: Symbology, content: &str) -> bool {
        self.entries
            .get(&symbology)
            .is_some_and(|by_content| by_content.contains_key(content))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys whose render failed.
    pub fn failed_count(&self) -> usize {
        self.entries
            .values()
            .flat_map(HashMap::values)
            .filter(|image| image.is_none())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SheetError;
    use crate::render::SymbolRenderer;
    use image::Rgb;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and records the sizes it was asked for.
    #[derive(Default)]
    struct CountingRenderer {
        calls: AtomicUsize,
        sizes: Mutex<Vec<(Symbology, CodeSize)>>,
    }

    impl CodeRenderer for CountingRenderer {
        fn render(
            &self,
            symbology: Symbology,
            content: &str,
            size: CodeSize,
            _style: &CodeStyle,
        ) -> Result<RgbImage, SheetError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.sizes.lock().unwrap().push((symbology, size));
            if content == "bad" {
                return Err(SheetError::encoding(symbology, content, "rejected"));
            }
            Ok(RgbImage::from_pixel(size.width, size.height, Rgb([0, 0, 0])))
        }
    }

    #[test]
    fn test_renders_each_key_once() {
        let labels = vec![
            Label::qr("A"),
            Label::qr("A"),
            Label::barcode("A"),
            Label::data_matrix("B"),
            Label::qr("A").brand("other brand"),
            Label::data_matrix("B"),
        ];
        let renderer = CountingRenderer::default();
        let cache = ImageCache::build(&labels, CodeSizes::THUMBNAIL, &CodeStyle::default(), &renderer);

        assert_eq!(renderer.calls.load(Ordering::SeqCst), 3);
        assert_eq!(cache.len(), 3);
        assert!(cache.get(&labels[0]).is_some());
        assert!(cache.get(&labels[2]).is_some());
        assert!(cache.lookup(Symbology::Barcode, "B").is_none());
        assert!(!cache.contains(Symbology::Barcode, "B"));
    }

    #[test]
    fn test_sizes_follow_symbology() {
        let labels = vec![Label::qr("A"), Label::barcode("B")];
        let renderer = CountingRenderer::default();
        let cache = ImageCache::build(&labels, CodeSizes::THUMBNAIL, &CodeStyle::default(), &renderer);

        assert_eq!(cache.get(&labels[0]).unwrap().dimensions(), (120, 120));
        assert_eq!(cache.get(&labels[1]).unwrap().dimensions(), (120, 40));
    }

    #[test]
    fn test_failures_become_none() {
        let labels = vec![Label::qr("ok"), Label::qr("bad"), Label::qr("bad")];
        let renderer = CountingRenderer::default();
        let cache = ImageCache::build(&labels, CodeSizes::THUMBNAIL, &CodeStyle::default(), &renderer);

        assert_eq!(renderer.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.failed_count(), 1);
        assert!(cache.contains(Symbology::Qr, "bad"));
        assert!(cache.lookup(Symbology::Qr, "bad").is_none());
    }

    #[test]
    fn test_empty_batch() {
        let cache = ImageCache::build(&[], CodeSizes::THUMBNAIL, &CodeStyle::default(), &SymbolRenderer);
        assert!(cache.is_empty());
        assert_eq!(cache.failed_count(), 0);
    }

    #[test]
    fn test_real_renderer_placeholder_on_invalid_content() {
        // CODE128 has no non-ASCII characters.
        let labels = vec![Label::barcode("Größe"), Label::qr("Größe")];
        let cache = ImageCache::build(&labels, CodeSizes::THUMBNAIL, &CodeStyle::default(), &SymbolRenderer);
        assert!(cache.get(&labels[0]).is_none());
        assert!(cache.get(&labels[1]).is_some());
    }
}
