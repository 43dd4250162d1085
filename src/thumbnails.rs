//! # Label List Thumbnails
//!
//! Small previews of every label, rebuilt when the label list or the code
//! style changes. A refresh is tagged with the [`PassSignature`] of the
//! inputs it was started from; [`PreviewList::apply`] drops results whose
//! signature no longer matches, so a slow refresh can never overwrite a
//! newer one.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::assets::ResolvedAssets;
use crate::cache::{CodeSizes, ImageCache};
use crate::label::Label;
use crate::render::{CodeRenderer, CodeStyle};
use crate::settings::PrintSettings;

/// Fingerprint of everything that changes a thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassSignature(u64);

impl PassSignature {
    /// Hash label keys plus the style fields the code renderer reads.
    pub fn of(labels: &[Label], settings: &PrintSettings) -> Self {
        let mut hasher = DefaultHasher::new();
        labels.len().hash(&mut hasher);
        for label in labels {
            label.key().hash(&mut hasher);
        }
        settings.code_rgb().0.hash(&mut hasher);
        settings.active_pattern().hash(&mut hasher);
        settings.active_logo().hash(&mut hasher);
        settings.logo_position.hash(&mut hasher);
        Self(hasher.finish())
    }
}

/// The labels shown in the list, with their current thumbnails.
#[derive(Debug, Clone)]
pub struct PreviewList {
    labels: Vec<Label>,
    signature: PassSignature,
    applied: Option<PassSignature>,
}

impl PreviewList {
    pub fn new(labels: Vec<Label>, settings: &PrintSettings) -> Self {
        let signature = PassSignature::of(&labels, settings);
        Self {
            labels,
            signature,
            applied: None,
        }
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn signature(&self) -> PassSignature {
        self.signature
    }

    /// Replace the label list. Existing thumbnails are kept until the next
    /// refresh lands.
    pub fn set_labels(&mut self, labels: Vec<Label>, settings: &PrintSettings) {
        self.labels = labels;
        self.signature = PassSignature::of(&self.labels, settings);
    }

    /// Record a settings change.
    pub fn update_settings(&mut self, settings: &PrintSettings) {
        self.signature = PassSignature::of(&self.labels, settings);
    }

    /// True when the thumbnails were not built for the current inputs.
    pub fn needs_refresh(&self) -> bool {
        self.applied != Some(self.signature)
    }

    /// Attach thumbnails from a finished refresh.
    ///
    /// Returns false, changing nothing, when `signature` is stale.
    pub fn apply(&mut self, signature: PassSignature, cache: &ImageCache) -> bool {
        if signature != self.signature {
            return false;
        }
        for label in &mut self.labels {
            label.thumbnail = cache.get(label).cloned();
        }
        self.applied = Some(signature);
        true
    }

    /// Render and apply in one step.
    pub fn refresh<R: CodeRenderer + ?Sized>(
        &mut self,
        settings: &PrintSettings,
        assets: &ResolvedAssets,
        renderer: &R,
    ) {
        let signature = PassSignature::of(&self.labels, settings);
        let cache = render_thumbnails(&self.labels, settings, assets, renderer);
        self.signature = signature;
        self.apply(signature, &cache);
    }
}

/// Render thumbnails for `labels`: 120 px squares, 120 × 40 barcodes.
pub fn render_thumbnails<R: CodeRenderer + ?Sized>(
    labels: &[Label],
    settings: &PrintSettings,
    assets: &ResolvedAssets,
    renderer: &R,
) -> ImageCache {
    let style = CodeStyle::from_settings(settings, assets);
    ImageCache::build(labels, CodeSizes::THUMBNAIL, &style, renderer)
}
