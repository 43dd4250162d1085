//! # Export Coordinator
//!
//! Runs one export pass end to end:
//!
//! ```text
//! validate ─▶ page geometry ─▶ resolve logo/pattern ─▶ image cache ─▶ page ─▶ sink
//!  (fatal)       (fatal)          (degrades)          (per-label      (one at a time,
//!                                                      placeholder)    fatal)
//! ```
//!
//! [`run`] is the synchronous pipeline. [`spawn`] runs it as a one-shot
//! background job that answers exactly once through a channel.

use chrono::Utc;
use image::RgbImage;
use serde::Deserialize;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::assets::{self, ResolvedAssets};
use crate::cache::ImageCache;
use crate::compositor::{draw_cell, nominal_code_sizes, CellRect, CellStyle};
use crate::error::SheetError;
use crate::label::Label;
use crate::layout::{Page, PageGeometry};
use crate::paper::PaperConfig;
use crate::render::canvas::WHITE;
use crate::render::{CodeRenderer, CodeStyle, SymbolRenderer};
use crate::serialize::{ExportFile, PageSink, SerializeOptions};
use crate::settings::{ExportFormat, PrintSettings};

/// File name used when the caller gives none.
pub const DEFAULT_BASE_NAME: &str = "qr-labels";

fn default_base_name() -> String {
    DEFAULT_BASE_NAME.to_string()
}

/// Everything one export needs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub labels: Vec<Label>,
    #[serde(default)]
    pub settings: PrintSettings,
    #[serde(default, alias = "exportFormat")]
    pub format: ExportFormat,
    #[serde(default = "default_base_name", alias = "name")]
    pub base_name: String,
}

impl ExportRequest {
    pub fn new(labels: Vec<Label>, settings: PrintSettings, format: ExportFormat) -> Self {
        Self {
            labels,
            settings,
            format,
            base_name: default_base_name(),
        }
    }

    /// Base name safe to use as a file name.
    pub fn file_stem(&self) -> String {
        let cleaned: String = self
            .base_name
            .trim()
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '-' } else { c })
            .collect();
        if cleaned.is_empty() {
            default_base_name()
        } else {
            cleaned
        }
    }

    /// Reject requests that cannot produce a file, before any rendering.
    pub fn validate(&self, paper: &PaperConfig) -> Result<PageGeometry, SheetError> {
        if self.labels.is_empty() {
            return Err(SheetError::InvalidRequest("no labels to export".to_string()));
        }
        PageGeometry::for_paper(paper, &self.settings.page_layout())
    }
}

/// Outcome delivered by a background job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportResponse {
    Success(ExportFile),
    Error(String),
}

impl ExportResponse {
    pub fn into_result(self) -> Result<ExportFile, String> {
        match self {
            ExportResponse::Success(file) => Ok(file),
            ExportResponse::Error(message) => Err(message),
        }
    }
}

/// Run the whole pipeline with the default renderer.
pub fn run(request: &ExportRequest, assets: &ResolvedAssets) -> Result<ExportFile, SheetError> {
    run_with(request, assets, &SymbolRenderer, &SerializeOptions::default())
}

pub fn run_with<R: CodeRenderer + ?Sized>(
    request: &ExportRequest,
    assets: &ResolvedAssets,
    renderer: &R,
    options: &SerializeOptions,
) -> Result<ExportFile, SheetError> {
    let paper = options.paper;
    let geometry = request.validate(&paper)?;
    info!(
        labels = request.labels.len(),
        per_page = geometry.labels_per_page,
        pages = geometry.page_count(request.labels.len()),
        format = %request.format,
        "export started"
    );

    let composer = PageComposer::new(
        &request.labels,
        &request.settings,
        &geometry,
        assets,
        renderer,
        &paper,
    );
    let mut sink = PageSink::new(request.format, options);
    for page in composer.pages() {
        sink.push(&page)?;
    }
    let file = sink.finish(&request.file_stem())?;

    info!(
        filename = %file.filename,
        pages = file.pages,
        bytes = file.bytes.len(),
        "export finished"
    );
    Ok(file)
}

/// Composites label pages from a prebuilt image cache.
///
/// Codes are rendered once per distinct key when the composer is built;
/// pages are then drawn one at a time, in order, as they are pulled.
pub struct PageComposer<'a> {
    labels: &'a [Label],
    geometry: &'a PageGeometry,
    cell_style: CellStyle,
    cache: ImageCache,
    canvas_size: (u32, u32),
}

impl<'a> PageComposer<'a> {
    pub fn new<R: CodeRenderer + ?Sized>(
        labels: &'a [Label],
        settings: &PrintSettings,
        geometry: &'a PageGeometry,
        assets: &ResolvedAssets,
        renderer: &R,
        paper: &PaperConfig,
    ) -> Self {
        let cell_style = CellStyle::from_settings(settings, paper);
        let code_style = CodeStyle::from_settings(settings, assets);
        let sizes = nominal_code_sizes(geometry, &cell_style);

        let cache = ImageCache::build(labels, sizes, &code_style, renderer);
        if cache.failed_count() > 0 {
            warn!(
                failed = cache.failed_count(),
                distinct = cache.len(),
                "some codes could not be rendered and were replaced by placeholders"
            );
        }

        Self {
            labels,
            geometry,
            cell_style,
            cache,
            canvas_size: paper.canvas_size(),
        }
    }

    /// Draw one page.
    pub fn compose(&self, page: &Page) -> RgbImage {
        debug!(page = page.page_index + 1, cells = page.cells.len(), "compositing page");
        let (width, height) = self.canvas_size;
        let mut canvas = RgbImage::from_pixel(width, height, WHITE);
        for cell in &page.cells {
            let label = &self.labels[cell.label_index];
            draw_cell(
                &mut canvas,
                label,
                CellRect::of_cell(cell, self.geometry),
                &self.cell_style,
                self.cache.get(label).map(|image| image.as_ref()),
            );
        }
        canvas
    }

    /// Page rasters in order, each composited when the iterator is advanced.
    pub fn pages(&self) -> impl Iterator<Item = RgbImage> + '_ {
        self.geometry
            .partition(self.labels.len())
            .into_iter()
            .map(move |page| self.compose(&page))
    }
}

/// Render every page raster for `labels` at once.
pub fn render_pages<R: CodeRenderer + ?Sized>(
    labels: &[Label],
    settings: &PrintSettings,
    geometry: &PageGeometry,
    assets: &ResolvedAssets,
    renderer: &R,
    paper: &PaperConfig,
) -> Vec<RgbImage> {
    PageComposer::new(labels, settings, geometry, assets, renderer, paper)
        .pages()
        .collect()
}

/// Handle to a background export.
///
/// Dropping it abandons the request; the job finishes and its result is
/// discarded.
#[derive(Debug)]
pub struct ExportJob {
    pub id: Uuid,
    rx: oneshot::Receiver<ExportResponse>,
}

impl ExportJob {
    /// Wait for the single response.
    pub async fn wait(self) -> ExportResponse {
        match self.rx.await {
            Ok(response) => response,
            Err(_) => ExportResponse::Error("export job ended without a result".to_string()),
        }
    }
}

/// Start an export in the background.
///
/// Must be called from within a tokio runtime. Assets are fetched on the
/// async side; rendering and serialization run on the blocking pool.
pub fn spawn(request: ExportRequest, client: reqwest::Client) -> ExportJob {
    let id = Uuid::new_v4();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let response = run_job(id, request, client).await;
        if tx.send(response).is_err() {
            debug!(%id, "export result discarded, job was abandoned");
        }
    });

    ExportJob { id, rx }
}

async fn run_job(id: Uuid, request: ExportRequest, client: reqwest::Client) -> ExportResponse {
    let options = SerializeOptions {
        creation_date: Some(Utc::now()),
        ..Default::default()
    };

    if let Err(e) = request.validate(&options.paper) {
        warn!(%id, error = %e, "export rejected");
        return ExportResponse::Error(e.to_string());
    }

    let assets = assets::resolve(&request.settings, &client).await;
    let result = tokio::task::spawn_blocking(move || {
        run_with(&request, &assets, &SymbolRenderer, &options)
    })
    .await;

    match result {
        Ok(Ok(file)) => ExportResponse::Success(file),
        Ok(Err(e)) => {
            warn!(%id, error = %e, "export failed");
            ExportResponse::Error(e.to_string())
        }
        Err(e) => ExportResponse::Error(format!("Task error: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_from_json() {
        let json = r#"{
            "labels": [{"qrData": "A", "type": "barcode"}, {"content": "B"}],
            "format": "png"
        }"#;
        let request: ExportRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.labels, vec![Label::barcode("A"), Label::qr("B")]);
        assert_eq!(request.format, ExportFormat::Png);
        assert_eq!(request.base_name, DEFAULT_BASE_NAME);
        assert_eq!(request.settings, PrintSettings::default());
    }

    #[test]
    fn test_file_stem() {
        let mut request = ExportRequest::new(vec![], PrintSettings::default(), ExportFormat::Pdf);
        request.base_name = "  ".into();
        assert_eq!(request.file_stem(), "qr-labels");
        request.base_name = "../batch/7".into();
        assert_eq!(request.file_stem(), "..-batch-7");
    }

    #[test]
    fn test_empty_batch_rejected() {
        let request = ExportRequest::new(vec![], PrintSettings::default(), ExportFormat::Pdf);
        let err = run(&request, &ResolvedAssets::default()).unwrap_err();
        assert!(matches!(err, SheetError::InvalidRequest(_)));
    }

    #[test]
    fn test_oversized_label_is_layout_error() {
        let settings = PrintSettings {
            label_width_cm: 30.0,
            ..Default::default()
        };
        let request = ExportRequest::new(vec![Label::qr("A")], settings, ExportFormat::Png);
        assert!(matches!(
            run(&request, &ResolvedAssets::default()),
            Err(SheetError::Layout(_))
        ));
    }

    #[test]
    fn test_page_count() {
        let labels: Vec<Label> = (0..37).map(|i| Label::qr(format!("ID-{}", i))).collect();
        let request = ExportRequest::new(labels, PrintSettings::default(), ExportFormat::Pdf);
        let file = run(&request, &ResolvedAssets::default()).unwrap();
        assert_eq!(file.pages, 2);
        assert_eq!(file.filename, "qr-labels.pdf");
    }

    #[test]
    fn test_streamed_export_matches_batch_pages() {
        use crate::serialize::serialize;

        let labels: Vec<Label> = (0..40).map(|i| Label::qr(format!("ID-{}", i))).collect();
        let settings = PrintSettings::default();
        let paper = PaperConfig::A4;
        let geometry = PageGeometry::for_paper(&paper, &settings.page_layout()).unwrap();
        let pages = render_pages(&labels, &settings, &geometry, &ResolvedAssets::default(), &SymbolRenderer, &paper);
        assert_eq!(pages.len(), 2);

        for format in [ExportFormat::Pdf, ExportFormat::Png] {
            let request = ExportRequest::new(labels.clone(), settings.clone(), format);
            let streamed = run(&request, &ResolvedAssets::default()).unwrap();
            assert_eq!(streamed, serialize(&pages, format, DEFAULT_BASE_NAME).unwrap());
        }
    }

    #[test]
    fn test_composer_is_lazy() {
        let labels: Vec<Label> = (0..80).map(|i| Label::qr(format!("ID-{}", i))).collect();
        let settings = PrintSettings::default();
        let geometry = PageGeometry::for_paper(&PaperConfig::A4, &settings.page_layout()).unwrap();
        let composer = PageComposer::new(
            &labels,
            &settings,
            &geometry,
            &ResolvedAssets::default(),
            &SymbolRenderer,
            &PaperConfig::A4,
        );

        let mut pages = composer.pages();
        let first = pages.next().unwrap();
        assert_eq!(first.dimensions(), PaperConfig::A4.canvas_size());
        assert_eq!(pages.count(), 2);
    }

    #[tokio::test]
    async fn test_spawned_job_answers_once() {
        let request = ExportRequest::new(
            vec![Label::qr("A"), Label::data_matrix("B")],
            PrintSettings::default(),
            ExportFormat::Png,
        );
        let job = spawn(request, reqwest::Client::new());
        match job.wait().await {
            ExportResponse::Success(file) => {
                assert_eq!(file.filename, "qr-labels.png");
                assert_eq!(file.pages, 1);
            }
            ExportResponse::Error(e) => panic!("export failed: {}", e),
        }
    }

    #[tokio::test]
    async fn test_spawned_job_reports_errors() {
        let request = ExportRequest::new(vec![], PrintSettings::default(), ExportFormat::Png);
        let response = spawn(request, reqwest::Client::new()).wait().await;
        assert!(response.into_result().unwrap_err().contains("no labels"));
    }

    #[tokio::test]
    async fn test_jobs_have_distinct_ids() {
        let make = || ExportRequest::new(vec![Label::qr("A")], PrintSettings::default(), ExportFormat::Svg);
        let a = spawn(make(), reqwest::Client::new());
        let b = spawn(make(), reqwest::Client::new());
        assert_ne!(a.id, b.id);
        drop(a);
        assert!(b.wait().await.into_result().is_ok());
    }
}
