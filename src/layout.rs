//! # Layout Engine
//!
//! Fixed-size label cells on fixed-size pages.
//!
//! ```text
//! ┌──────────────── page width ────────────────┐
//! │ sx ┌─────┐ sx ┌─────┐ sx ┌─────┐ sx        │
//! │    │  0  │    │  1  │    │  2  │           │  sy
//! │    └─────┘    └─────┘    └─────┘           │
//! │    ┌─────┐    ┌─────┐    ┌─────┐           │  sy
//! │    │  3  │    │  4  │    │  5  │           │
//! │    └─────┘    └─────┘    └─────┘           │
//! └────────────────────────────────────────────┘
//! ```
//!
//! Cells fill row-major in input order. The column count is the auto-fit
//! maximum `floor(pageW / (w + sx))`, or the forced count when it is
//! smaller; the row count is `floor(pageH / (h + sy))`.

use crate::error::SheetError;
use crate::paper::PaperConfig;
use crate::settings::PageLayoutSettings;

/// Relative slack for exact fits such as `29.7 / 3.3`.
const FIT_EPSILON: f64 = 1e-9;

/// Cell geometry in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellLayout {
    pub label_width: f64,
    pub label_height: f64,
    pub spacing_x: f64,
    pub spacing_y: f64,
    pub forced_columns: Option<u32>,
}

impl CellLayout {
    /// Convert centimetre settings to pixels for the given paper.
    pub fn from_settings(settings: &PageLayoutSettings, paper: &PaperConfig) -> Self {
        Self {
            label_width: paper.cm_to_px(settings.label_width_cm),
            label_height: paper.cm_to_px(settings.label_height_cm),
            spacing_x: paper.cm_to_px(settings.spacing_x_cm.max(0.0)),
            spacing_y: paper.cm_to_px(settings.spacing_y_cm.max(0.0)),
            forced_columns: settings.forced_columns_per_row,
        }
    }

    fn pitch_x(&self) -> f64 {
        self.label_width + self.spacing_x
    }

    fn pitch_y(&self) -> f64 {
        self.label_height + self.spacing_y
    }
}

/// Columns, rows and capacity of one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub columns: u32,
    pub rows: u32,
    pub labels_per_page: usize,
    pub cell: CellLayout,
}

/// One label placed on a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    /// Index into the caller's label list.
    pub label_index: usize,
    /// Top-left corner in device pixels.
    pub x: f64,
    pub y: f64,
}

/// An ordered grid snapshot for one sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub page_index: usize,
    pub cells: Vec<Cell>,
}

/// How many pitches of `pitch` fit into `extent`.
fn fit_count(extent: f64, pitch: f64) -> u32 {
    if !(pitch > 0.0) || !extent.is_finite() || !pitch.is_finite() {
        return 0;
    }
    let ratio = extent / pitch;
    (ratio * (1.0 + FIT_EPSILON)).floor().max(0.0) as u32
}

impl PageGeometry {
    /// Compute the grid for a page of the given pixel size.
    pub fn compute(
        page_width: f64,
        page_height: f64,
        cell: CellLayout,
    ) -> Result<Self, SheetError> {
        if !(cell.label_width > 0.0) || !(cell.label_height > 0.0) {
            return Err(SheetError::Layout(format!(
                "label size must be positive (got {:.1} x {:.1} px)",
                cell.label_width, cell.label_height
            )));
        }

        let max_columns = fit_count(page_width, cell.pitch_x());
        let columns = match cell.forced_columns {
            Some(forced) => forced.min(max_columns),
            None => max_columns,
        };
        let rows = fit_count(page_height, cell.pitch_y());

        let labels_per_page = columns as usize * rows as usize;
        if labels_per_page == 0 {
            return Err(SheetError::Layout(format!(
                "label {:.1} x {:.1} px does not fit on a {:.1} x {:.1} px page ({} columns, {} rows)",
                cell.label_width, cell.label_height, page_width, page_height, columns, rows
            )));
        }

        Ok(Self {
            columns,
            rows,
            labels_per_page,
            cell,
        })
    }

    /// Compute the grid for centimetre settings on the given paper.
    pub fn for_paper(
        paper: &PaperConfig,
        settings: &PageLayoutSettings,
    ) -> Result<Self, SheetError> {
        Self::compute(
            paper.width_px(),
            paper.height_px(),
            CellLayout::from_settings(settings, paper),
        )
    }

    /// Top-left corner of the cell at in-page index `i`.
    pub fn cell_origin(&self, i: usize) -> (f64, f64) {
        let columns = self.columns.max(1) as usize;
        let col = i % columns;
        let row = i / columns;
        let x = col as f64 * self.cell.pitch_x() + self.cell.spacing_x;
        let y = row as f64 * self.cell.pitch_y() + self.cell.spacing_y;
        (x, y)
    }

    /// Number of pages needed for `label_count` labels.
    pub fn page_count(&self, label_count: usize) -> usize {
        label_count.div_ceil(self.labels_per_page)
    }

    /// Split `label_count` labels into pages, row-major, in input order.
    pub fn partition(&self, label_count: usize) -> Vec<Page> {
        (0..self.page_count(label_count))
            .map(|page_index| {
                let start = page_index * self.labels_per_page;
                let end = (start + self.labels_per_page).min(label_count);
                let cells = (start..end)
                    .map(|label_index| {
                        let (x, y) = self.cell_origin(label_index - start);
                        Cell { label_index, x, y }
                    })
                    .collect();
                Page { page_index, cells }
            })
            .collect()
    }
}

/// Labels per page for the "labels per page" readout.
pub fn page_capacity(settings: &PageLayoutSettings) -> Result<usize, SheetError> {
    PageGeometry::for_paper(&PaperConfig::A4, settings).map(|g| g.labels_per_page)
}
