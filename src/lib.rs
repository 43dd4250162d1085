//! # labelsheet - Printable Code Label Sheets
//!
//! labelsheet lays out lists of QR codes, CODE128 barcodes and Data Matrix
//! symbols on A4 sheets and exports them as PDF, PNG or SVG. It provides:
//!
//! - **Code rendering**: encoding, color or pattern fills, QR logo overlays
//! - **Layout**: fixed-size label grids with spacing and pagination
//! - **Composition**: borders, brand and data text bands around each code
//! - **Export**: PDF documents, PNG/SVG pages and ZIP bundles
//!
//! ## Quick Start
//!
//! ```no_run
//! use labelsheet::{
//!     assets::ResolvedAssets,
//!     export::{self, ExportRequest},
//!     settings::{ExportFormat, PrintSettings},
//!     Label,
//! };
//!
//! let labels = vec![
//!     Label::qr("https://example.com/item/1").brand("ACME"),
//!     Label::barcode("SKU-000123"),
//!     Label::data_matrix("LOT-42"),
//! ];
//! let request = ExportRequest::new(labels, PrintSettings::default(), ExportFormat::Pdf);
//!
//! let file = export::run(&request, &ResolvedAssets::default())?;
//! std::fs::write(&file.filename, &file.bytes)?;
//!
//! # Ok::<(), labelsheet::error::SheetError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`label`] | Labels and symbologies |
//! | [`settings`] | Print settings document |
//! | [`paper`] | Sheet size and resolution |
//! | [`render`] | Code renderer and raster primitives |
//! | [`assets`] | Logo and pattern loading |
//! | [`cache`] | Per-pass image cache |
//! | [`layout`] | Page grid and pagination |
//! | [`compositor`] | Label cell drawing |
//! | [`serialize`] | PDF, PNG, SVG and ZIP output |
//! | [`export`] | Export pipeline and background jobs |
//! | [`thumbnails`] | Label list previews |
//! | [`server`] | HTTP API |
//! | [`error`] | Error types |

pub mod assets;
pub mod cache;
pub mod compositor;
pub mod error;
pub mod export;
pub mod label;
pub mod layout;
pub mod paper;
pub mod render;
pub mod serialize;
pub mod server;
pub mod settings;
pub mod thumbnails;

// Re-exports for convenience
pub use error::SheetError;
pub use label::{Label, Symbology};
pub use paper::PaperConfig;
pub use serialize::ExportFile;
