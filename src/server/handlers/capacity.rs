//! Labels-per-page readout.

use axum::{extract::Query, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::layout::PageGeometry;
use crate::paper::PaperConfig;
use crate::settings::{PageLayoutSettings, DEFAULT_SPACING_CM};

fn default_width() -> f64 {
    PageLayoutSettings::default().label_width_cm
}

fn default_height() -> f64 {
    PageLayoutSettings::default().label_height_cm
}

fn default_spacing() -> f64 {
    DEFAULT_SPACING_CM
}

/// Query parameters, named like the settings document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityQuery {
    #[serde(default = "default_width")]
    pub label_width_cm: f64,
    #[serde(default = "default_height")]
    pub label_height_cm: f64,
    #[serde(default = "default_spacing")]
    pub spacing_x_cm: f64,
    #[serde(default = "default_spacing")]
    pub spacing_y_cm: f64,
    pub columns_per_row: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityResponse {
    pub columns: u32,
    pub rows: u32,
    pub labels_per_page: usize,
}

/// Handle GET /api/capacity - grid size for a label layout.
pub async fn capacity(
    Query(query): Query<CapacityQuery>,
) -> Result<Json<CapacityResponse>, (StatusCode, String)> {
    let layout = PageLayoutSettings {
        label_width_cm: query.label_width_cm,
        label_height_cm: query.label_height_cm,
        spacing_x_cm: query.spacing_x_cm,
        spacing_y_cm: query.spacing_y_cm,
        forced_columns_per_row: query.columns_per_row.filter(|&c| c > 0),
    };
    let geometry = PageGeometry::for_paper(&PaperConfig::A4, &layout)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(Json(CapacityResponse {
        columns: geometry.columns,
        rows: geometry.rows,
        labels_per_page: geometry.labels_per_page,
    }))
}
