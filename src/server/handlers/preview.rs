//! Thumbnail preview handler.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::assets::{self, png_data_uri};
use crate::label::{Label, Symbology};
use crate::render::SymbolRenderer;
use crate::serialize::encode_png;
use crate::settings::PrintSettings;
use crate::thumbnails::render_thumbnails;

use super::super::state::AppState;

/// Request body for thumbnail previews.
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub labels: Vec<Label>,
    #[serde(default)]
    pub settings: PrintSettings,
}

/// One thumbnail, `image` is null when the code could not be rendered.
#[derive(Debug, Serialize)]
pub struct Thumbnail {
    pub content: String,
    pub symbology: Symbology,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub thumbnails: Vec<Thumbnail>,
}

/// Handle POST /api/preview - render list thumbnails as PNG data URIs.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, (StatusCode, String)> {
    let assets = assets::resolve(&request.settings, &state.client).await;

    let thumbnails = tokio::task::spawn_blocking(move || {
        let cache = render_thumbnails(&request.labels, &request.settings, &assets, &SymbolRenderer);
        request
            .labels
            .iter()
            .map(|label| Thumbnail {
                content: label.content.clone(),
                symbology: label.symbology,
                image: cache
                    .get(label)
                    .and_then(|image| encode_png(image).ok())
                    .map(|png| png_data_uri(&png)),
            })
            .collect::<Vec<_>>()
    })
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Task error: {}", e),
        )
    })?;

    Ok(Json(PreviewResponse { thumbnails }))
}
