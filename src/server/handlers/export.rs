//! Export handler: labels and settings in, file download out.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::export::{self, ExportRequest, ExportResponse};
use crate::paper::PaperConfig;

use super::super::state::AppState;
use super::error_response;

/// Handle POST /api/export - run an export and return the file.
pub async fn export(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExportRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // Client mistakes are answered before a job is started.
    request
        .validate(&PaperConfig::A4)
        .map_err(error_response)?;

    let job = export::spawn(request, state.client.clone());
    match job.wait().await {
        ExportResponse::Success(file) => Ok((
            [
                (header::CONTENT_TYPE, file.mime.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", file.filename),
                ),
            ],
            file.bytes,
        )),
        ExportResponse::Error(message) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Export failed: {}", message),
        )),
    }
}
