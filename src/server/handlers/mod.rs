//! HTTP handlers for the server.

pub mod capacity;
pub mod export;
pub mod preview;

use axum::http::StatusCode;

use crate::error::SheetError;

/// Map a pipeline error to a status code and message.
pub(crate) fn error_response(e: SheetError) -> (StatusCode, String) {
    let status = match e {
        SheetError::InvalidRequest(_) | SheetError::Layout(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}
