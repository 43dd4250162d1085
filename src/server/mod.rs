//! # HTTP Server for Label Sheet Export
//!
//! Exposes the export pipeline over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! labelsheet serve --listen 0.0.0.0:8080
//! ```
//!
//! | Route | Body | Response |
//! |-------|------|----------|
//! | `POST /api/export` | `{labels, settings, format, baseName?}` | file download |
//! | `POST /api/preview` | `{labels, settings}` | JSON thumbnails (PNG data URIs) |
//! | `GET /api/capacity` | query: layout fields | `{columns, rows, labelsPerPage}` |

mod handlers;
mod state;

pub use state::{AppState, ServerConfig};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::SheetError;

/// Request bodies carry logos and patterns as data URIs.
const BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/export", post(handlers::export::export))
        .route("/api/preview", post(handlers::preview::preview))
        .route("/api/capacity", get(handlers::capacity::capacity))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use labelsheet::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), labelsheet::error::SheetError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), SheetError> {
    let app_state = Arc::new(AppState::new(config.clone())?);
    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(listen = %config.listen_addr, "labelsheet HTTP server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(AppState::new(ServerConfig::default()).unwrap()))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_export_png() {
        let response = app()
            .oneshot(post_json(
                "/api/export",
                json!({
                    "labels": [{"content": "ID-1"}, {"content": "SKU-9", "symbology": "barcode"}],
                    "format": "png"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"qr-labels.png\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }

    #[tokio::test]
    async fn test_export_empty_is_bad_request() {
        let response = app()
            .oneshot(post_json("/api/export", json!({"labels": []})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_oversized_label_is_bad_request() {
        let response = app()
            .oneshot(post_json(
                "/api/export",
                json!({"labels": [{"content": "A"}], "settings": {"labelHeightCm": 40}}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_preview_reports_failures_as_null() {
        let response = app()
            .oneshot(post_json(
                "/api/preview",
                json!({"labels": [{"content": "A"}, {"content": "", "symbology": "datamatrix"}]}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let thumbs = body["thumbnails"].as_array().unwrap();
        assert_eq!(thumbs.len(), 2);
        assert!(thumbs[0]["image"].as_str().unwrap().starts_with("data:image/png;base64,"));
        assert!(thumbs[1]["image"].is_null());
    }

    #[tokio::test]
    async fn test_capacity_defaults() {
        let response = app()
            .oneshot(Request::get("/api/capacity").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"columns": 4, "rows": 9, "labelsPerPage": 36})
        );
    }

    #[tokio::test]
    async fn test_capacity_query() {
        let response = app()
            .oneshot(
                Request::get("/api/capacity?labelWidthCm=5&labelHeightCm=5&spacingXCm=0&spacingYCm=0&columnsPerRow=2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            body_json(response).await,
            json!({"columns": 2, "rows": 5, "labelsPerPage": 10})
        );
    }

    #[tokio::test]
    async fn test_capacity_too_large() {
        let response = app()
            .oneshot(
                Request::get("/api/capacity?labelWidthCm=22")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
