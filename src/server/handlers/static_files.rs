//! Upload page and static asset handlers.

use axum::{
    http::header,
    response::{Html, IntoResponse},
    Json,
};

use super::super::assets;

/// Serve the upload page.
pub async fn index() -> impl IntoResponse {
    Html(assets::INDEX_HTML)
}

/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Serve CSS.
pub async fn serve_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], assets::CSS)
}

/// Serve JavaScript.
pub async fn serve_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        assets::JS,
    )
}
