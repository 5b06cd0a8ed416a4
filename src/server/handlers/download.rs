//! One-shot workbook download handler.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use super::super::AppState;
use crate::sheet::SheetError;

/// File name presented to the browser for every workbook.
pub const DOWNLOAD_NAME: &str = "ExtractedData.xlsx";

/// Serve a generated workbook as an attachment and remove it.
pub async fn download_sheet(State(state): State<AppState>, Path(filename): Path<String>) -> Response {
    let content = match state.pipeline.take_sheet(&filename).await {
        Ok(c) => c,
        Err(SheetError::NotFound(_)) => {
            return (StatusCode::NOT_FOUND, "File not found").into_response();
        }
        Err(e) => {
            tracing::error!("Failed to serve {}: {}", filename, e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read file").into_response();
        }
    };
    tracing::info!("Downloaded and removed {}", filename);

    let mime = mime_guess::from_path(DOWNLOAD_NAME)
        .first_or_octet_stream()
        .to_string();

    (
        [
            (header::CONTENT_TYPE, mime),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", DOWNLOAD_NAME),
            ),
        ],
        content,
    )
        .into_response()
}
